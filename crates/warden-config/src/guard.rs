use std::env;

pub const DEFAULT_GUARD_NAME: &str = "web";

/// Guard given to permissions created without one.
#[derive(Clone, Debug)]
pub struct GuardConfig {
    pub default_guard: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            default_guard: DEFAULT_GUARD_NAME.to_string(),
        }
    }
}

impl GuardConfig {
    pub fn from_env() -> Self {
        Self::from_value(env::var("DEFAULT_GUARD").ok())
    }

    fn from_value(value: Option<String>) -> Self {
        match value.map(|g| g.trim().to_string()) {
            Some(guard) if !guard.is_empty() => Self {
                default_guard: guard,
            },
            _ => Self::default(),
        }
    }
}
