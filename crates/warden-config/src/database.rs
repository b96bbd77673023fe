//! Store backend selection.
//!
//! - `WARDEN_STORE`: `postgres` or `memory`. When unset, Postgres is used if
//!   `DATABASE_URL` is present and the in-memory store otherwise.
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)

use std::env;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            "memory" | "in-memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let url = env::var("DATABASE_URL").ok().filter(|u| !u.is_empty());
        let backend = env::var("WARDEN_STORE")
            .ok()
            .and_then(|v| StoreBackend::parse(&v))
            .unwrap_or(if url.is_some() {
                StoreBackend::Postgres
            } else {
                StoreBackend::Memory
            });

        Self {
            backend,
            url,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }
}
