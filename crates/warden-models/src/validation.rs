use std::borrow::Cow;

use validator::ValidationError;

/// Rejects names that are empty once surrounding whitespace is removed.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("Name is required")));
    }
    Ok(())
}

/// bcrypt only reads the first 72 bytes of its input.
pub(crate) const MAX_PASSWORD_BYTES: usize = 72;

/// Rejects passwords bcrypt would silently truncate.
pub(crate) fn within_bcrypt_limit(value: &str) -> Result<(), ValidationError> {
    if value.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("length").with_message(Cow::Borrowed(
            "Password must not exceed 72 bytes",
        )));
    }
    Ok(())
}

/// An empty password on update means "keep the current one".
pub(crate) fn optional_password(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().count() < 8 {
        return Err(ValidationError::new("length").with_message(Cow::Borrowed(
            "Password must be at least 8 characters",
        )));
    }
    within_bcrypt_limit(value)
}
