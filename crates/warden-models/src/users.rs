//! User records, store inputs and DTOs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::UserId;
use crate::roles::RoleRef;

#[derive(Clone, Serialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithRoles {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub roles: Vec<RoleRef>,
}

impl UserWithRoles {
    pub fn new(user: User, roles: Vec<RoleRef>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            roles,
        }
    }
}

/// Effective permissions of a user, sorted by name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserPermissions {
    pub user_id: UserId,
    pub is_super_admin: bool,
    pub permissions: Vec<String>,
}

/// A user ready to persist. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_name: String,
}

/// Replacement values for an existing user.
///
/// `password_hash: None` keeps the stored hash. The user's role set is
/// replaced by `role_name` alone.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(
        length(max = 255, message = "Name must not exceed 255 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must not exceed 255 characters")
    )]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        custom(function = "crate::validation::within_bcrypt_limit")
    )]
    pub password: String,
    /// Name of the single role to assign.
    #[validate(custom(function = "crate::validation::not_blank"))]
    #[schema(example = "admin")]
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(
        length(max = 255, message = "Name must not exceed 255 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub name: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must not exceed 255 characters")
    )]
    pub email: String,
    /// Absent or empty keeps the current password.
    #[validate(custom(function = "crate::validation::optional_password"))]
    pub password: Option<String>,
    /// Replaces every role the user currently holds.
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub role: String,
}

impl UpdateUserDto {
    /// The new password, if one was actually supplied.
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto() -> CreateUserDto {
        CreateUserDto {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: "password123".to_string(),
            role: "admin".to_string(),
        }
    }

    fn update_dto(password: Option<&str>) -> UpdateUserDto {
        UpdateUserDto {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: password.map(str::to_string),
            role: "admin".to_string(),
        }
    }

    #[test]
    fn test_create_user_valid() {
        assert!(create_dto().validate().is_ok());
    }

    #[test]
    fn test_create_user_short_password() {
        let dto = CreateUserDto {
            password: "short".to_string(),
            ..create_dto()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_user_invalid_email() {
        let dto = CreateUserDto {
            email: "not-an-email".to_string(),
            ..create_dto()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_user_password_is_optional() {
        assert!(update_dto(None).validate().is_ok());
        assert!(update_dto(Some("")).validate().is_ok());
        assert!(update_dto(Some("short")).validate().is_err());
        assert!(update_dto(Some("long enough")).validate().is_ok());
    }

    #[test]
    fn test_password_longer_than_bcrypt_reads_is_rejected() {
        let at_limit = "a".repeat(72);
        let over_limit = "a".repeat(73);

        let dto = CreateUserDto {
            password: at_limit.clone(),
            ..create_dto()
        };
        assert!(dto.validate().is_ok());
        let dto = CreateUserDto {
            password: over_limit.clone(),
            ..create_dto()
        };
        assert!(dto.validate().is_err());

        assert!(update_dto(Some(&at_limit)).validate().is_ok());
        assert!(update_dto(Some(&over_limit)).validate().is_err());
    }

    #[test]
    fn test_password_limit_counts_bytes() {
        // 37 two-byte characters: 37 chars, 74 bytes
        let dto = CreateUserDto {
            password: "é".repeat(37),
            ..create_dto()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_new_password_ignores_empty() {
        assert_eq!(update_dto(None).new_password(), None);
        assert_eq!(update_dto(Some("")).new_password(), None);
        assert_eq!(
            update_dto(Some("password123")).new_password(),
            Some("password123")
        );
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "$2b$04$secret".to_string(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!format!("{:?}", user).contains("secret"));
    }
}
