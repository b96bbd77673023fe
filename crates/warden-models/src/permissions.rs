//! Permission records and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::PermissionId;
use crate::roles::RoleRef;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Permission {
    pub id: PermissionId,
    #[schema(example = "view users")]
    pub name: String,
    #[schema(example = "web")]
    pub guard_name: String,
    /// Set at creation for the protected identifiers and never cleared.
    pub is_protected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A permission together with the roles granting it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionWithRoles {
    #[serde(flatten)]
    pub permission: Permission,
    pub roles: Vec<RoleRef>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePermissionDto {
    #[validate(
        length(max = 255, message = "Name must not exceed 255 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    #[schema(example = "export reports")]
    pub name: String,
    /// Defaults to the configured guard (`web`).
    #[validate(length(min = 1, max = 255))]
    pub guard_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RenamePermissionDto {
    #[validate(
        length(max = 255, message = "Name must not exceed 255 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub name: String,
}
