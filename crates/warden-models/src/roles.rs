//! Role records, membership views and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{PermissionId, RoleId, UserId};
use crate::permissions::Permission;
use crate::users::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: RoleId,
    #[schema(example = "editor")]
    pub name: String,
    pub description: Option<String>,
    pub is_protected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Id and name of a role, used where a full record would be noise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RoleRef {
    pub id: RoleId,
    pub name: String,
}

impl From<&Role> for RoleRef {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id,
            name: role.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleWithRelations {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub users: Vec<UserSummary>,
}

/// Members of a role and the users that could still be added to it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleMembers {
    pub role: Role,
    pub members: Vec<UserSummary>,
    pub available_users: Vec<UserSummary>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRoleDto {
    #[validate(
        length(max = 255, message = "Name must not exceed 255 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub name: String,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<PermissionId>,
}

/// Full replacement of a role. `permission_ids` becomes the complete
/// permission set; anything not listed is revoked.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleDto {
    #[validate(
        length(max = 255, message = "Name must not exceed 255 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub name: String,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    pub permission_ids: Vec<PermissionId>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddMemberDto {
    pub user_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_role_defaults_to_no_permissions() {
        let dto: CreateRoleDto = serde_json::from_str(r#"{"name":"editor"}"#).unwrap();
        assert!(dto.permission_ids.is_empty());
        assert!(dto.description.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_role_requires_permission_ids() {
        let result: Result<UpdateRoleDto, _> = serde_json::from_str(r#"{"name":"editor"}"#);
        assert!(result.is_err());

        let dto: UpdateRoleDto =
            serde_json::from_str(r#"{"name":"editor","permission_ids":[]}"#).unwrap();
        assert!(dto.permission_ids.is_empty());
    }

    #[test]
    fn test_blank_role_name_is_invalid() {
        let dto = CreateRoleDto {
            name: " ".to_string(),
            description: None,
            permission_ids: vec![],
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_description_length() {
        let dto = CreateRoleDto {
            name: "editor".to_string(),
            description: Some("x".repeat(501)),
            permission_ids: vec![],
        };
        assert!(dto.validate().is_err());
    }
}
