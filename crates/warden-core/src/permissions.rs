//! Permission and role identifiers.
//!
//! Protected resources are named here once and checked through
//! [`ProtectedPermission`] and [`SUPER_ADMIN_ROLE`] instead of string literals
//! scattered across call sites.
//!
//! # Example
//!
//! ```ignore
//! use warden_core::permissions::{self, ProtectedPermission};
//!
//! assert!(ProtectedPermission::from_name("manage roles").is_some());
//! assert!(permissions::is_protected_role_name("super-admin"));
//! ```

use std::fmt;

/// Name of the privileged role that can never be deleted or emptied.
pub const SUPER_ADMIN_ROLE: &str = "super-admin";

/// Name of the seeded administrative role.
pub const ADMIN_ROLE: &str = "admin";

/// Guard assigned to permissions when none is given.
pub const DEFAULT_GUARD: &str = "web";

// =============================================================================
// Dashboard / settings permissions
// =============================================================================

/// Permission to view the dashboard
pub const VIEW_DASHBOARD: &str = "view dashboard";
/// Permission to view settings
pub const VIEW_SETTINGS: &str = "view settings";

// =============================================================================
// Users permissions
// =============================================================================

/// Permission to list and read users
pub const VIEW_USERS: &str = "view users";
/// Permission to create users
pub const CREATE_USERS: &str = "create users";
/// Permission to edit users
pub const EDIT_USERS: &str = "edit users";
/// Permission to delete users
pub const DELETE_USERS: &str = "delete users";

// =============================================================================
// Roles and permissions management
// =============================================================================

/// Permission to list and read roles
pub const VIEW_ROLES: &str = "view roles";
/// Permission to create, edit and delete roles and manage their members
pub const MANAGE_ROLES: &str = "manage roles";
/// Permission to create, rename and delete permissions
pub const MANAGE_PERMISSIONS: &str = "manage permissions";

/// Every permission created by the bootstrap step.
pub const DEFAULT_PERMISSIONS: &[&str] = &[
    VIEW_DASHBOARD,
    VIEW_USERS,
    CREATE_USERS,
    EDIT_USERS,
    DELETE_USERS,
    VIEW_ROLES,
    MANAGE_ROLES,
    MANAGE_PERMISSIONS,
    VIEW_SETTINGS,
];

/// Permissions granted to the seeded `admin` role.
pub const ADMIN_PERMISSIONS: &[&str] = &[
    VIEW_USERS,
    CREATE_USERS,
    EDIT_USERS,
    VIEW_ROLES,
    VIEW_SETTINGS,
];

/// Permissions that can never be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtectedPermission {
    ManageRoles,
    ManagePermissions,
}

impl ProtectedPermission {
    pub const ALL: [ProtectedPermission; 2] = [
        ProtectedPermission::ManageRoles,
        ProtectedPermission::ManagePermissions,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ProtectedPermission::ManageRoles => MANAGE_ROLES,
            ProtectedPermission::ManagePermissions => MANAGE_PERMISSIONS,
        }
    }

    /// Exact, case-sensitive match against the protected names.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for ProtectedPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_protected_permission_name(name: &str) -> bool {
    ProtectedPermission::from_name(name).is_some()
}

pub fn is_protected_role_name(name: &str) -> bool {
    name == SUPER_ADMIN_ROLE
}
