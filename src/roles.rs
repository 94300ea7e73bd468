use serde::{Deserialize, Serialize};

/// Role
///
/// The closed set of permission tiers, ranked in a total order. Higher tiers are
/// supersets of lower tiers' allowed operations, and the top tier (super_admin)
/// bypasses every check unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Hierarchy rank; higher number = more permissions.
    pub fn rank(self) -> u8 {
        match self {
            Role::Viewer => 1,
            Role::Editor => 2,
            Role::Admin => 3,
            Role::SuperAdmin => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Resolves a stored role name. Returns None for anything outside the
    /// closed set, which callers treat as a corrupt credential.
    pub fn parse(name: &str) -> Option<Role> {
        match name {
            "viewer" => Some(Role::Viewer),
            "editor" => Some(Role::Editor),
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    /// Human-facing denial message for a failed minimum-role check.
    pub fn denial_message(self) -> &'static str {
        match self {
            Role::Viewer => "Authentication required",
            Role::Editor => "Editor access required",
            Role::Admin => "Admin access required",
            Role::SuperAdmin => "Super admin access required",
        }
    }

    /// The four canonical role names, in descending rank order. Used by the
    /// seeder to populate the roles table.
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::Editor, Role::Viewer];
}

/// has_permission
///
/// True if the user's role rank meets the required rank, or if the user holds
/// the top tier, which passes regardless of the nominal minimum.
pub fn has_permission(user_role: Role, required: Role) -> bool {
    if user_role == Role::SuperAdmin {
        return true;
    }
    user_role.rank() >= required.rank()
}
