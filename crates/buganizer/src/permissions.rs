//! Role-based permission matrix.
//!
//! Roles grant actions on resources through a static table. Lookups are
//! case-sensitive on resource and action names, which are lowercase.

use crate::domain::ParseEnumError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Organisation or team role, ordered from least to most privileged
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Read-only access
    Viewer,
    /// Regular team member
    Developer,
    /// Team or project manager
    Manager,
    /// Organisation admin
    Admin,
}

impl Role {
    /// Lowest to highest
    pub const ALL: [Role; 4] = [Role::Viewer, Role::Developer, Role::Manager, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "VIEWER",
            Role::Developer => "DEVELOPER",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError::new("role", s))
    }
}

/// Actions a role may take on one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub resource: &'static str,
    pub actions: &'static [&'static str],
}

const fn grant(resource: &'static str, actions: &'static [&'static str]) -> Grant {
    Grant { resource, actions }
}

/// Resources known to the matrix, in display order.
pub const RESOURCES: [&str; 7] = [
    "issue",
    "team",
    "assignment",
    "user",
    "organization",
    "settings",
    "report",
];

const CRUD: &[&str] = &["create", "read", "update", "delete"];
const READ: &[&str] = &["read"];

/// Grants per role. Viewers have no entry for `settings`.
pub const PERMISSION_MATRIX: &[(Role, &[Grant])] = &[
    (
        Role::Admin,
        &[
            grant("issue", CRUD),
            grant("team", CRUD),
            grant("assignment", CRUD),
            grant("user", &["invite", "read", "update", "remove"]),
            grant("organization", &["read", "update"]),
            grant("settings", &["read", "update"]),
            grant("report", &["read", "create", "share"]),
        ],
    ),
    (
        Role::Manager,
        &[
            grant("issue", CRUD),
            grant("team", &["read", "update"]),
            grant("assignment", CRUD),
            grant("user", &["invite", "read"]),
            grant("organization", READ),
            grant("settings", READ),
            grant("report", &["read", "create"]),
        ],
    ),
    (
        Role::Developer,
        &[
            grant("issue", &["create", "read", "update"]),
            grant("team", READ),
            grant("assignment", &["read", "update"]),
            grant("user", READ),
            grant("organization", READ),
            grant("settings", READ),
            grant("report", READ),
        ],
    ),
    (
        Role::Viewer,
        &[
            grant("issue", READ),
            grant("team", READ),
            grant("assignment", READ),
            grant("user", READ),
            grant("organization", READ),
            grant("report", READ),
        ],
    ),
];

/// Every grant held by `role`.
pub fn grants(role: Role) -> &'static [Grant] {
    PERMISSION_MATRIX
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, grants)| *grants)
        .unwrap_or(&[])
}

/// Actions `role` may take on `resource`; empty for unknown resources.
pub fn allowed_actions(role: Role, resource: &str) -> &'static [&'static str] {
    grants(role)
        .iter()
        .find(|g| g.resource == resource)
        .map(|g| g.actions)
        .unwrap_or(&[])
}

/// Whether `role` may perform `action` on `resource`.
///
/// # Examples
///
/// ```
/// use buganizer::permissions::{allows, Role};
///
/// assert!(allows(Role::Manager, "issue", "delete"));
/// assert!(!allows(Role::Developer, "issue", "delete"));
/// ```
pub fn allows(role: Role, resource: &str, action: &str) -> bool {
    allowed_actions(role, resource).contains(&action)
}
