//! Authentication session and the demo user directory.
//!
//! A session is either anonymous or holds a token, the signed-in user and
//! that user's role assignments. Permission checks go through the static
//! matrix in [`crate::permissions`].

use crate::permissions::{allows, Role};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Organisation every demo account belongs to.
pub const DEMO_ORGANIZATION_ID: &str = "org-1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("User not found: {0}")]
    UnknownUser(String),
}

/// An account that can sign in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A role held by a user, organisation-wide or scoped to one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub id: String,
    pub user_id: String,
    pub organization_id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}

impl UserRole {
    pub fn is_org_wide(&self) -> bool {
        self.team_id.is_none()
    }
}

/// Accounts and their organisation-wide roles
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    entries: Vec<(User, Role)>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four demo accounts.
    pub fn demo() -> Self {
        let mut directory = Self::new();
        directory.add("user-1", "Admin User", "admin@buganizer.dev", Role::Admin);
        directory.add("user-2", "Developer User", "developer@buganizer.dev", Role::Developer);
        directory.add("user-3", "Manager User", "manager@buganizer.dev", Role::Manager);
        directory.add("user-4", "QA Tester", "tester@buganizer.dev", Role::Developer);
        directory
    }

    pub fn add(&mut self, id: &str, name: &str, email: &str, role: Role) {
        let user = User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        };
        self.entries.push((user, role));
    }

    /// Exact, case-sensitive email lookup.
    pub fn find_by_email(&self, email: &str) -> Option<(&User, Role)> {
        self.entries
            .iter()
            .find(|(user, _)| user.email == email)
            .map(|(user, role)| (user, *role))
    }

    pub fn emails(&self) -> Vec<&str> {
        self.entries.iter().map(|(u, _)| u.email.as_str()).collect()
    }
}

/// Current authentication state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        token: String,
        user: User,
        roles: Vec<UserRole>,
    },
}

impl Session {
    /// Sign in by email. The password check is out of scope for the demo
    /// directory; any known email succeeds.
    ///
    /// # Examples
    ///
    /// ```
    /// use buganizer::permissions::Role;
    /// use buganizer::session::{Session, UserDirectory};
    ///
    /// let session = Session::login(&UserDirectory::demo(), "manager@buganizer.dev").unwrap();
    /// assert_eq!(session.highest_role(None), Some(Role::Manager));
    /// ```
    pub fn login(directory: &UserDirectory, email: &str) -> Result<Self, SessionError> {
        let (user, role) = directory
            .find_by_email(email)
            .ok_or_else(|| SessionError::UnknownUser(email.to_string()))?;

        tracing::debug!(user = %user.id, %role, "signed in");

        Ok(Session::Authenticated {
            token: Uuid::new_v4().to_string(),
            user: user.clone(),
            roles: vec![UserRole {
                id: format!("role-{}", user.id),
                user_id: user.id.clone(),
                organization_id: DEMO_ORGANIZATION_ID.to_string(),
                role,
                team_id: None,
            }],
        })
    }

    pub fn logout(&mut self) {
        *self = Session::Anonymous;
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Authenticated { user, .. } => Some(user),
            Session::Anonymous => None,
        }
    }

    pub fn roles(&self) -> &[UserRole] {
        match self {
            Session::Authenticated { roles, .. } => roles,
            Session::Anonymous => &[],
        }
    }

    /// Grant a team-scoped role to the signed-in user. No-op when anonymous.
    pub fn grant_team_role(&mut self, team_id: &str, role: Role) {
        if let Session::Authenticated { user, roles, .. } = self {
            roles.push(UserRole {
                id: format!("role-{}-{}", user.id, team_id),
                user_id: user.id.clone(),
                organization_id: DEMO_ORGANIZATION_ID.to_string(),
                role,
                team_id: Some(team_id.to_string()),
            });
        }
    }

    /// Organisation-wide roles always apply; team roles apply only within
    /// their team.
    pub fn has_permission(&self, resource: &str, action: &str, team_id: Option<&str>) -> bool {
        self.roles()
            .iter()
            .filter(|r| r.is_org_wide() || (team_id.is_some() && r.team_id.as_deref() == team_id))
            .any(|r| allows(r.role, resource, action))
    }

    /// Whether the user holds any of `wanted` in the given scope.
    pub fn has_role(&self, wanted: &[Role], team_id: Option<&str>) -> bool {
        self.scoped_roles(team_id).any(|role| wanted.contains(&role))
    }

    /// Highest role within a team, or organisation-wide when `team_id` is
    /// `None`.
    pub fn highest_role(&self, team_id: Option<&str>) -> Option<Role> {
        self.scoped_roles(team_id).max()
    }

    fn scoped_roles<'a>(&'a self, team_id: Option<&'a str>) -> impl Iterator<Item = Role> + 'a {
        self.roles()
            .iter()
            .filter(move |r| r.team_id.as_deref() == team_id)
            .map(|r| r.role)
    }
}
