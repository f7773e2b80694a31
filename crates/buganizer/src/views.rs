//! Saved views: named filter strings, personal or shared with a team.

use crate::filter::{FilterMap, Parser};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("Invalid view: name must not be empty")]
    EmptyName,

    #[error("Invalid view: query must not be empty")]
    EmptyQuery,

    #[error("View not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {user} cannot access view {view}")]
    PermissionDenied { view: String, user: String },
}

/// A named filter string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedView {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub is_team_view: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub query_string: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedView {
    pub fn filters(&self) -> FilterMap {
        Parser::parse(&self.query_string)
    }

    fn visible_to(&self, user: &str, teams: &[String]) -> bool {
        if self.owner_id == user {
            return true;
        }
        self.is_team_view
            && self
                .team_id
                .as_ref()
                .is_some_and(|team| teams.contains(team))
    }
}

/// In-memory store of saved views. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct ViewRegistry {
    views: Rc<RefCell<Vec<SavedView>>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the three demo views.
    pub fn demo(now: DateTime<Utc>) -> Self {
        let registry = Self::new();
        let seed = [
            ("view-1", "My Open Issues", "user-1", None, "is:open assignee:me", 10, 5),
            ("view-2", "Critical Issues", "user-1", Some("team-1"), "is:open priority:p0", 8, 3),
            (
                "view-3",
                "Frontend Bugs",
                "user-2",
                Some("team-1"),
                "is:open component:frontend label:bug",
                5,
                2,
            ),
        ];

        {
            let mut views = registry.views.borrow_mut();
            for (id, name, owner, team, query, created_days, updated_days) in seed {
                views.push(SavedView {
                    id: id.to_string(),
                    name: name.to_string(),
                    owner_id: owner.to_string(),
                    is_team_view: team.is_some(),
                    team_id: team.map(str::to_string),
                    query_string: query.to_string(),
                    created_at: now - Duration::days(created_days),
                    updated_at: now - Duration::days(updated_days),
                });
            }
        }
        registry
    }

    /// Store a new view. Passing a team makes it a team view.
    ///
    /// # Examples
    ///
    /// ```
    /// use buganizer::views::ViewRegistry;
    ///
    /// let registry = ViewRegistry::new();
    /// let view = registry.save("Mine", "user-1", None, "assignee:me").unwrap();
    /// assert!(!view.is_team_view);
    /// assert!(registry.save("", "user-1", None, "is:open").is_err());
    /// ```
    pub fn save(
        &self,
        name: &str,
        owner: &str,
        team: Option<&str>,
        query: &str,
    ) -> Result<SavedView, ViewError> {
        if name.trim().is_empty() {
            return Err(ViewError::EmptyName);
        }
        if query.trim().is_empty() {
            return Err(ViewError::EmptyQuery);
        }

        let now = Utc::now();
        let view = SavedView {
            id: format!("view-{}", Uuid::new_v4()),
            name: name.to_string(),
            owner_id: owner.to_string(),
            is_team_view: team.is_some(),
            team_id: team.map(str::to_string),
            query_string: query.to_string(),
            created_at: now,
            updated_at: now,
        };

        tracing::debug!(id = %view.id, owner, team_view = view.is_team_view, "saved view");
        self.views.borrow_mut().push(view.clone());
        Ok(view)
    }

    /// Load a view the requester may see: their own, or a team view of one
    /// of their teams.
    pub fn get(&self, id: &str, requester: &str, teams: &[String]) -> Result<SavedView, ViewError> {
        let views = self.views.borrow();
        let view = views
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| ViewError::NotFound(id.to_string()))?;

        if !view.visible_to(requester, teams) {
            return Err(ViewError::PermissionDenied {
                view: id.to_string(),
                user: requester.to_string(),
            });
        }
        Ok(view.clone())
    }

    /// Personal views of `user` plus team views of `teams`, sorted by name.
    pub fn list_for(&self, user: &str, teams: &[String]) -> Vec<SavedView> {
        let mut visible: Vec<SavedView> = self
            .views
            .borrow()
            .iter()
            .filter(|v| v.visible_to(user, teams))
            .cloned()
            .collect();
        visible.sort_by(|a, b| a.name.cmp(&b.name));
        visible
    }

    /// Delete a view. Only the owner may delete.
    pub fn delete(&self, id: &str, requester: &str) -> Result<(), ViewError> {
        let mut views = self.views.borrow_mut();
        let index = views
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| ViewError::NotFound(id.to_string()))?;

        if views[index].owner_id != requester {
            return Err(ViewError::PermissionDenied {
                view: id.to_string(),
                user: requester.to_string(),
            });
        }
        views.remove(index);
        Ok(())
    }
}
