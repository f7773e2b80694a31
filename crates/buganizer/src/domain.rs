//! Core domain types for the issue tracker.
//!
//! This module defines the issue record consumed by the filter engine along
//! with its priority, severity and status enumerations. Issues serialize in
//! the camelCase shape used by the web client so fixture files can be shared.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Error returned when a wire name does not name a known enum variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Issue priority level
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Priority {
    /// Critical - immediate action required
    P0,
    /// High - resolve within 24 hours
    P1,
    /// Medium - resolve within 3 days
    P2,
    /// Low - resolve within 1 week
    P3,
    /// Trivial - no specific timeline
    P4,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::P0,
        Priority::P1,
        Priority::P2,
        Priority::P3,
        Priority::P4,
    ];

    /// Wire name (`P0`..`P4`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
            Priority::P4 => "P4",
        }
    }
}

/// Issue severity level
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Severity {
    /// Critical - system down
    S0,
    /// Major - significant impact
    S1,
    /// Moderate - partial functionality affected
    S2,
    /// Minor - edge case or cosmetic issue
    S3,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::S0, Severity::S1, Severity::S2, Severity::S3];

    /// Wire name (`S0`..`S3`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::S0 => "S0",
            Severity::S1 => "S1",
            Severity::S2 => "S2",
            Severity::S3 => "S3",
        }
    }
}

/// Issue lifecycle status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Newly created, not yet triaged
    New,
    /// Assigned but not started
    Assigned,
    /// Currently being worked on
    InProgress,
    /// Fix implemented
    Fixed,
    /// Fix verified
    Verified,
    /// Closed
    Closed,
    /// Marked as a duplicate of another issue
    Duplicate,
    /// Will not be fixed
    WontFix,
}

impl Status {
    pub const ALL: [Status; 8] = [
        Status::New,
        Status::Assigned,
        Status::InProgress,
        Status::Fixed,
        Status::Verified,
        Status::Closed,
        Status::Duplicate,
        Status::WontFix,
    ];

    /// Wire name (`NEW`, `IN_PROGRESS`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "NEW",
            Status::Assigned => "ASSIGNED",
            Status::InProgress => "IN_PROGRESS",
            Status::Fixed => "FIXED",
            Status::Verified => "VERIFIED",
            Status::Closed => "CLOSED",
            Status::Duplicate => "DUPLICATE",
            Status::WontFix => "WONT_FIX",
        }
    }
}

macro_rules! wire_enum_impls {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| ParseEnumError::new($kind, s))
            }
        }
    };
}

wire_enum_impls!(Priority, "priority");
wire_enum_impls!(Severity, "severity");
wire_enum_impls!(Status, "status");

/// A bug report or feature request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Unique identifier
    pub id: String,
    /// Short summary of the issue
    pub title: String,
    /// Detailed description
    #[serde(default)]
    pub description: String,
    /// Steps to reproduce (may be empty)
    #[serde(default)]
    pub reproduce_steps: String,
    /// Component the issue is filed against
    pub component_id: String,
    /// User who filed the issue
    pub reporter_id: String,
    /// Assigned user, if any
    #[serde(default)]
    pub assignee_id: Option<String>,
    pub priority: Priority,
    pub severity: Severity,
    pub status: Status,
    /// Due date derived from the SLA, if any
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Issue {
    /// Create a new issue with default values
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            reproduce_steps: String::new(),
            component_id: String::new(),
            reporter_id: String::new(),
            assignee_id: None,
            priority: Priority::P2,
            severity: Severity::S2,
            status: Status::New,
            due_date: None,
            created_at: now,
            updated_at: now,
            labels: Vec::new(),
        }
    }

    /// The assignee, treating an empty id as unassigned.
    pub fn assignee(&self) -> Option<&str> {
        self.assignee_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Text searched by free-text filter terms: title, description and
    /// reproduction steps joined by single spaces.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title, self.description, self.reproduce_steps
        )
    }
}
