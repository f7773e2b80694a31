//! Actionable error formatting for the CLI.
//!
//! Errors raised at the command-line edge carry:
//! - a clear description
//! - possible causes
//! - remediation steps
//!
//! Library failures stay typed (`thiserror`); these helpers wrap them when
//! they reach the user.

use std::fmt;
use std::path::Path;

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use buganizer::errors::ActionableError;
///
/// let error = ActionableError::new("Issues file not found: issues.json")
///     .with_cause("The path may be relative to a different directory")
///     .with_remedy("Inspect the expected format: buganizer schema");
///
/// eprintln!("{}", error);
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    error: String,
    causes: Vec<String>,
    remediation: Vec<String>,
}

impl ActionableError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause (diagnostic hint).
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step.
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    /// The one-line description without causes or remedies.
    pub fn message(&self) -> &str {
        &self.error
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    pub fn remedies(&self) -> &[String] {
        &self.remediation
    }

    pub fn to_error_message(&self) -> String {
        let mut msg = format!("{}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

/// Issues file could not be read or parsed.
pub fn issues_file_unreadable(path: &Path, reason: &str) -> ActionableError {
    ActionableError::new(format!("Failed to load issues from {}", path.display()))
        .with_cause(reason.to_string())
        .with_cause("The file must hold a JSON array of issues in camelCase")
        .with_remedy("Inspect the expected format: buganizer schema")
        .with_remedy("Omit --issues to search the built-in demo data")
}

/// No account matches the given email.
pub fn unknown_user(email: &str, known: &[&str]) -> ActionableError {
    let mut error = ActionableError::new(format!("User not found: {}", email))
        .with_cause("The email may be misspelled");
    if !known.is_empty() {
        error = error.with_remedy(format!("Known accounts: {}", known.join(", ")));
    }
    error
}

/// A saved view exists but the requester may not open it.
pub fn view_access_denied(view_id: &str, user: &str) -> ActionableError {
    ActionableError::new(format!("Permission denied: {} cannot open view {}", user, view_id))
        .with_cause("The view is personal to another user")
        .with_cause("The view belongs to a team the user is not a member of")
        .with_remedy("Pass the owning team with --team <TEAM>")
        .with_remedy(format!("List accessible views: buganizer views --user {}", user))
}

/// A page token that is not an offset returned by a previous page.
pub fn invalid_page_token(token: &str) -> ActionableError {
    ActionableError::new(format!("Invalid page token: '{}'", token))
        .with_cause("Page tokens are issue offsets printed as nextPageToken")
        .with_remedy("Start again from the first page by omitting --page-token")
}
