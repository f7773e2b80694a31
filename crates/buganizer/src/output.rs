//! Structured output formatting for CLI commands.
//!
//! Every `--json` response uses the same `{success, data, metadata}`
//! envelope; failures use `{success, error, metadata}`.

use chrono::Utc;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt::Display;
use std::io::{self, Write};

use crate::domain::Issue;
use crate::filter::{FilterMap, Suggestion};
use crate::permissions::{Grant, Role};
use crate::views::SavedView;

/// Version of the JSON output format
const OUTPUT_VERSION: &str = "0.1.0";

// ============================================================================
// Output Context for Quiet Mode
// ============================================================================

/// Context for controlling output verbosity
pub struct OutputContext {
    quiet: bool,
    json: bool,
}

impl OutputContext {
    pub fn new(quiet: bool, json: bool) -> Self {
        Self { quiet, json }
    }

    /// Print essential output (always shown unless --json)
    pub fn print_data(&self, msg: impl Display) -> io::Result<()> {
        if !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print informational message (suppressed by --quiet or --json)
    pub fn print_info(&self, msg: impl Display) -> io::Result<()> {
        if !self.quiet && !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print a JSON document (only with --json)
    pub fn print_json(&self, json: &str) -> io::Result<()> {
        if self.json {
            writeln_safe(json)
        } else {
            Ok(())
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Safe println that handles broken pipes gracefully
fn writeln_safe(msg: &str) -> io::Result<()> {
    match writeln!(io::stdout(), "{}", msg) {
        Ok(_) => Ok(()),
        // Piping into `head` closes stdout early.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => std::process::exit(0),
        Err(e) => Err(e),
    }
}

// ============================================================================
// JSON Output Types
// ============================================================================

/// Wrapper for successful command output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T, command: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            metadata: Metadata::new(command),
        }
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrapper for error output with suggestions
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub success: bool,
    pub error: ErrorDetail,
    pub metadata: Metadata,
}

impl JsonError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
                suggestions: Vec::new(),
            },
            metadata: Metadata::new(command),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.error.details = Some(details);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.error.suggestions.push(suggestion.into());
        self
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn exit_code(&self) -> ExitCode {
        ErrorCode::to_exit_code(&self.error.code)
    }
}

/// Error details including code, message, and suggestions
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code (e.g., "ISSUE_NOT_FOUND", "PERMISSION_DENIED")
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

// ============================================================================
// Exit Codes
// ============================================================================

/// Process exit codes
///
/// # Examples
///
/// ```rust
/// use buganizer::output::ExitCode;
///
/// assert_eq!(ExitCode::NotFound.code(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded (0)
    Success = 0,

    /// Generic error (1)
    GenericError = 1,

    /// Invalid arguments, query options or input files (2)
    InvalidArgument = 2,

    /// Issue, view or user not found (3)
    NotFound = 3,

    /// Permission denied (5)
    PermissionDenied = 5,

    /// File system failure (10)
    ExternalError = 10,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }

    /// JSON error code reported alongside this exit code.
    pub fn error_code(self) -> &'static str {
        match self {
            ExitCode::Success => "",
            ExitCode::GenericError => ErrorCode::INTERNAL,
            ExitCode::InvalidArgument => ErrorCode::INVALID_ARGUMENT,
            ExitCode::NotFound => ErrorCode::NOT_FOUND,
            ExitCode::PermissionDenied => ErrorCode::PERMISSION_DENIED,
            ExitCode::ExternalError => ErrorCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Error Codes (String constants for JSON responses)
// ============================================================================

/// Standard error codes (JSON format)
pub struct ErrorCode;

impl ErrorCode {
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    pub const INVALID_ARGUMENT: &'static str = "INVALID_ARGUMENT";
    pub const PERMISSION_DENIED: &'static str = "PERMISSION_DENIED";
    pub const IO_ERROR: &'static str = "IO_ERROR";
    pub const INTERNAL: &'static str = "INTERNAL";

    pub fn to_exit_code(code: &str) -> ExitCode {
        match code {
            Self::NOT_FOUND => ExitCode::NotFound,
            Self::INVALID_ARGUMENT => ExitCode::InvalidArgument,
            Self::PERMISSION_DENIED => ExitCode::PermissionDenied,
            Self::IO_ERROR => ExitCode::ExternalError,
            _ => ExitCode::GenericError,
        }
    }
}

/// Metadata attached to every JSON response
#[derive(Debug, Serialize)]
pub struct Metadata {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: chrono::DateTime<Utc>,
    /// Version of the output format
    pub version: String,
    /// Command that generated this response
    pub command: String,
}

impl Metadata {
    fn new(command: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            version: OUTPUT_VERSION.to_string(),
            command: command.into(),
        }
    }
}

fn serialize_timestamp<S>(dt: &chrono::DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// Command Response Types
// ============================================================================

/// Response for `parse`
#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub query: String,
    pub filters: FilterMap,
    /// The query rebuilt from `filters`
    pub normalized: String,
}

/// Response for `suggest`
#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub input: String,
    pub suggestions: Vec<Suggestion>,
}

/// Response for `remove`
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub query: String,
    pub removed: String,
}

/// Response for `permissions`
#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub role: Role,
    pub grants: Vec<Grant>,
}

/// Response for `views`
#[derive(Debug, Serialize)]
pub struct ViewsResponse {
    pub user: String,
    pub views: Vec<SavedView>,
    pub count: usize,
}

/// One line of the human-readable issue table.
pub fn format_issue_row(issue: &Issue) -> String {
    format!(
        "{:<10} {} {} {:<12} {:<8} {}",
        issue.id,
        issue.priority,
        issue.severity,
        issue.status,
        issue.assignee().unwrap_or("-"),
        issue.title
    )
}
