//! Buganizer issue filter library
//!
//! Parses filter strings such as `is:open priority:P0 assignee:me crash`,
//! evaluates them against issues and suggests completions while typing.
//! The surrounding modules provide the issue repository, saved views,
//! permission matrix and CLI plumbing.

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod filter;
pub mod output;
pub mod permissions;
pub mod session;
pub mod storage;
pub mod views;

// Re-export commonly used types
pub use domain::{Issue, Priority, Severity, Status};
pub use filter::{apply_filters, parse, suggest, FilterContext, FilterMap, FilterQuery};
pub use output::{ExitCode, JsonError, JsonOutput};
pub use storage::{InMemoryIssueRepository, IssueRepository};
