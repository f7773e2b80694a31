//! Command-line interface definitions using clap.

use crate::permissions::Role;
use crate::storage::{SortField, SortOrder};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Issue filter toolkit
///
/// Parses, evaluates and completes filter strings such as
/// `is:open priority:P0 assignee:me crash` against issue lists.
///
/// Exit Codes:
///   0  - Command succeeded
///   1  - Generic error occurred
///   2  - Invalid arguments or usage error
///   3  - Resource not found (issue, view, user)
///   5  - Permission denied
///  10  - External dependency failed (file system)
#[derive(Parser)]
#[command(name = "buganizer")]
#[command(about = "Issue filter query toolkit", long_about = None)]
pub struct Cli {
    /// Suppress non-essential output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Read settings from this TOML file instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter, sort and paginate issues
    ///
    /// Without --issues the built-in demo data set is searched.
    Search {
        /// Filter string (default: `[search] default_query` from config)
        query: Option<String>,

        /// JSON array of issues to search
        #[arg(long, value_name = "FILE")]
        issues: Option<PathBuf>,

        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Issues per page
        #[arg(long)]
        page_size: Option<usize>,

        /// Resume from a nextPageToken (overrides --page)
        #[arg(long, conflicts_with = "page")]
        page_token: Option<String>,

        /// Sort field (id, title, priority, severity, status, dueDate, createdAt, updatedAt)
        #[arg(long)]
        order_by: Option<SortField>,

        /// Sort direction (asc, desc)
        #[arg(long)]
        order: Option<SortOrder>,

        /// User that `assignee:me` resolves to
        #[arg(long)]
        user: Option<String>,

        /// Evaluate date filters as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,

        #[arg(long)]
        json: bool,
    },

    /// Show the structured filters of a query
    Parse {
        query: String,

        #[arg(long)]
        json: bool,
    },

    /// Suggest completions for a partially typed filter
    Suggest {
        /// Partial input, e.g. `prio` or `status:in`
        #[arg(default_value = "")]
        partial: String,

        #[arg(long)]
        json: bool,
    },

    /// Remove one key:value chip from a query
    Remove {
        query: String,
        key: String,
        value: String,

        #[arg(long)]
        json: bool,
    },

    /// Show what a role may do
    Permissions {
        /// ADMIN, MANAGER, DEVELOPER or VIEWER
        role: Role,

        /// Limit output to one resource
        #[arg(long)]
        resource: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// List or open saved views
    Views {
        /// Requesting user (default: configured current user)
        #[arg(long)]
        user: Option<String>,

        /// Team the user belongs to (repeatable)
        #[arg(long = "team", value_name = "TEAM")]
        teams: Vec<String>,

        /// Open a single view by id
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Sign in as a demo account and show the session
    Login {
        email: String,

        #[arg(long)]
        json: bool,
    },

    /// Print the JSON schema of the issue file format
    Schema,
}

impl Commands {
    /// Name reported in JSON metadata
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Search { .. } => "search",
            Commands::Parse { .. } => "parse",
            Commands::Suggest { .. } => "suggest",
            Commands::Remove { .. } => "remove",
            Commands::Permissions { .. } => "permissions",
            Commands::Views { .. } => "views",
            Commands::Login { .. } => "login",
            Commands::Schema => "schema",
        }
    }

    pub fn wants_json(&self) -> bool {
        match self {
            Commands::Search { json, .. }
            | Commands::Parse { json, .. }
            | Commands::Suggest { json, .. }
            | Commands::Remove { json, .. }
            | Commands::Permissions { json, .. }
            | Commands::Views { json, .. }
            | Commands::Login { json, .. } => *json,
            Commands::Schema => true,
        }
    }
}
