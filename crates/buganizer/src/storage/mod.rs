//! Data-access boundary for issue collections.
//!
//! This module defines the `IssueRepository` trait that the list view talks
//! to. The filter engine itself stays pure; the repository runs it, then
//! sorts and paginates. Backends (HTTP client, in-memory fixture) are
//! interchangeable behind the trait.

use crate::domain::{Issue, ParseEnumError};
use crate::filter::{FilterContext, FilterQuery};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod memory;

pub use memory::InMemoryIssueRepository;

/// Default number of issues per page in the list view.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Failures surfaced by repository backends
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Issue not found: {0}")]
    NotFound(String),

    #[error("Invalid page size: {0} (must be at least 1)")]
    InvalidPageSize(usize),

    #[error("Invalid page token: '{0}'")]
    InvalidPageToken(String),

    #[error("Failed to read issues: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse issues: {0}")]
    Json(#[from] serde_json::Error),
}

/// Issue field the list view can sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    Title,
    Priority,
    Severity,
    Status,
    DueDate,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Id,
        SortField::Title,
        SortField::Priority,
        SortField::Severity,
        SortField::Status,
        SortField::DueDate,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Priority => "priority",
            SortField::Severity => "severity",
            SortField::Status => "status",
            SortField::DueDate => "dueDate",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    /// Ascending comparison of two issues on this field.
    ///
    /// Issues without a due date sort before those with one.
    pub fn compare(&self, a: &Issue, b: &Issue) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::Severity => a.severity.cmp(&b.severity),
            SortField::Status => a.status.cmp(&b.status),
            SortField::DueDate => a.due_date.cmp(&b.due_date),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.replace(['_', '-'], "").to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().to_ascii_lowercase() == wanted)
            .ok_or_else(|| ParseEnumError::new("sort field", s))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ParseEnumError::new("sort order", s)),
        }
    }
}

/// One page request from the list view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Raw filter string, e.g. `is:open assignee:me`
    pub query: String,
    /// Zero-based page index
    pub page: usize,
    pub page_size: usize,
    pub order_by: SortField,
    pub order: SortOrder,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            order_by: SortField::default(),
            order: SortOrder::default(),
        }
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn order_by(mut self, field: SortField, order: SortOrder) -> Self {
        self.order_by = field;
        self.order = order;
        self
    }

    /// Resume from a `next_page_token` returned by an earlier page.
    ///
    /// The token is the decimal offset of the first issue of the next page.
    pub fn resume_from(mut self, token: &str) -> Result<Self, RepositoryError> {
        if self.page_size == 0 {
            return Err(RepositoryError::InvalidPageSize(0));
        }
        let offset: usize = token
            .trim()
            .parse()
            .map_err(|_| RepositoryError::InvalidPageToken(token.to_string()))?;
        self.page = offset / self.page_size;
        Ok(self)
    }

    fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }
}

/// A page of results plus what the list view needs to paginate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matches across all pages
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    /// Offset of the next page, absent on the last page
    pub next_page_token: Option<String>,
}

/// Trait for backends that serve issue collections to the list view.
///
/// # Examples
///
/// ```
/// use buganizer::filter::FilterContext;
/// use buganizer::storage::{InMemoryIssueRepository, IssueRepository, SearchRequest};
///
/// let repo = InMemoryIssueRepository::fixture(30, chrono::Utc::now());
/// let page = repo
///     .search(&SearchRequest::new("is:open").page_size(5), &FilterContext::now())
///     .unwrap();
/// assert!(page.items.len() <= 5);
/// ```
pub trait IssueRepository {
    /// All issues, in the backend's natural order.
    fn list_issues(&self) -> Result<Vec<Issue>, RepositoryError>;

    /// Load an issue by ID.
    fn get_issue(&self, id: &str) -> Result<Issue, RepositoryError>;

    /// Create or replace an issue.
    fn save_issue(&self, issue: Issue) -> Result<(), RepositoryError>;

    /// Filter, sort and paginate.
    ///
    /// Sorting is stable, so issues that compare equal keep the backend's
    /// order. A page past the end is empty, not an error.
    fn search(
        &self,
        request: &SearchRequest,
        ctx: &FilterContext,
    ) -> Result<Page<Issue>, RepositoryError> {
        if request.page_size == 0 {
            return Err(RepositoryError::InvalidPageSize(0));
        }

        let issues = self.list_issues()?;
        let query = FilterQuery::parse(&request.query);
        let mut matched: Vec<Issue> = query
            .filter_issues(&issues, ctx)
            .into_iter()
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ordering = request.order_by.compare(a, b);
            match request.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matched.len();
        let offset = request.offset();
        let items: Vec<Issue> = matched
            .into_iter()
            .skip(offset)
            .take(request.page_size)
            .collect();

        tracing::debug!(
            query = %request.query,
            total,
            scanned = issues.len(),
            page = request.page,
            "search complete"
        );

        let next_offset = offset + items.len();
        let next_page_token = (!items.is_empty() && next_offset < total)
            .then(|| next_offset.to_string());

        Ok(Page {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            next_page_token,
        })
    }
}
