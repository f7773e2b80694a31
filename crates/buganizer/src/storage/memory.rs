//! In-memory issue repository.
//!
//! Backs the CLI and the tests. Issues keep insertion order so that stable
//! sorting has a well-defined tie-break.

use super::{IssueRepository, RepositoryError};
use crate::domain::{Issue, Priority, Severity, Status};
use chrono::{DateTime, Duration, Utc};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// In-memory repository backed by a `Vec`.
///
/// Uses `Rc<RefCell<>>` for shared interior mutability: clones share the same
/// data.
///
/// # Examples
///
/// ```
/// use buganizer::domain::Issue;
/// use buganizer::storage::{InMemoryIssueRepository, IssueRepository};
///
/// let repo = InMemoryIssueRepository::new();
/// let issue = Issue::new("Login fails", "Spinner never stops");
/// repo.save_issue(issue.clone()).unwrap();
///
/// assert_eq!(repo.get_issue(&issue.id).unwrap().title, "Login fails");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryIssueRepository {
    issues: Rc<RefCell<Vec<Issue>>>,
}

impl InMemoryIssueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_issues(issues: Vec<Issue>) -> Self {
        Self {
            issues: Rc::new(RefCell::new(issues)),
        }
    }

    /// Load issues from a file holding a JSON array of camelCase issues.
    pub fn load_json(path: &Path) -> Result<Self, RepositoryError> {
        let contents = std::fs::read_to_string(path)?;
        let issues: Vec<Issue> = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path.display(), count = issues.len(), "loaded issues");
        Ok(Self::from_issues(issues))
    }

    /// Deterministic demo data set.
    ///
    /// Issue `n` (1-based) is created `n - 1` days before `now`; priority,
    /// severity, status, assignee and due date follow fixed modular patterns
    /// of the zero-based index so every filter has something to match.
    pub fn fixture(count: usize, now: DateTime<Utc>) -> Self {
        let issues = (0..count).map(|i| fixture_issue(i, now)).collect();
        Self::from_issues(issues)
    }

    pub fn len(&self) -> usize {
        self.issues.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.borrow().is_empty()
    }
}

fn fixture_issue(i: usize, now: DateTime<Utc>) -> Issue {
    let n = i + 1;

    let priority = match i {
        _ if i % 5 == 0 => Priority::P0,
        _ if i % 4 == 0 => Priority::P1,
        _ if i % 3 == 0 => Priority::P2,
        _ if i % 2 == 0 => Priority::P3,
        _ => Priority::P4,
    };
    let severity = match i {
        _ if i % 4 == 0 => Severity::S0,
        _ if i % 3 == 0 => Severity::S1,
        _ if i % 2 == 0 => Severity::S2,
        _ => Severity::S3,
    };
    let status = match i {
        _ if i % 7 == 0 => Status::Closed,
        _ if i % 5 == 0 => Status::Fixed,
        _ if i % 3 == 0 => Status::InProgress,
        _ => Status::New,
    };

    let created_at = now - Duration::days(i as i64);
    Issue {
        id: format!("issue-{}", n),
        title: format!("Sample Issue {}", n),
        description: "This is a sample issue description".to_string(),
        reproduce_steps: "Steps to reproduce the issue".to_string(),
        component_id: format!("comp-{}", i % 5 + 1),
        reporter_id: "user-1".to_string(),
        assignee_id: (i % 3 != 0).then(|| "user-2".to_string()),
        priority,
        severity,
        status,
        due_date: (i % 4 == 0).then(|| now + Duration::days(1)),
        created_at,
        updated_at: now - Duration::hours(12 * i as i64),
        labels: vec![format!("label-{}", i % 5 + 1), format!("label-{}", i % 3 + 6)],
    }
}

impl IssueRepository for InMemoryIssueRepository {
    fn list_issues(&self) -> Result<Vec<Issue>, RepositoryError> {
        Ok(self.issues.borrow().clone())
    }

    fn get_issue(&self, id: &str) -> Result<Issue, RepositoryError> {
        self.issues
            .borrow()
            .iter()
            .find(|issue| issue.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn save_issue(&self, issue: Issue) -> Result<(), RepositoryError> {
        let mut issues = self.issues.borrow_mut();
        match issues.iter_mut().find(|existing| existing.id == issue.id) {
            Some(existing) => *existing = issue,
            None => issues.push(issue),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterContext;
    use crate::storage::{SearchRequest, SortField, SortOrder};
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    fn ctx() -> FilterContext {
        FilterContext::at(now().date_naive())
    }

    fn ids(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_save_and_get() {
        let repo = InMemoryIssueRepository::new();
        let issue = Issue::new("Test", "Description");
        repo.save_issue(issue.clone()).unwrap();

        assert_eq!(repo.get_issue(&issue.id).unwrap(), issue);
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_get_missing_issue() {
        let repo = InMemoryIssueRepository::new();
        let err = repo.get_issue("nope").unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(id) if id == "nope"));
    }

    #[test]
    fn test_save_replaces_in_place() {
        let repo = InMemoryIssueRepository::fixture(3, now());
        let mut issue = repo.get_issue("issue-2").unwrap();
        issue.title = "Renamed".to_string();
        repo.save_issue(issue).unwrap();

        let all = repo.list_issues().unwrap();
        assert_eq!(ids(&all), vec!["issue-1", "issue-2", "issue-3"]);
        assert_eq!(all[1].title, "Renamed");
    }

    #[test]
    fn test_clones_share_data() {
        let repo = InMemoryIssueRepository::new();
        let clone = repo.clone();
        clone.save_issue(Issue::new("Shared", "")).unwrap();
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_fixture_patterns() {
        let repo = InMemoryIssueRepository::fixture(8, now());
        let issues = repo.list_issues().unwrap();

        assert_eq!(issues[0].id, "issue-1");
        assert_eq!(issues[0].priority, Priority::P0);
        assert_eq!(issues[0].status, Status::Closed);
        assert_eq!(issues[0].assignee_id, None);
        assert!(issues[0].due_date.is_some());

        assert_eq!(issues[1].priority, Priority::P4);
        assert_eq!(issues[1].assignee_id.as_deref(), Some("user-2"));
        assert_eq!(issues[3].status, Status::InProgress);
        assert_eq!(issues[5].status, Status::Fixed);
        assert_eq!(issues[7].status, Status::Closed);
        assert_eq!(issues[2].created_at, now() - Duration::days(2));
    }

    #[test]
    fn test_search_paginates() {
        let repo = InMemoryIssueRepository::fixture(25, now());
        let request = SearchRequest::new("").page_size(10);

        let first = repo.search(&request, &ctx()).unwrap();
        assert_eq!(first.total, 25);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.next_page_token.as_deref(), Some("10"));

        let last = repo.search(&request.clone().page(2), &ctx()).unwrap();
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.next_page_token, None);

        let past_end = repo.search(&request.page(9), &ctx()).unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 25);
    }

    #[test]
    fn test_search_defaults_to_newest_first() {
        let repo = InMemoryIssueRepository::fixture(5, now());
        let page = repo.search(&SearchRequest::new(""), &ctx()).unwrap();
        assert_eq!(ids(&page.items)[0], "issue-1");
        assert_eq!(ids(&page.items)[4], "issue-5");
    }

    #[test]
    fn test_search_sort_is_stable() {
        let repo = InMemoryIssueRepository::fixture(12, now());
        let request = SearchRequest::new("priority:P0").order_by(SortField::Priority, SortOrder::Asc);
        let page = repo.search(&request, &ctx()).unwrap();

        // Every P0 ties on priority, so insertion order is preserved.
        assert_eq!(ids(&page.items), vec!["issue-1", "issue-6", "issue-11"]);
    }

    #[test]
    fn test_search_filters_before_paginating() {
        let repo = InMemoryIssueRepository::fixture(30, now());
        let request = SearchRequest::new("is:closed").page_size(2);
        let page = repo.search(&request, &ctx()).unwrap();

        // Closed issues sit at indices 0, 7, 14, 21 and 28.
        assert_eq!(page.total, 5);
        assert_eq!(page.next_page_token.as_deref(), Some("2"));
        assert!(page.items.iter().all(|i| i.status == Status::Closed));
    }

    #[test]
    fn test_search_rejects_zero_page_size() {
        let repo = InMemoryIssueRepository::fixture(3, now());
        let err = repo
            .search(&SearchRequest::new("").page_size(0), &ctx())
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidPageSize(0)));
    }

    #[test]
    fn test_load_json_file() {
        let issues = InMemoryIssueRepository::fixture(2, now()).list_issues().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&issues).unwrap()).unwrap();

        let repo = InMemoryIssueRepository::load_json(file.path()).unwrap();
        assert_eq!(repo.list_issues().unwrap(), issues);
    }

    #[test]
    fn test_load_json_rejects_garbage() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = InMemoryIssueRepository::load_json(file.path()).unwrap_err();
        assert!(matches!(err, RepositoryError::Json(_)));
    }
}
