//! Evaluator for filter maps against Issue objects
//!
//! Keys combine with AND, values of one key combine with OR. Every
//! comparison lower-cases both sides.

use super::parser::FilterMap;
use crate::domain::{Issue, Status};
use chrono::{
    DateTime, Days, FixedOffset, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc,
};
use regex::Regex;
use std::sync::OnceLock;

/// Placeholder id that `assignee:me` resolves to when no user is configured.
pub const DEFAULT_CURRENT_USER: &str = "user-1";

static CALENDAR_DATE_REGEX: OnceLock<Regex> = OnceLock::new();

fn calendar_date_regex() -> &'static Regex {
    CALENDAR_DATE_REGEX.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Calendar date regex should compile")
    })
}

/// Environment needed for evaluating filters
///
/// Day-relative filters (`due:today`, `created:week`, ...) are computed
/// against `today` in the given UTC offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterContext {
    pub current_user: String,
    pub today: NaiveDate,
    pub offset: FixedOffset,
}

impl FilterContext {
    /// Context for the local clock and timezone.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            current_user: DEFAULT_CURRENT_USER.to_string(),
            today: now.date_naive(),
            offset: *now.offset(),
        }
    }

    /// Context pinned to a calendar date, with UTC day boundaries.
    pub fn at(today: NaiveDate) -> Self {
        Self {
            current_user: DEFAULT_CURRENT_USER.to_string(),
            today,
            offset: Utc.fix(),
        }
    }

    pub fn with_current_user(mut self, user: impl Into<String>) -> Self {
        self.current_user = user.into();
        self
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    fn local(&self, ts: &DateTime<Utc>) -> NaiveDateTime {
        ts.with_timezone(&self.offset).naive_local()
    }

    fn day_after(&self, days: u64) -> Option<NaiveDate> {
        self.today.checked_add_days(Days::new(days))
    }

    fn day_before(&self, days: u64) -> Option<NaiveDate> {
        self.today.checked_sub_days(Days::new(days))
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::now()
    }
}

/// Filter keys understood by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Is,
    Status,
    Priority,
    Severity,
    Assignee,
    Due,
    Label,
    Text,
    Component,
    Id,
    Reporter,
    Created,
}

impl FilterKey {
    /// Resolve a key as typed (any case). `labels` is an alias of `label`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "is" => Some(FilterKey::Is),
            "status" => Some(FilterKey::Status),
            "priority" => Some(FilterKey::Priority),
            "severity" => Some(FilterKey::Severity),
            "assignee" => Some(FilterKey::Assignee),
            "due" => Some(FilterKey::Due),
            "label" | "labels" => Some(FilterKey::Label),
            "text" => Some(FilterKey::Text),
            "component" => Some(FilterKey::Component),
            "id" => Some(FilterKey::Id),
            "reporter" => Some(FilterKey::Reporter),
            "created" => Some(FilterKey::Created),
            _ => None,
        }
    }
}

/// Evaluator for filter maps
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Check if an issue passes every key of the filter map.
    pub fn matches(filters: &FilterMap, issue: &Issue, ctx: &FilterContext) -> bool {
        filters
            .iter()
            .all(|(key, values)| Self::eval_key(key, values, issue, ctx))
    }

    fn eval_key(key: &str, values: &[String], issue: &Issue, ctx: &FilterContext) -> bool {
        // Unknown keys exclude the issue.
        let Some(filter_key) = FilterKey::from_key(key) else {
            return false;
        };

        match filter_key {
            FilterKey::Is => values.iter().any(|v| Self::eval_is(v, issue)),

            FilterKey::Status => values.iter().any(|v| eq_ci(issue.status.as_str(), v)),

            FilterKey::Priority => values.iter().any(|v| eq_ci(issue.priority.as_str(), v)),

            FilterKey::Severity => values.iter().any(|v| eq_ci(issue.severity.as_str(), v)),

            FilterKey::Assignee => values.iter().any(|v| {
                let wanted = if v.eq_ignore_ascii_case("me") {
                    ctx.current_user.as_str()
                } else {
                    v.as_str()
                };
                issue
                    .assignee()
                    .is_some_and(|assignee| eq_ci(assignee, wanted))
            }),

            FilterKey::Due => match &issue.due_date {
                None => false,
                Some(due) => {
                    let due = ctx.local(due);
                    values.iter().any(|v| Self::eval_due(v, due, ctx))
                }
            },

            FilterKey::Label => {
                !issue.labels.is_empty()
                    && values
                        .iter()
                        .any(|v| issue.labels.iter().any(|label| contains_ci(label, v)))
            }

            // All terms form one phrase.
            FilterKey::Text => contains_ci(&issue.searchable_text(), &values.join(" ")),

            FilterKey::Component => values.iter().any(|v| eq_ci(&issue.component_id, v)),

            FilterKey::Id => values.iter().any(|v| contains_ci(&issue.id, v)),

            FilterKey::Reporter => values.iter().any(|v| eq_ci(&issue.reporter_id, v)),

            FilterKey::Created => {
                let created = ctx.local(&issue.created_at);
                values.iter().any(|v| Self::eval_created(v, created, ctx))
            }
        }
    }

    fn eval_is(value: &str, issue: &Issue) -> bool {
        match value.to_ascii_lowercase().as_str() {
            "open" => issue.status != Status::Closed,
            "closed" => issue.status == Status::Closed,
            "assigned" => issue.assignee().is_some(),
            "unassigned" => issue.assignee().is_none(),
            "fixed" => issue.status == Status::Fixed,
            "verified" => issue.status == Status::Verified,
            _ => eq_ci(issue.status.as_str(), value),
        }
    }

    fn eval_due(value: &str, due: NaiveDateTime, ctx: &FilterContext) -> bool {
        match value.to_ascii_lowercase().as_str() {
            "today" => in_days(due, Some(ctx.today), ctx.day_after(1)),
            "tomorrow" => in_days(due, ctx.day_after(1), ctx.day_after(2)),
            "week" => in_days(due, Some(ctx.today), ctx.day_after(7)),
            "overdue" => due < start_of(ctx.today),
            _ => on_calendar_date(value, due),
        }
    }

    fn eval_created(value: &str, created: NaiveDateTime, ctx: &FilterContext) -> bool {
        match value.to_ascii_lowercase().as_str() {
            "today" => in_days(created, Some(ctx.today), ctx.day_after(1)),
            "yesterday" => in_days(created, ctx.day_before(1), Some(ctx.today)),
            "week" => ctx
                .day_before(7)
                .is_some_and(|from| created >= start_of(from)),
            "month" => ctx
                .today
                .checked_sub_months(Months::new(1))
                .is_some_and(|from| created >= start_of(from)),
            _ => on_calendar_date(value, created),
        }
    }
}

/// Keep the issues that match, preserving order.
///
/// An empty filter map returns every issue.
pub fn apply_filters(issues: &[Issue], filters: &FilterMap, ctx: &FilterContext) -> Vec<Issue> {
    if filters.is_empty() {
        return issues.to_vec();
    }

    issues
        .iter()
        .filter(|issue| FilterEvaluator::matches(filters, issue, ctx))
        .cloned()
        .collect()
}

fn eq_ci(actual: &str, wanted: &str) -> bool {
    actual.eq_ignore_ascii_case(wanted)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
}

fn start_of(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// `ts` falls within `[start of from, start of until)`.
fn in_days(ts: NaiveDateTime, from: Option<NaiveDate>, until: Option<NaiveDate>) -> bool {
    match (from, until) {
        (Some(from), Some(until)) => ts >= start_of(from) && ts < start_of(until),
        _ => false,
    }
}

fn on_calendar_date(value: &str, ts: NaiveDateTime) -> bool {
    if !calendar_date_regex().is_match(value) {
        return false;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(day) => in_days(ts, Some(day), day.checked_add_days(Days::new(1))),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, Severity};
    use crate::filter::Parser;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn ctx() -> FilterContext {
        FilterContext::at(today())
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn create_issue(id: &str, status: Status, priority: Priority) -> Issue {
        Issue {
            id: id.to_string(),
            title: format!("Test {}", id),
            description: String::new(),
            reproduce_steps: String::new(),
            component_id: "comp-1".to_string(),
            reporter_id: "user-3".to_string(),
            assignee_id: None,
            priority,
            severity: Severity::S2,
            status,
            due_date: None,
            created_at: at(2024, 5, 1, 9),
            updated_at: at(2024, 5, 1, 9),
            labels: vec![],
        }
    }

    fn issue() -> Issue {
        create_issue("issue-1", Status::New, Priority::P2)
    }

    fn check(query: &str, issue: &Issue) -> bool {
        FilterEvaluator::matches(&Parser::parse(query), issue, &ctx())
    }

    #[test]
    fn test_is_open_and_closed() {
        let open = create_issue("1", Status::InProgress, Priority::P2);
        let closed = create_issue("2", Status::Closed, Priority::P2);
        let wont_fix = create_issue("3", Status::WontFix, Priority::P2);

        assert!(check("is:open", &open));
        assert!(!check("is:open", &closed));
        assert!(check("is:open", &wont_fix));
        assert!(check("is:closed", &closed));
        assert!(!check("is:closed", &wont_fix));
    }

    #[test]
    fn test_is_assignment_shortcuts() {
        let mut assigned = issue();
        assigned.assignee_id = Some("user-2".to_string());
        let unassigned = issue();

        assert!(check("is:assigned", &assigned));
        assert!(!check("is:assigned", &unassigned));
        assert!(check("is:unassigned", &unassigned));
        assert!(!check("is:unassigned", &assigned));
    }

    #[test]
    fn test_empty_assignee_id_counts_as_unassigned() {
        let mut blank = issue();
        blank.assignee_id = Some(String::new());

        assert!(check("is:unassigned", &blank));
        assert!(!check("is:assigned", &blank));

        let empty_user = ctx().with_current_user("");
        assert!(!FilterEvaluator::matches(
            &Parser::parse("assignee:me"),
            &blank,
            &empty_user
        ));
    }

    #[test]
    fn test_case_folding_is_ascii_only() {
        let mut issue = issue();
        issue.labels = vec!["k".to_string()];
        issue.component_id = "comp-k".to_string();

        assert!(check("label:K", &issue));
        // U+212A KELVIN SIGN lowercases to 'k' under Unicode rules.
        assert!(!check("label:\u{212A}", &issue));
        assert!(!check("component:comp-\u{212A}", &issue));
        assert!(FilterKey::from_key("LABELS").is_some());
    }

    #[test]
    fn test_is_falls_back_to_status() {
        let fixed = create_issue("1", Status::Fixed, Priority::P2);
        let verified = create_issue("2", Status::Verified, Priority::P2);
        let dup = create_issue("3", Status::Duplicate, Priority::P2);

        assert!(check("is:fixed", &fixed));
        assert!(check("is:verified", &verified));
        assert!(check("is:duplicate", &dup));
        assert!(!check("is:duplicate", &fixed));
    }

    #[test]
    fn test_status_priority_severity_are_case_insensitive() {
        let issue = create_issue("1", Status::InProgress, Priority::P0);
        assert!(check("status:in_progress", &issue));
        assert!(check("priority:p0", &issue));
        assert!(check("severity:s2", &issue));
        assert!(!check("priority:P1", &issue));
    }

    #[test]
    fn test_values_of_one_key_are_ored() {
        let issue = create_issue("1", Status::New, Priority::P1);
        assert!(check("priority:P0 priority:P1", &issue));
        assert!(!check("priority:P0 priority:P3", &issue));
    }

    #[test]
    fn test_keys_are_anded() {
        let issue = create_issue("1", Status::New, Priority::P1);
        assert!(check("priority:P1 is:open", &issue));
        assert!(!check("priority:P1 is:closed", &issue));
    }

    #[test]
    fn test_key_case_is_ignored() {
        let issue = create_issue("1", Status::New, Priority::P1);
        assert!(check("PRIORITY:p1", &issue));
    }

    #[test]
    fn test_assignee_me_uses_current_user() {
        let mut mine = issue();
        mine.assignee_id = Some("user-1".to_string());
        let mut theirs = issue();
        theirs.assignee_id = Some("user-2".to_string());

        assert!(check("assignee:me", &mine));
        assert!(!check("assignee:me", &theirs));
        assert!(check("assignee:USER-2", &theirs));
        assert!(!check("assignee:user-2", &issue()));

        let other_ctx = ctx().with_current_user("user-2");
        assert!(FilterEvaluator::matches(
            &Parser::parse("assignee:me"),
            &theirs,
            &other_ctx
        ));
    }

    #[test]
    fn test_due_without_date_never_matches() {
        let issue = issue();
        assert!(!check("due:overdue", &issue));
        assert!(!check("due:today", &issue));
    }

    #[test]
    fn test_due_relative_days() {
        let mut due_today = issue();
        due_today.due_date = Some(at(2024, 5, 15, 23));
        let mut due_tomorrow = issue();
        due_tomorrow.due_date = Some(at(2024, 5, 16, 0));
        let mut due_in_six = issue();
        due_in_six.due_date = Some(at(2024, 5, 21, 12));
        let mut due_in_seven = issue();
        due_in_seven.due_date = Some(at(2024, 5, 22, 0));
        let mut overdue = issue();
        overdue.due_date = Some(at(2024, 5, 14, 23));

        assert!(check("due:today", &due_today));
        assert!(!check("due:today", &due_tomorrow));
        assert!(check("due:tomorrow", &due_tomorrow));
        assert!(check("due:week", &due_today));
        assert!(check("due:week", &due_in_six));
        assert!(!check("due:week", &due_in_seven));
        assert!(check("due:overdue", &overdue));
        assert!(!check("due:overdue", &due_today));
        assert!(!check("due:week", &overdue));
    }

    #[test]
    fn test_due_specific_date() {
        let mut issue = issue();
        issue.due_date = Some(at(2024, 6, 1, 18));
        assert!(check("due:2024-06-01", &issue));
        assert!(!check("due:2024-06-02", &issue));
        assert!(!check("due:2024-13-40", &issue));
        assert!(!check("due:June", &issue));
    }

    #[test]
    fn test_day_boundaries_follow_offset() {
        let mut issue = issue();
        // 23:30 UTC on the 14th is 01:30 on the 15th at UTC+2.
        issue.due_date = Some(Utc.with_ymd_and_hms(2024, 5, 14, 23, 30, 0).unwrap());
        let filters = Parser::parse("due:today");

        assert!(!FilterEvaluator::matches(&filters, &issue, &ctx()));
        let plus_two = ctx().with_offset(FixedOffset::east_opt(2 * 3600).unwrap());
        assert!(FilterEvaluator::matches(&filters, &issue, &plus_two));
    }

    #[test]
    fn test_label_substring_match() {
        let mut labelled = issue();
        labelled.labels = vec!["Frontend".to_string(), "needs-triage".to_string()];

        assert!(check("label:front", &labelled));
        assert!(check("labels:TRIAGE", &labelled));
        assert!(!check("label:backend", &labelled));
        assert!(!check("label:bug", &issue()));
    }

    #[test]
    fn test_text_is_one_phrase() {
        let mut issue = issue();
        issue.title = "Database timeout".to_string();
        issue.description = "Connection pool exhausted".to_string();
        issue.reproduce_steps = "Run the nightly job".to_string();

        assert!(check("database", &issue));
        assert!(check("database timeout", &issue));
        assert!(check("timeout connection", &issue));
        assert!(check("NIGHTLY job", &issue));
        // Both words occur, but not as one phrase.
        assert!(!check("timeout database", &issue));
    }

    #[test]
    fn test_quoted_text_keeps_quotes_and_fails_to_match() {
        let mut issue = issue();
        issue.title = "needs triage".to_string();
        assert!(check("needs triage", &issue));
        assert!(!check("\"needs triage\"", &issue));
    }

    #[test]
    fn test_component_is_exact() {
        let issue = issue();
        assert!(check("component:COMP-1", &issue));
        assert!(!check("component:comp", &issue));
    }

    #[test]
    fn test_id_is_substring() {
        let issue = create_issue("issue-42", Status::New, Priority::P2);
        assert!(check("id:42", &issue));
        assert!(check("id:ISSUE", &issue));
        assert!(!check("id:43", &issue));
    }

    #[test]
    fn test_reporter_is_exact() {
        let issue = issue();
        assert!(check("reporter:user-3", &issue));
        assert!(!check("reporter:user", &issue));
    }

    #[test]
    fn test_created_relative_days() {
        let mut today = issue();
        today.created_at = at(2024, 5, 15, 8);
        let mut yesterday = issue();
        yesterday.created_at = at(2024, 5, 14, 8);
        let mut ten_days = issue();
        ten_days.created_at = at(2024, 5, 5, 8);
        let mut old = issue();
        old.created_at = at(2024, 3, 1, 8);

        assert!(check("created:today", &today));
        assert!(!check("created:today", &yesterday));
        assert!(check("created:yesterday", &yesterday));
        assert!(check("created:week", &yesterday));
        assert!(!check("created:week", &ten_days));
        assert!(check("created:month", &ten_days));
        assert!(!check("created:month", &old));
        assert!(check("created:2024-03-01", &old));
    }

    #[test]
    fn test_unknown_key_excludes_issue() {
        assert!(!check("milestone:v1", &issue()));
        assert!(!check("is:open milestone:v1", &issue()));
    }

    #[test]
    fn test_apply_filters_empty_is_identity() {
        let issues = vec![
            create_issue("1", Status::Closed, Priority::P0),
            create_issue("2", Status::New, Priority::P4),
        ];
        assert_eq!(apply_filters(&issues, &FilterMap::new(), &ctx()), issues);
    }

    #[test]
    fn test_apply_filters_preserves_order() {
        let issues = vec![
            create_issue("1", Status::New, Priority::P2),
            create_issue("2", Status::Closed, Priority::P2),
            create_issue("3", Status::Closed, Priority::P2),
            create_issue("4", Status::Fixed, Priority::P2),
        ];
        let matched = apply_filters(&issues, &Parser::parse("is:closed"), &ctx());
        let ids: Vec<&str> = matched.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }
}
