//! Completion suggestions for a partially typed filter
//!
//! Stateless: every keystroke calls [`suggest`] again and the previous
//! result is simply dropped by the caller.

use serde::Serialize;

/// Static registry entry describing a filter key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterKeyDescriptor {
    pub key: &'static str,
    pub description: &'static str,
}

/// Static registry entry describing a well-known value of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterValueDescriptor {
    pub value: &'static str,
    pub description: &'static str,
}

const fn key(key: &'static str, description: &'static str) -> FilterKeyDescriptor {
    FilterKeyDescriptor { key, description }
}

const fn value(value: &'static str, description: &'static str) -> FilterValueDescriptor {
    FilterValueDescriptor { value, description }
}

/// Keys offered by the suggestion engine, in display order.
pub const FILTER_KEYS: &[FilterKeyDescriptor] = &[
    key("is", "Status shortcuts (open, closed, assigned, etc.)"),
    key("status", "Issue status (NEW, IN_PROGRESS, FIXED, etc.)"),
    key("priority", "Issue priority (P0, P1, P2, etc.)"),
    key("severity", "Issue severity (S0, S1, S2, etc.)"),
    key("assignee", "Assigned user (me, user-1, etc.)"),
    key("due", "Due date (today, tomorrow, week, overdue)"),
    key("label", "Issue labels"),
    key("component", "Component ID"),
    key("id", "Issue ID"),
    key("reporter", "Reporting user (user-1, etc.)"),
    key("created", "Creation date (today, yesterday, week, month)"),
];

const IS_VALUES: &[FilterValueDescriptor] = &[
    value("open", "Not closed issues"),
    value("closed", "Closed issues"),
    value("assigned", "Issues with assignee"),
    value("unassigned", "Issues without assignee"),
    value("fixed", "Fixed issues"),
    value("verified", "Verified issues"),
];

const STATUS_VALUES: &[FilterValueDescriptor] = &[
    value("NEW", "Newly created"),
    value("ASSIGNED", "Assigned but not started"),
    value("IN_PROGRESS", "Currently being worked on"),
    value("FIXED", "Fix implemented"),
    value("VERIFIED", "Fix verified"),
    value("CLOSED", "Issue closed"),
    value("DUPLICATE", "Marked as duplicate"),
    value("WONT_FIX", "Won't be fixed"),
];

const PRIORITY_VALUES: &[FilterValueDescriptor] = &[
    value("P0", "Critical"),
    value("P1", "High"),
    value("P2", "Medium"),
    value("P3", "Low"),
    value("P4", "Trivial"),
];

const SEVERITY_VALUES: &[FilterValueDescriptor] = &[
    value("S0", "Critical"),
    value("S1", "Major"),
    value("S2", "Moderate"),
    value("S3", "Minor"),
];

const ASSIGNEE_VALUES: &[FilterValueDescriptor] = &[
    value("me", "Assigned to me"),
    value("user-1", "Admin User"),
    value("user-2", "Developer User"),
    value("user-3", "Manager User"),
];

const DUE_VALUES: &[FilterValueDescriptor] = &[
    value("today", "Due today"),
    value("tomorrow", "Due tomorrow"),
    value("week", "Due within a week"),
    value("overdue", "Overdue issues"),
];

const LABEL_VALUES: &[FilterValueDescriptor] = &[
    value("bug", "Bug issues"),
    value("feature", "Feature requests"),
    value("documentation", "Documentation issues"),
    value("enhancement", "Enhancement issues"),
    value("critical", "Critical issues"),
];

const COMPONENT_VALUES: &[FilterValueDescriptor] = &[
    value("comp-1", "Component 1"),
    value("comp-2", "Component 2"),
    value("comp-3", "Component 3"),
    value("comp-4", "Component 4"),
    value("comp-5", "Component 5"),
];

const REPORTER_VALUES: &[FilterValueDescriptor] = &[
    value("user-1", "Admin User"),
    value("user-2", "Developer User"),
    value("user-3", "Manager User"),
];

const CREATED_VALUES: &[FilterValueDescriptor] = &[
    value("today", "Created today"),
    value("yesterday", "Created yesterday"),
    value("week", "Created within the last week"),
    value("month", "Created within the last month"),
];

/// Well-known values for `key`, matched exactly as typed.
///
/// Returns `None` for keys without a value list (including `id`).
pub fn known_values(key: &str) -> Option<&'static [FilterValueDescriptor]> {
    match key {
        "is" => Some(IS_VALUES),
        "status" => Some(STATUS_VALUES),
        "priority" => Some(PRIORITY_VALUES),
        "severity" => Some(SEVERITY_VALUES),
        "assignee" => Some(ASSIGNEE_VALUES),
        "due" => Some(DUE_VALUES),
        "label" => Some(LABEL_VALUES),
        "component" => Some(COMPONENT_VALUES),
        "reporter" => Some(REPORTER_VALUES),
        "created" => Some(CREATED_VALUES),
        _ => None,
    }
}

/// Whether a suggestion completes a key or a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Key,
    Value,
}

/// A single completion candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub text: String,
    pub description: String,
}

impl Suggestion {
    fn for_key(descriptor: &FilterKeyDescriptor) -> Self {
        Self {
            kind: SuggestionKind::Key,
            text: descriptor.key.to_string(),
            description: descriptor.description.to_string(),
        }
    }

    fn for_value(descriptor: &FilterValueDescriptor) -> Self {
        Self {
            kind: SuggestionKind::Value,
            text: descriptor.value.to_string(),
            description: descriptor.description.to_string(),
        }
    }
}

/// Suggest completions for the text currently in the input box.
///
/// # Examples
///
/// ```
/// use buganizer::filter::{suggest, SuggestionKind};
///
/// let suggestions = suggest("prio");
/// assert_eq!(suggestions.len(), 1);
/// assert_eq!(suggestions[0].text, "priority");
/// assert_eq!(suggestions[0].kind, SuggestionKind::Key);
/// ```
pub fn suggest(input: &str) -> Vec<Suggestion> {
    if input.trim().is_empty() {
        return FILTER_KEYS.iter().map(Suggestion::for_key).collect();
    }

    let Some(colon) = input.find(':') else {
        let needle = input.to_ascii_lowercase();
        return FILTER_KEYS
            .iter()
            .filter(|k| k.key.to_ascii_lowercase().contains(&needle))
            .map(Suggestion::for_key)
            .collect();
    };

    let key = input[..colon].trim();
    let prefix = input[colon + 1..].trim().to_ascii_lowercase();

    let Some(values) = known_values(key) else {
        return Vec::new();
    };

    values
        .iter()
        .filter(|v| v.value.to_ascii_lowercase().contains(&prefix))
        .map(Suggestion::for_value)
        .collect()
}

/// Input text after accepting `suggestion`.
///
/// A key becomes `key:` ready for a value; a value replaces whatever follows
/// the first colon.
pub fn apply_suggestion(input: &str, suggestion: &Suggestion) -> String {
    match suggestion.kind {
        SuggestionKind::Key => format!("{}:", suggestion.text),
        SuggestionKind::Value => match input.find(':') {
            Some(colon) => format!("{}{}", &input[..=colon], suggestion.text),
            None => input.to_string(),
        },
    }
}
