//! Filter query language for issue lists
//!
//! Queries are whitespace-separated tokens:
//! - Predicates: `is:open`, `priority:P0`, `label:"needs triage"`
//! - Free text: anything else, matched as one phrase against title,
//!   description and reproduction steps
//!
//! Different keys combine with AND; repeated keys combine with OR, so
//! `priority:P0 priority:P1 is:open` means "open and (P0 or P1)".
//!
//! # Architecture
//!
//! 1. **Lexer**: splits the query and classifies `key:value` vs free text
//! 2. **Parser**: folds tokens into a [`FilterMap`]
//! 3. **Evaluator**: checks a [`FilterMap`] against issues
//!
//! The suggestion engine works on the raw input independently.
//!
//! # Examples
//!
//! ```
//! use buganizer::filter::{FilterContext, FilterQuery};
//!
//! let query = FilterQuery::parse("is:open priority:P0 database");
//! assert_eq!(query.filters().len(), 3);
//! let _ctx = FilterContext::now();
//! ```

mod evaluator;
mod lexer;
mod parser;
mod suggestions;

#[cfg(test)]
mod proptests;

pub use evaluator::{
    apply_filters, FilterContext, FilterEvaluator, FilterKey, DEFAULT_CURRENT_USER,
};
pub use lexer::{Lexer, Token};
pub use parser::{FilterMap, Parser, TEXT_KEY};
pub use suggestions::{
    apply_suggestion, known_values, suggest, FilterKeyDescriptor, FilterValueDescriptor,
    Suggestion, SuggestionKind, FILTER_KEYS,
};

use crate::domain::Issue;

/// Parse a raw filter string into structured filters.
pub fn parse(raw: &str) -> FilterMap {
    Parser::parse(raw)
}

/// Rebuild `raw` with one `key:value` chip removed.
///
/// # Examples
///
/// ```
/// use buganizer::filter::remove_filter;
///
/// assert_eq!(remove_filter("is:open priority:P0", "priority", "P0"), "is:open");
/// ```
pub fn remove_filter(raw: &str, key: &str, value: &str) -> String {
    Parser::parse(raw).without(key, value).to_query_string()
}

/// A parsed query ready for evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    filters: FilterMap,
}

impl FilterQuery {
    /// Parse a query string. Never fails.
    pub fn parse(query: &str) -> Self {
        FilterQuery {
            filters: Parser::parse(query),
        }
    }

    pub fn filters(&self) -> &FilterMap {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Check if an issue matches this query
    pub fn matches(&self, issue: &Issue, ctx: &FilterContext) -> bool {
        FilterEvaluator::matches(&self.filters, issue, ctx)
    }

    /// Filter a collection of issues
    ///
    /// Returns references to matching issues in their original order.
    pub fn filter_issues<'a>(&self, issues: &'a [Issue], ctx: &FilterContext) -> Vec<&'a Issue> {
        if self.filters.is_empty() {
            return issues.iter().collect();
        }
        issues.iter().filter(|i| self.matches(i, ctx)).collect()
    }
}

impl From<FilterMap> for FilterQuery {
    fn from(filters: FilterMap) -> Self {
        FilterQuery { filters }
    }
}
