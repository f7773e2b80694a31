//! Parser for the filter query language
//!
//! Folds lexer tokens into a [`FilterMap`], and turns a map back into a query
//! string when a single filter chip is removed.

use super::lexer::{Lexer, Token};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Reserved key collecting every free-text term.
pub const TEXT_KEY: &str = "text";

/// Structured filters: key as typed -> values in input order.
///
/// Every key maps to a non-empty list; removing the last value of a key
/// removes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl FilterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Append a value under `key`, creating the list if needed.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Remove every occurrence of `value` under `key`.
    ///
    /// Returns true if anything was removed.
    pub fn remove_value(&mut self, key: &str, value: &str) -> bool {
        let Some(values) = self.entries.get_mut(key) else {
            return false;
        };

        let before = values.len();
        values.retain(|v| v != value);
        let removed = values.len() != before;

        if values.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    /// Copy of this map with `value` removed from `key`.
    pub fn without(&self, key: &str, value: &str) -> Self {
        let mut next = self.clone();
        next.remove_value(key, value);
        next
    }

    /// Append all of `other`'s values after this map's values.
    pub fn merge(mut self, other: &FilterMap) -> Self {
        for (key, values) in other.iter() {
            for value in values {
                self.push(key, value.clone());
            }
        }
        self
    }

    /// Rebuild a query string that parses back to an equivalent map.
    ///
    /// Free text comes first, then one `key:value` token per value. A value
    /// that would not lex back to itself is wrapped in double quotes.
    pub fn to_query_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(terms) = self.entries.get(TEXT_KEY) {
            parts.extend(terms.iter().map(|term| serialize_text(term)));
        }

        for (key, values) in &self.entries {
            if key == TEXT_KEY {
                continue;
            }
            parts.extend(values.iter().map(|value| serialize_pair(key, value)));
        }

        parts.join(" ")
    }
}

impl fmt::Display for FilterMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn serialize_text(term: &str) -> String {
    match Lexer::tokenize(term).as_slice() {
        [Token::Text(t)] if t == term => term.to_string(),
        // Terms typed as `text:...` may hold spaces or look like pairs.
        _ => serialize_pair(TEXT_KEY, term),
    }
}

fn serialize_pair(key: &str, value: &str) -> String {
    let plain = format!("{}:{}", key, value);
    match Lexer::tokenize(&plain).as_slice() {
        [Token::Pair { key: k, value: v }] if k == key && v == value => plain,
        _ => format!("{}:\"{}\"", key, value),
    }
}

/// Parser for building a [`FilterMap`] from tokens
pub struct Parser;

impl Parser {
    /// Parse a raw filter string. Never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use buganizer::filter::Parser;
    ///
    /// let filters = Parser::parse("is:open priority:P0 database");
    /// assert_eq!(filters.get("is").unwrap(), ["open"]);
    /// assert_eq!(filters.get("text").unwrap(), ["database"]);
    /// ```
    pub fn parse(raw: &str) -> FilterMap {
        Self::from_tokens(Lexer::tokenize(raw))
    }

    pub fn from_tokens(tokens: Vec<Token>) -> FilterMap {
        let mut filters = FilterMap::new();

        for token in tokens {
            match token {
                Token::Pair { key, value } => filters.push(key, value),
                Token::Text(term) => filters.push(TEXT_KEY, term),
            }
        }

        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(map: &FilterMap, key: &str) -> Vec<String> {
        map.get(key).map(<[String]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn test_parse_empty_is_empty_map() {
        assert!(Parser::parse("").is_empty());
        assert!(Parser::parse("   ").is_empty());
    }

    #[test]
    fn test_parse_groups_values_by_key() {
        let map = Parser::parse("priority:P0 is:open priority:P1");
        assert_eq!(values(&map, "priority"), vec!["P0", "P1"]);
        assert_eq!(values(&map, "is"), vec!["open"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_parse_free_text_collects_in_order() {
        let map = Parser::parse("database is:open timeout");
        assert_eq!(values(&map, TEXT_KEY), vec!["database", "timeout"]);
    }

    #[test]
    fn test_parse_overview_example() {
        let map = Parser::parse(r#"is:open priority:P0 "needs triage" database"#);
        assert_eq!(values(&map, "is"), vec!["open"]);
        assert_eq!(values(&map, "priority"), vec!["P0"]);
        assert_eq!(
            values(&map, TEXT_KEY),
            vec!["\"needs triage\"", "database"]
        );
    }

    #[test]
    fn test_parse_keeps_key_case() {
        let map = Parser::parse("Priority:P0 priority:P1");
        assert_eq!(values(&map, "Priority"), vec!["P0"]);
        assert_eq!(values(&map, "priority"), vec!["P1"]);
    }

    #[test]
    fn test_text_key_can_be_typed_explicitly() {
        let map = Parser::parse("crash text:login");
        assert_eq!(values(&map, TEXT_KEY), vec!["crash", "login"]);
    }

    #[test]
    fn test_remove_value_drops_empty_key() {
        let mut map = Parser::parse("priority:P0 is:open");
        assert!(map.remove_value("priority", "P0"));
        assert!(!map.contains_key("priority"));
        assert!(!map.remove_value("priority", "P0"));
    }

    #[test]
    fn test_remove_value_removes_every_duplicate() {
        let mut map = Parser::parse("label:bug label:ui label:bug");
        map.remove_value("label", "bug");
        assert_eq!(values(&map, "label"), vec!["ui"]);
    }

    #[test]
    fn test_without_leaves_original_untouched() {
        let map = Parser::parse("is:open");
        let next = map.without("is", "open");
        assert!(next.is_empty());
        assert!(map.contains_key("is"));
    }

    #[test]
    fn test_to_query_string_puts_text_first() {
        let map = Parser::parse("is:open crash priority:P0 login");
        assert_eq!(map.to_query_string(), "crash login is:open priority:P0");
    }

    #[test]
    fn test_to_query_string_requotes_spaced_values() {
        let map = Parser::parse(r#"label:"needs triage""#);
        assert_eq!(map.to_query_string(), r#"label:"needs triage""#);
        assert_eq!(Parser::parse(&map.to_query_string()), map);
    }

    #[test]
    fn test_to_query_string_keeps_empty_quoted_value() {
        let map = Parser::parse(r#"label:"""#);
        assert_eq!(values(&map, "label"), vec![""]);
        assert_eq!(Parser::parse(&map.to_query_string()), map);
    }

    #[test]
    fn test_merge_appends_values() {
        let a = Parser::parse("priority:P0");
        let b = Parser::parse("priority:P1 is:open");
        let merged = a.merge(&b);
        assert_eq!(values(&merged, "priority"), vec!["P0", "P1"]);
        assert_eq!(values(&merged, "is"), vec!["open"]);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let map = Parser::parse("is:open crash");
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"is": ["open"], "text": ["crash"]}));
    }
}
