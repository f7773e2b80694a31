//! Lexical analysis for the filter query language
//!
//! Splits a raw query string into tokens and classifies each one as either a
//! `key:value` pair or a free-text term.

use regex::Regex;
use std::sync::OnceLock;

/// Whitespace-separated words, keeping double-quoted groups in one token.
static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

/// A letters-only key, a colon, and at least one character of value.
static PAIR_REGEX: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| {
        Regex::new(r#"(?:[^\s"]+|"[^"]*")+"#).expect("Token regex should compile")
    })
}

fn pair_regex() -> &'static Regex {
    PAIR_REGEX
        .get_or_init(|| Regex::new(r"^([a-zA-Z]+):(.+)$").expect("Pair regex should compile"))
}

/// Token types in the filter language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Filter predicate: key:value (e.g., "priority:P0", `label:"needs triage"`)
    Pair { key: String, value: String },
    /// Free-text term, kept exactly as typed (quotes included)
    Text(String),
}

/// Lexer for tokenizing filter strings
pub struct Lexer;

impl Lexer {
    /// Tokenize the entire input string.
    ///
    /// Never fails: anything that is not a well-formed `key:value` pair is
    /// returned as free text. A lone unmatched `"` is skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use buganizer::filter::{Lexer, Token};
    ///
    /// let tokens = Lexer::tokenize("is:open crash");
    /// assert_eq!(tokens[0], Token::Pair { key: "is".into(), value: "open".into() });
    /// assert_eq!(tokens[1], Token::Text("crash".into()));
    /// ```
    pub fn tokenize(input: &str) -> Vec<Token> {
        if input.trim().is_empty() {
            return Vec::new();
        }

        token_regex()
            .find_iter(input)
            .map(|m| Self::classify(m.as_str()))
            .collect()
    }

    fn classify(word: &str) -> Token {
        match pair_regex().captures(word) {
            Some(caps) => Token::Pair {
                key: caps[1].to_string(),
                value: strip_quotes(&caps[2]).to_string(),
            },
            None => Token::Text(word.to_string()),
        }
    }
}

/// Remove one layer of surrounding double quotes, if the value is exactly `"..."`.
fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
