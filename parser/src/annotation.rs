//! Parses `key=value` pairs from an alarm annotation.
//!
//! Keys are dotted names. Values are either a single word (letters, digits,
//! `.`, `:` and `-`) or a double quoted string. Quotes are removed from
//! quoted values. Text that is not a pair is ignored.
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PAIR: Regex =
        Regex::new(r#"([A-Za-z0-9.]+)[ ]*=[ ]*("[^"]*"|[A-Za-z0-9.:\-]+)"#).unwrap();
}

/// A key and value from an annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

/// Returns the pairs in the annotation in the order they are written.
pub fn parse_pairs(annotation: &str) -> Vec<Pair> {
    PAIR.captures_iter(annotation)
        .map(|captures| {
            let value = &captures[2];
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            Pair {
                key: captures[1].to_string(),
                value: value.to_string(),
            }
        })
        .collect()
}
