// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The immutable, case-insensitive header collection carried by every
//! message.
//!
//! Names compare case-insensitively but the map remembers the casing a name
//! was last written with, so serialization reproduces what the caller sent.
//! Mutators validate first and return a new map; the original is never
//! touched, not even on error.
//!
//! # References
//! * [RFC 9110 § 5](https://www.rfc-editor.org/rfc/rfc9110.html#section-5)

use crate::error::InvalidArgument;
use crate::syntax::{validate_field_value, validate_header_name};

#[derive(Clone, Debug, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    values: Vec<String>,
}

/// An ordered multimap of header fields. Insertion order is preserved;
/// lookups ignore ASCII case.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<HeaderEntry>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(name, values)` pairs, validating each one. Pairs
    /// that repeat a name append to the earlier entry.
    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Result<Self, InvalidArgument>
            where N: AsRef<str>, V: IntoHeaderValues {
        let mut map = Self::new();
        for (name, values) in pairs {
            map = map.add(name.as_ref(), values)?;
        }
        Ok(map)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| unicase::eq_ascii(entry.name.as_str(), name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// All values recorded under the name, in insertion order. Empty when the
    /// header is absent.
    pub fn values(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(index) => &self.entries[index].values,
            None => &[],
        }
    }

    /// The values joined with `", "`, or the empty string when absent.
    pub fn line(&self, name: &str) -> String {
        self.values(name).join(", ")
    }

    /// The header names, in insertion order, with their remembered casing.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|entry| (entry.name.as_str(), entry.values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a new map in which the header holds exactly the given values,
    /// replacing any it held before. The stored casing becomes the casing
    /// passed here.
    pub fn set(&self, name: &str, values: impl IntoHeaderValues) -> Result<Self, InvalidArgument> {
        let name = validate_header_name(name)?;
        let values = validate_values(values)?;

        let mut map = self.clone();
        match map.position(name) {
            Some(index) => {
                map.entries[index].name = name.to_string();
                map.entries[index].values = values;
            }
            None => map.entries.push(HeaderEntry { name: name.to_string(), values }),
        }

        Ok(map)
    }

    /// Returns a new map in which the given values are appended to whatever
    /// the header already held. As with [`HeaderMap::set`], the most recent
    /// casing wins.
    pub fn add(&self, name: &str, values: impl IntoHeaderValues) -> Result<Self, InvalidArgument> {
        let name = validate_header_name(name)?;
        let mut values = validate_values(values)?;

        let mut map = self.clone();
        match map.position(name) {
            Some(index) => {
                map.entries[index].name = name.to_string();
                map.entries[index].values.append(&mut values);
            }
            None => map.entries.push(HeaderEntry { name: name.to_string(), values }),
        }

        Ok(map)
    }

    /// Returns a new map without the header. Removing an absent header is not
    /// an error; the result is simply an identical map.
    pub fn remove(&self, name: &str) -> Self {
        let mut map = self.clone();
        if let Some(index) = map.position(name) {
            map.entries.remove(index);
        }
        map
    }
}

fn validate_values(values: impl IntoHeaderValues) -> Result<Vec<String>, InvalidArgument> {
    let values = values.into_header_values();

    if values.is_empty() {
        return Err(InvalidArgument::HeaderValueEmpty);
    }

    values
        .iter()
        .map(|value| validate_field_value(value).map(str::to_string))
        .collect()
}

/// The value-side flexibility of the mutators: a single string or any list of
/// strings is accepted.
pub trait IntoHeaderValues {
    fn into_header_values(self) -> Vec<String>;
}

impl IntoHeaderValues for &str {
    fn into_header_values(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoHeaderValues for String {
    fn into_header_values(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoHeaderValues for Vec<String> {
    fn into_header_values(self) -> Vec<String> {
        self
    }
}

impl IntoHeaderValues for Vec<&str> {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoHeaderValues for &[&str] {
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(|value| value.to_string()).collect()
    }
}

impl<const N: usize> IntoHeaderValues for [&str; N] {
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(|value| value.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_set_and_lookup_is_case_insensitive() {
        let map = HeaderMap::new().set("Content-Type", "text/html").unwrap();

        assert!(map.contains("content-type"));
        assert!(map.contains("CONTENT-TYPE"));
        assert_eq!(map.values("cOnTeNt-TyPe"), ["text/html"]);
        assert_eq!(map.line("content-type"), "text/html");
    }

    #[test]
    fn test_absent_header() {
        let map = HeaderMap::new();
        assert!(!map.contains("Host"));
        assert!(map.values("Host").is_empty());
        assert_eq!(map.line("Host"), "");
    }

    #[test]
    fn test_set_replaces_and_adopts_latest_casing() {
        let map = HeaderMap::new()
            .set("X-Tag", "one").unwrap()
            .set("x-tag", "two").unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.values("X-TAG"), ["two"]);
        assert_eq!(map.names().collect::<Vec<_>>(), ["x-tag"]);
    }

    #[test]
    fn test_add_appends_and_adopts_latest_casing() {
        let map = HeaderMap::new()
            .set("Accept", "text/html").unwrap()
            .add("ACCEPT", "application/json").unwrap();

        assert_eq!(map.values("accept"), ["text/html", "application/json"]);
        assert_eq!(map.line("accept"), "text/html, application/json");
        assert_eq!(map.names().collect::<Vec<_>>(), ["ACCEPT"]);
    }

    #[test]
    fn test_add_on_absent_header_behaves_like_set() {
        let map = HeaderMap::new().add("Host", "example.com").unwrap();
        assert_eq!(map.values("host"), ["example.com"]);
    }

    #[test]
    fn test_multiple_values_at_once() {
        let map = HeaderMap::new().set("Accept", ["text/html", "text/plain"]).unwrap();
        assert_eq!(map.values("accept"), ["text/html", "text/plain"]);
        assert_eq!(map.line("accept"), "text/html, text/plain");
    }

    #[test]
    fn test_remove_is_case_insensitive_and_total() {
        let map = HeaderMap::new()
            .set("Host", "example.com").unwrap()
            .set("Accept", "*/*").unwrap();

        let map = map.remove("HOST");
        assert!(!map.contains("host"));
        assert!(map.contains("accept"));

        // Removing what is not there is a no-op.
        assert_eq!(map.remove("Gone"), map);
    }

    #[test]
    fn test_mutators_leave_the_original_untouched() {
        let original = HeaderMap::new().set("Host", "a.example").unwrap();

        let _set = original.set("Host", "b.example").unwrap();
        let _added = original.add("Host", "c.example").unwrap();
        let _removed = original.remove("Host");

        assert_eq!(original.values("host"), ["a.example"]);
    }

    #[test]
    fn test_failed_mutation_leaves_the_original_valid() {
        let original = HeaderMap::new().set("Host", "a.example").unwrap();
        assert!(original.set("Bad Name", "value").is_err());
        assert!(original.set("Host", "evil\r\ninjection").is_err());
        assert_eq!(original.values("host"), ["a.example"]);
    }

    #[rstest]
    #[case("", "value", InvalidArgument::HeaderNameEmpty)]
    #[case("Na me", "value", InvalidArgument::HeaderNameContainsInvalidCharacter)]
    #[case("Name", "", InvalidArgument::HeaderValueEmpty)]
    #[case("Name", "bad\u{0}byte", InvalidArgument::HeaderValueContainsInvalidCharacter)]
    fn test_validation_errors(#[case] name: &str, #[case] value: &str, #[case] expected: InvalidArgument) {
        assert_eq!(HeaderMap::new().set(name, value).unwrap_err(), expected);
        assert_eq!(HeaderMap::new().add(name, value).unwrap_err(), expected);
    }

    #[test]
    fn test_empty_value_list_is_rejected() {
        let values: Vec<String> = Vec::new();
        assert_eq!(
            HeaderMap::new().set("Name", values).unwrap_err(),
            InvalidArgument::HeaderValueEmpty
        );
    }

    #[test]
    fn test_values_are_trimmed_of_optional_whitespace() {
        let map = HeaderMap::new().set("  Host ", "  example.com\t").unwrap();
        assert_eq!(map.values("host"), ["example.com"]);
        assert_eq!(map.names().collect::<Vec<_>>(), ["Host"]);
    }

    #[test]
    fn test_from_pairs_preserves_order_and_merges_repeats() {
        let map = HeaderMap::from_pairs([
            ("Host", "example.com"),
            ("Accept", "text/html"),
            ("accept", "application/json"),
        ]).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.names().collect::<Vec<_>>(), ["Host", "accept"]);
        assert_eq!(map.values("accept"), ["text/html", "application/json"]);
    }

    #[test]
    fn test_iter_yields_entries_in_insertion_order() {
        let map = HeaderMap::new()
            .set("Host", "example.com").unwrap()
            .set("Accept", "*/*").unwrap();

        let collected: Vec<_> = map.iter().map(|(name, values)| (name, values.to_vec())).collect();
        assert_eq!(collected, [
            ("Host", vec!["example.com".to_string()]),
            ("Accept", vec!["*/*".to_string()]),
        ]);
    }
}
