//! Query-string and form-body parameter mappings.
//!
//! Parameters are kept in an ordered map. Parsing is permissive: segments that
//! carry no `=` become empty-valued entries, undecodable percent-escapes are
//! kept verbatim, and nothing here ever returns an error.
//!
//! Array-style keys collapse: `arr[]=a&arr[]=b` produces one multi-valued
//! entry under `arr`. Repeating a plain key also appends to it, so lookups by
//! name always see every value that arrived.

use indexmap::IndexMap;
use std::borrow::Cow;

/// A parameter holds either one value or an explicitly collected sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// The first (or only) value.
    pub fn as_str(&self) -> &str {
        match self {
            ParamValue::Single(value) => value,
            ParamValue::Many(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            ParamValue::Single(value) => std::slice::from_ref(value),
            ParamValue::Many(values) => values,
        }
    }

    fn push(&mut self, value: String) {
        match self {
            ParamValue::Single(existing) => {
                *self = ParamValue::Many(vec![std::mem::take(existing), value]);
            }
            ParamValue::Many(values) => values.push(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: IndexMap<String, ParamValue>,
}

fn decode(raw: &str) -> String {
    // Form encoding uses `+` for spaces; undecodable escapes pass through.
    let raw = raw.replace('+', " ");
    match urlencoding::decode(&raw) {
        Ok(Cow::Borrowed(_)) => raw,
        Ok(Cow::Owned(decoded)) => decoded,
        Err(_) => raw,
    }
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string (or urlencoded form body) into a mapping.
    pub fn parse(query: &str) -> Self {
        let mut params = Params::new();
        for segment in query.split('&') {
            if segment.is_empty() {
                continue;
            }
            let (raw_key, raw_value) = match segment.split_once('=') {
                Some((k, v)) => (k, v),
                None => (segment, ""),
            };
            let key = decode(raw_key);
            if key.is_empty() {
                continue;
            }
            // `arr[]` keys collapse into one sequence under `arr`.
            let key = key.strip_suffix("[]").unwrap_or(&key).to_string();
            params.append(key, decode(raw_value));
        }
        params
    }

    fn append(&mut self, key: String, value: String) {
        match self.entries.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                self.entries.insert(key, ParamValue::Single(value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.get(name)
    }

    /// The first value under `name`, if present.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(ParamValue::as_str)
    }

    /// Sets `name` to a single value, replacing anything already there.
    pub fn set(&mut self, name: &str, value: &str) {
        self.entries
            .insert(name.to_string(), ParamValue::Single(value.to_string()));
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.entries.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_pairs() {
        let params = Params::parse("blah=something&someget=test");
        assert_eq!(params.get_str("blah"), Some("something"));
        assert_eq!(params.get_str("someget"), Some("test"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn array_keys_collapse() {
        let params = Params::parse("arr[]=a&arr[]=b");
        assert_eq!(
            params.get("arr"),
            Some(&ParamValue::Many(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn repeated_plain_keys_append() {
        let params = Params::parse("x=1&x=2");
        assert_eq!(params.get("x").unwrap().as_slice(), ["1", "2"]);
        assert_eq!(params.get_str("x"), Some("1"));
    }

    #[test]
    fn decodes_percent_escapes_and_plus() {
        let params = Params::parse("q=hello+world&name=caf%C3%A9");
        assert_eq!(params.get_str("q"), Some("hello world"));
        assert_eq!(params.get_str("name"), Some("café"));
    }

    #[test]
    fn malformed_segments_are_tolerated() {
        let params = Params::parse("&flag&=orphan&ok=1");
        assert_eq!(params.get_str("flag"), Some(""));
        assert!(!params.contains(""));
        assert_eq!(params.get_str("ok"), Some("1"));
    }
}
