//! HTTP headers abstraction for [`HttpRequest`](crate::http::request::HttpRequest) and
//! [`HttpResponse`](crate::http::response::HttpResponse)
//!
//! This module provides a low-level abstraction for handling HTTP headers in
//! requests and responses. It supports setting, retrieving, and serializing headers.
//!
//! Headers are stored in an ordered map to preserve insertion order. Lookup is
//! case-insensitive: names are normalized to their canonical capitalized form
//! on insertion (`content-type` and `CONTENT_TYPE` both map to `Content-Type`).
//!
//! A name holds a single value unless more values are explicitly appended with
//! [`HttpHeaders::add`]; [`HttpHeaders::set`] always replaces. This mirrors the
//! fact that most headers occur once, while a few (`Set-Cookie`, `Link`) may
//! legitimately repeat.
//!
//! This abstraction does not enforce any HTTP semantics or constraints.
//! Higher-level types such as [`HttpRequest`](crate::http::request::HttpRequest)
//! and [`HttpResponse`](crate::http::response::HttpResponse) are responsible for
//! applying their own rules by wrapping or constraining access to this structure.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct HttpHeaders {
    headers: IndexMap<String, Vec<String>>,
}

/// Normalizes a header name to its canonical capitalized-hyphenated form.
///
/// Both `-` and `_` act as segment separators; `_` is rewritten to `-` so that
/// gateway environ keys (`HTTP_USER_AGENT`) normalize the same way as wire
/// names (`user-agent`), to `User-Agent`.
pub fn canonical_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut start_of_segment = true;
    for c in name.chars() {
        if c == '-' || c == '_' {
            result.push('-');
            start_of_segment = true;
        } else if start_of_segment {
            result.extend(c.to_uppercase());
            start_of_segment = false;
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    /// Sets a header, replacing any previously stored value(s) for that name.
    pub fn set(&mut self, name: &str, value: &str) {
        self.headers
            .insert(canonical_name(name), vec![value.to_string()]);
    }

    /// Appends a value under `name`, keeping any existing ones.
    ///
    /// This is the only way a name ends up with more than one value.
    pub fn add(&mut self, name: &str, value: &str) {
        self.headers
            .entry(canonical_name(name))
            .or_default()
            .push(value.to_string());
    }

    /// Returns the first value stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&canonical_name(name))
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value stored under `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.headers
            .get(&canonical_name(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&canonical_name(name))
    }

    pub fn remove(&mut self, name: &str) {
        self.headers.shift_remove(&canonical_name(name));
    }

    pub fn len(&self) -> usize {
        self.headers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order. A multi-valued
    /// name yields one pair per value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().flat_map(|(name, values)| {
            values
                .iter()
                .map(move |value| (name.as_str(), value.as_str()))
        })
    }

    pub fn stringify(&self) -> String {
        let mut result = String::new();
        for (name, value) in self.iter() {
            result.push_str(&format!("{}: {}\r\n", name, value));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_capitalizes_segments() {
        assert_eq!(canonical_name("content-type"), "Content-Type");
        assert_eq!(canonical_name("X_REQUESTED_WITH"), "X-Requested-With");
        assert_eq!(canonical_name("Host"), "Host");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = HttpHeaders::new();
        headers.set("Content-Type", "text/html");
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT_TYPE"), Some("text/html"));
        assert!(headers.contains("content-TYPE"));
    }

    #[test]
    fn set_replaces_add_appends() {
        let mut headers = HttpHeaders::new();
        headers.set("Accept", "text/html");
        headers.set("Accept", "application/json");
        assert_eq!(headers.len(), 1);

        headers.add("Accept", "text/plain");
        assert_eq!(headers.get_all("Accept").len(), 2);
        assert_eq!(headers.get("Accept"), Some("application/json"));
    }

    #[test]
    fn stringify_preserves_insertion_order() {
        let mut headers = HttpHeaders::new();
        headers.set("Host", "example.org");
        headers.set("Content-Type", "text/html");
        assert_eq!(
            headers.stringify(),
            "Host: example.org\r\nContent-Type: text/html\r\n"
        );
    }
}
