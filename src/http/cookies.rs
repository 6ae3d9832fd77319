//! Cookie parsing and serialization.
//!
//! A [`CookieJar`] is an ordered mapping from cookie name to [`Cookie`].
//! Parsing a raw `Cookie` header is deliberately lenient: segments without an
//! `=` or with an empty name are skipped, never reported. Browsers send all
//! sorts of junk and a bad segment must not take the request down with it.
//!
//! Serialization goes the other way: each jar entry renders one `Set-Cookie`
//! header value, with attributes appended only when they are set.

use indexmap::IndexMap;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub domain: Option<String>,
    pub expires: Option<SystemTime>,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            path: "/".to_string(),
            domain: None,
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Renders this cookie as a `Set-Cookie` header value.
    pub fn to_set_cookie(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if !self.path.is_empty() {
            out.push_str(&format!("; Path={}", self.path));
        }
        if let Some(domain) = &self.domain {
            out.push_str(&format!("; Domain={}", domain));
        }
        if let Some(expires) = self.expires {
            out.push_str(&format!("; Expires={}", httpdate::fmt_http_date(expires)));
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: IndexMap<String, Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw `Cookie` header value. Malformed segments are skipped.
    pub fn parse(header: &str) -> Self {
        let mut jar = CookieJar::new();
        for segment in header.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let Some((name, value)) = segment.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            jar.add(name, value.trim());
        }
        jar
    }

    /// Inserts a cookie with default attributes, returning it for adjustment.
    pub fn add(&mut self, name: &str, value: &str) -> &mut Cookie {
        self.cookies
            .insert(name.to_string(), Cookie::new(name, value));
        // Just inserted under this key.
        self.cookies.get_mut(name).unwrap()
    }

    pub fn insert(&mut self, cookie: Cookie) {
        self.cookies.insert(cookie.name.clone(), cookie);
    }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Cookie> {
        self.cookies.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.values()
    }

    /// One `Set-Cookie` header value per entry, in insertion order.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.iter().map(Cookie::to_set_cookie).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn parses_simple_header() {
        let jar = CookieJar::parse("test=something;");
        assert_eq!(jar.get("test").unwrap().value, "something");
    }

    #[test]
    fn parses_multiple_cookies_in_order() {
        let jar = CookieJar::parse("a=1; b=2; c=3");
        let names: Vec<_> = jar.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn skips_malformed_segments() {
        let jar = CookieJar::parse("ok=1; junk; =orphan; also=2");
        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get("ok").unwrap().value, "1");
        assert_eq!(jar.get("also").unwrap().value, "2");
    }

    #[test]
    fn set_cookie_defaults_to_path_only() {
        let mut jar = CookieJar::new();
        jar.add("test", "value");
        assert_eq!(jar.set_cookie_headers(), ["test=value; Path=/"]);
    }

    #[test]
    fn set_cookie_appends_attributes_when_set() {
        let mut cookie = Cookie::new("sid", "abc");
        cookie.secure = true;
        cookie.http_only = true;
        cookie.expires = Some(UNIX_EPOCH + Duration::from_secs(784111777));
        assert_eq!(
            cookie.to_set_cookie(),
            "sid=abc; Path=/; Expires=Sun, 06 Nov 1994 08:49:37 GMT; Secure; HttpOnly"
        );
    }
}
