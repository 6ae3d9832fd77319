//! The server-gateway environ: the external collaborator this crate sits on.
//!
//! A serving layer hands application code a flat mapping describing one
//! inbound request: CGI-style string keys (`REQUEST_METHOD`, `QUERY_STRING`,
//! `HTTP_*` for headers) plus the request body as an input buffer. This module
//! only models that convention; it never fabricates transport state, and the
//! convention itself is owned by the serving layer.
//!
//! The input is consumed at most once ([`Environ::take_input`]), matching a
//! gateway input stream that cannot be rewound.

use indexmap::IndexMap;

pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
pub const QUERY_STRING: &str = "QUERY_STRING";
pub const PATH_INFO: &str = "PATH_INFO";
pub const SERVER_NAME: &str = "SERVER_NAME";
pub const SERVER_PORT: &str = "SERVER_PORT";
pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
pub const CONTENT_LENGTH: &str = "CONTENT_LENGTH";

/// Legacy flag some gateways set when the connection is TLS.
pub const HTTPS: &str = "HTTPS";
/// Scheme reported by the gateway, `http` or `https`.
pub const URL_SCHEME: &str = "gateway.url_scheme";

/// Prefix under which the gateway exposes request headers.
pub const HEADER_PREFIX: &str = "HTTP_";

#[derive(Debug, Default)]
pub struct Environ {
    vars: IndexMap<String, String>,
    input: Option<Vec<u8>>,
}

impl Environ {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Attaches the request body, standing in for the gateway input stream.
    pub fn set_input(&mut self, input: Vec<u8>) {
        self.input = Some(input);
    }

    /// Consumes the input. A second call yields `None`, like re-reading an
    /// exhausted stream.
    pub fn take_input(&mut self) -> Option<Vec<u8>> {
        self.input.take()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_consumed_once() {
        let mut environ = Environ::new();
        environ.set_input(b"payload".to_vec());
        assert_eq!(environ.take_input(), Some(b"payload".to_vec()));
        assert_eq!(environ.take_input(), None);
    }

    #[test]
    fn vars_round_trip() {
        let mut environ = Environ::new();
        environ.set(REQUEST_METHOD, "GET");
        assert_eq!(environ.get(REQUEST_METHOD), Some("GET"));
        assert!(!environ.contains(CONTENT_LENGTH));
    }
}
