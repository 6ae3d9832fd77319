use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod cookies;
pub mod headers;
pub mod params;
pub mod request;
pub mod response;
pub mod status;

/// Errors raised while constructing or reading a request.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The environ carried a method outside the allowed set. Fatal to the
    /// construction of that request.
    #[error("invalid HTTP method `{0}`")]
    InvalidMethod(String),

    /// Body parameters on an original request are read-only; mutation is only
    /// allowed on a request obtained via
    /// [`clone_with_mutable_params`](request::HttpRequest::clone_with_mutable_params).
    #[error("request parameters are immutable")]
    ImmutableParams,

    /// The body claimed to be JSON but did not decode. Only raised when the
    /// decoded body is accessed, never at construction.
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// The fixed set of methods a request may carry.
/// Anything else fails construction with [`MessageError::InvalidMethod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = MessageError;

    /// Case-insensitive: `get` normalizes to `GET`.
    fn from_str(method: &str) -> Result<Self, Self::Err> {
        match method.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "TRACE" => Ok(HttpMethod::Trace),
            "OPTIONS" => Ok(HttpMethod::Options),
            "CONNECT" => Ok(HttpMethod::Connect),
            _ => Err(MessageError::InvalidMethod(method.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_parse_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("POST".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(matches!(
            "INVALID".parse::<HttpMethod>(),
            Err(MessageError::InvalidMethod(m)) if m == "INVALID"
        ));
    }
}
