//! Request construction from a gateway environ.
//!
//! An [`HttpRequest`] is built once per inbound environ and is read-only
//! afterwards: query parameters always, body parameters unless the request
//! came out of [`HttpRequest::clone_with_mutable_params`]. A mutable clone
//! deep-copies the parameter mappings while the environ and headers stay
//! shared, so copies are cheap and the original can never be changed through
//! one.

use std::fmt;
use std::sync::Arc;

use crate::config::HttpConfig;
use crate::gateway::{self, Environ};
use crate::http::HttpMethod;
use crate::http::MessageError;
use crate::http::cookies::CookieJar;
use crate::http::headers::HttpHeaders;
use crate::http::params::Params;
use crate::sessions::{Session, SessionStore};

/// Form field that overrides the effective method of a POST body.
const METHOD_OVERRIDE_FIELD: &str = "HTTP_REQUEST_METHOD";

pub struct HttpRequest {
    method: HttpMethod,
    uri: String,
    environ: Arc<Environ>,
    headers: Arc<HttpHeaders>,
    query: Params,
    post: Params,
    cookies: CookieJar,
    body: Vec<u8>,
    session: Option<Session>,
    config: HttpConfig,
    mutable: bool,
}

impl HttpRequest {
    /// Builds a request from a gateway environ, attaching a file-backed
    /// session under the configured directory.
    pub fn from_environ(environ: Environ, config: &HttpConfig) -> Result<Self, MessageError> {
        let store = SessionStore::file(&config.session_dir);
        Self::from_environ_with_store(environ, config, store)
    }

    /// Builds a request from a gateway environ with an explicit session
    /// store variant.
    ///
    /// Fails with [`MessageError::InvalidMethod`] when `REQUEST_METHOD` (or a
    /// body override) is outside the allowed set. Everything else is parsed
    /// permissively.
    pub fn from_environ_with_store(
        mut environ: Environ,
        config: &HttpConfig,
        store: SessionStore,
    ) -> Result<Self, MessageError> {
        let mut method: HttpMethod = environ
            .get(gateway::REQUEST_METHOD)
            .unwrap_or("GET")
            .parse()?;

        let mut headers = HttpHeaders::new();
        for (key, value) in environ.iter() {
            if let Some(name) = key.strip_prefix(gateway::HEADER_PREFIX) {
                headers.add(name, value);
            }
        }
        // The gateway exposes these two without the header prefix.
        if let Some(content_type) = environ.get(gateway::CONTENT_TYPE) {
            headers.set("Content-Type", content_type);
        }
        if let Some(content_length) = environ.get(gateway::CONTENT_LENGTH) {
            headers.set("Content-Length", content_length);
        }

        let query = Params::parse(environ.get(gateway::QUERY_STRING).unwrap_or(""));

        let uri = {
            let path = environ.get(gateway::PATH_INFO).unwrap_or("/");
            match environ.get(gateway::QUERY_STRING) {
                Some(qs) if !qs.is_empty() => format!("{}?{}", path, qs),
                _ => path.to_string(),
            }
        };

        // The input is consumed exactly once, bounded by CONTENT_LENGTH.
        let content_length = environ
            .get(gateway::CONTENT_LENGTH)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = environ.take_input().unwrap_or_default();
        body.truncate(content_length);

        let is_json = headers
            .get("Content-Type")
            .is_some_and(|ct| ct.contains("json"));
        let post = if method == HttpMethod::Post && !is_json {
            std::str::from_utf8(&body)
                .map(Params::parse)
                .unwrap_or_default()
        } else {
            Params::new()
        };

        // A POST body may carry the effective method; still validated.
        if method == HttpMethod::Post {
            if let Some(override_method) = post.get_str(METHOD_OVERRIDE_FIELD) {
                method = override_method.parse()?;
            }
        }

        let cookies = CookieJar::parse(environ.get("HTTP_COOKIE").unwrap_or(""));

        let session = match cookies.get(&config.session_cookie) {
            Some(cookie) => Session::new(&cookie.value, store),
            None => Session::generate(store),
        };

        Ok(Self {
            method,
            uri,
            environ: Arc::new(environ),
            headers: Arc::new(headers),
            query,
            post,
            cookies,
            body,
            session: Some(session),
            config: config.clone(),
            mutable: false,
        })
    }

    /// The effective method: `REQUEST_METHOD` normalized to uppercase, or
    /// the validated body override.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn is_method(&self, method: HttpMethod) -> bool {
        self.method == method
    }

    /// Path plus query string, as the client sent it.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// The raw gateway environ this request was built from.
    pub fn server(&self) -> &Environ {
        &self.environ
    }

    /// Query-string parameters. Always read-only.
    pub fn query(&self) -> &Params {
        &self.query
    }

    /// Body parameters. Read-only on an original request.
    pub fn post(&self) -> &Params {
        &self.post
    }

    /// Mutable access to the body parameters. Only requests produced by
    /// [`clone_with_mutable_params`](Self::clone_with_mutable_params) allow
    /// this; an original request fails with
    /// [`MessageError::ImmutableParams`].
    pub fn post_mut(&mut self) -> Result<&mut Params, MessageError> {
        if !self.mutable {
            return Err(MessageError::ImmutableParams);
        }
        Ok(&mut self.post)
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decodes the body as JSON. Decoding happens here, on access; a body
    /// that is not valid JSON fails now, never at construction.
    pub fn json_body(&self) -> Result<serde_json::Value, MessageError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// True when the request arrived over TLS: the gateway scheme says
    /// `https`, the legacy `HTTPS` flag is set, or the configured
    /// forwarded-proto header reports `https`.
    pub fn is_secure(&self) -> bool {
        if self.environ.get(gateway::URL_SCHEME) == Some("https") {
            return true;
        }
        if self.environ.contains(gateway::HTTPS) {
            return true;
        }
        self.headers
            .get(&self.config.forwarded_proto_header)
            .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
    }

    pub fn is_xml_http_request(&self) -> bool {
        self.headers
            .get("X-Requested-With")
            .is_some_and(|v| v.eq_ignore_ascii_case("XmlHttpRequest"))
    }

    /// The host the client addressed, preferring proxy-forwarded values.
    pub fn host(&self) -> &str {
        self.headers
            .get("X-Forwarded-For")
            .or_else(|| self.headers.get("Host"))
            .or_else(|| self.environ.get(gateway::SERVER_NAME))
            .unwrap_or("")
    }

    /// Absolute URL of the request.
    pub fn url(&self) -> String {
        let scheme = if self.is_secure() { "https" } else { "http" };
        format!("{}://{}{}", scheme, self.host(), self.uri)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Writes the session id into the request cookie jar under the
    /// configured cookie name. On a secure request the cookie is marked
    /// `Secure` and `HttpOnly` so it never leaks over plaintext.
    pub fn session_to_cookie(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let id = session.id().to_string();
        let secure = self.is_secure();
        let cookie = self.cookies.add(&self.config.session_cookie, &id);
        if secure {
            cookie.secure = true;
            cookie.http_only = true;
        }
    }

    /// Copies this request with independently mutable parameter mappings.
    ///
    /// The parameter maps are deep-copied and unlocked; the environ and
    /// headers stay shared with the original. Mutating the copy never
    /// affects the original.
    pub fn clone_with_mutable_params(&self) -> Self {
        Self {
            method: self.method,
            uri: self.uri.clone(),
            environ: Arc::clone(&self.environ),
            headers: Arc::clone(&self.headers),
            query: self.query.clone(),
            post: self.post.clone(),
            cookies: self.cookies.clone(),
            body: self.body.clone(),
            session: self.session.clone(),
            config: self.config.clone(),
            mutable: true,
        }
    }

    /// Whether this request allows body-parameter mutation.
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }
}

impl fmt::Display for HttpRequest {
    /// Renders the request line and headers in wire form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} HTTP/1.1\r\n{}\r\n",
            self.method,
            self.url(),
            self.headers.stringify()
        )
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<HttpRequest method:{} url:{}>",
            self.method,
            self.url()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_environ() -> Environ {
        let mut environ = Environ::new();
        environ.set(gateway::REQUEST_METHOD, "GET");
        environ.set(gateway::PATH_INFO, "/");
        environ.set(gateway::SERVER_NAME, "127.0.0.1");
        environ.set(gateway::SERVER_PORT, "80");
        environ.set("HTTP_HOST", "127.0.0.1");
        environ.set(gateway::URL_SCHEME, "http");
        environ
    }

    fn build(environ: Environ) -> HttpRequest {
        HttpRequest::from_environ_with_store(environ, &HttpConfig::default(), SessionStore::Null)
            .unwrap()
    }

    #[test]
    fn method_is_normalized_uppercase() {
        let mut environ = sample_environ();
        environ.set(gateway::REQUEST_METHOD, "get");
        let request = build(environ);
        assert_eq!(request.method(), HttpMethod::Get);
        assert!(request.is_method(HttpMethod::Get));
    }

    #[test]
    fn invalid_method_fails_construction() {
        let mut environ = sample_environ();
        environ.set(gateway::REQUEST_METHOD, "INVALID");
        let result =
            HttpRequest::from_environ_with_store(environ, &HttpConfig::default(), SessionStore::Null);
        assert!(matches!(result, Err(MessageError::InvalidMethod(_))));
    }

    #[test]
    fn headers_come_from_prefixed_keys() {
        let mut environ = sample_environ();
        environ.set("HTTP_USER_AGENT", "test-agent");
        let request = build(environ);
        assert_eq!(request.headers().get("User-Agent"), Some("test-agent"));
        assert_eq!(request.headers().get("Host"), Some("127.0.0.1"));
    }

    #[test]
    fn body_is_bounded_by_content_length() {
        let mut environ = sample_environ();
        environ.set(gateway::REQUEST_METHOD, "POST");
        environ.set(gateway::CONTENT_LENGTH, "4");
        environ.set_input(b"abcdEXTRA".to_vec());
        let request = build(environ);
        assert_eq!(request.body(), b"abcd");
    }

    #[test]
    fn json_decode_failure_is_lazy() {
        let body = b"not json".to_vec();
        let mut environ = sample_environ();
        environ.set(gateway::REQUEST_METHOD, "PUT");
        environ.set(gateway::CONTENT_TYPE, "application/json");
        environ.set(gateway::CONTENT_LENGTH, &body.len().to_string());
        environ.set_input(body);

        // Construction succeeds; only the decoded access fails.
        let request = build(environ);
        assert!(matches!(request.json_body(), Err(MessageError::Json(_))));
    }

    #[test]
    fn original_request_post_is_immutable() {
        let mut request = build(sample_environ());
        assert!(matches!(
            request.post_mut(),
            Err(MessageError::ImmutableParams)
        ));

        let mut copy = request.clone_with_mutable_params();
        assert!(copy.post_mut().is_ok());
    }

    #[test]
    fn display_renders_request_line_and_headers() {
        let mut environ = sample_environ();
        environ.set(gateway::URL_SCHEME, "https");
        environ.set(gateway::HTTPS, "HTTPS");
        let request = build(environ);
        assert_eq!(
            request.to_string(),
            "GET https://127.0.0.1/ HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n"
        );
        assert!(request.is_secure());
    }

    #[test]
    fn debug_is_compact() {
        let request = build(sample_environ());
        assert_eq!(
            format!("{:?}", request),
            "<HttpRequest method:GET url:http://127.0.0.1/>"
        );
    }
}
