//! Response construction and serialization.
//!
//! An [`HttpResponse`] stays mutable until it is serialized: status, headers,
//! cookies and body can all be adjusted freely. Serialization computes
//! `Content-Length` from the body byte length and appends one `Set-Cookie`
//! header per jar entry, in insertion order.

use crate::http::cookies::CookieJar;
use crate::http::headers::HttpHeaders;
use crate::http::status;

pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub cookies: CookieJar,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self::with_status(200)
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            cookies: CookieJar::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let mut response = Self::with_status(status);
        response.body = body.into();
        response
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// `"<code> <phrase>"` via the fixed lookup table.
    pub fn status_line(&self) -> String {
        status::status_line(self.status)
    }

    /// Produces the `(status-line, header-list)` pair a gateway's
    /// start-response callback expects.
    ///
    /// The header list always starts with the computed `Content-Length`,
    /// followed by the explicit headers in insertion order, then one
    /// `Set-Cookie` per cookie in insertion order.
    pub fn start(&self) -> (String, Vec<(String, String)>) {
        let mut headers = vec![("Content-Length".to_string(), self.body.len().to_string())];
        for (name, value) in self.headers.iter() {
            // The computed length is authoritative.
            if name.eq_ignore_ascii_case("Content-Length") {
                continue;
            }
            headers.push((name.to_string(), value.to_string()));
        }
        for set_cookie in self.cookies.set_cookie_headers() {
            headers.push(("Set-Cookie".to_string(), set_cookie));
        }
        (self.status_line(), headers)
    }

    /// Serializes the full response to raw bytes:
    /// status line, headers, blank line, body.
    pub fn raw(&self) -> Vec<u8> {
        let (status_line, headers) = self.start();
        let mut out = format!("HTTP/1.1 {}\r\n", status_line);
        for (name, value) in &headers {
            out.push_str(&format!("{}: {}\r\n", name, value));
        }
        out.push_str("\r\n");

        let mut bytes = out.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }

    /// The gateway-response convention: invokes `start_response` with the
    /// status line and header list, then returns the body chunks.
    pub fn send<F>(&self, start_response: F) -> Vec<Vec<u8>>
    where
        F: FnOnce(&str, &[(String, String)]),
    {
        let (status_line, headers) = self.start();
        start_response(&status_line, &headers);
        vec![self.body.clone()]
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_200_ok() {
        let response = HttpResponse::new();
        assert_eq!(response.status_line(), "200 OK");
        assert!(response.body().is_empty());
    }

    #[test]
    fn start_always_carries_content_length() {
        let response = HttpResponse::new();
        let (status_line, headers) = response.start();
        assert_eq!(status_line, "200 OK");
        assert_eq!(headers, [("Content-Length".to_string(), "0".to_string())]);
    }

    #[test]
    fn raw_serializes_headers_and_body() {
        let mut response = HttpResponse::with_body(200, "Something here");
        response.headers.set("Content-Type", "text/html");
        assert_eq!(
            response.raw(),
            b"HTTP/1.1 200 OK\r\nContent-Length: 14\r\nContent-Type: text/html\r\n\r\nSomething here"
        );
    }

    #[test]
    fn content_length_tracks_body_bytes() {
        let mut response = HttpResponse::new();
        response.set_body("caf\u{e9}"); // 5 bytes in UTF-8
        let (_, headers) = response.start();
        assert_eq!(headers[0].1, "5");
    }

    #[test]
    fn cookies_serialize_after_headers() {
        let mut response = HttpResponse::with_body(200, "Test");
        response.cookies.add("test", "value");
        assert_eq!(
            response.to_string(),
            "HTTP/1.1 200 OK\r\nContent-Length: 4\r\nSet-Cookie: test=value; Path=/\r\n\r\nTest"
        );
    }

    #[test]
    fn send_follows_gateway_convention() {
        let response = HttpResponse::with_body(200, "Test");
        let mut seen_status = String::new();
        let chunks = response.send(|status_line, _headers| {
            seen_status = status_line.to_string();
        });
        assert_eq!(seen_status, "200 OK");
        assert_eq!(chunks, [b"Test".to_vec()]);
    }

    #[test]
    fn explicit_content_length_is_overridden() {
        let mut response = HttpResponse::with_body(200, "abc");
        response.headers.set("Content-Length", "999");
        let (_, headers) = response.start();
        let lengths: Vec<_> = headers
            .iter()
            .filter(|(name, _)| name == "Content-Length")
            .collect();
        assert_eq!(lengths.len(), 1);
        assert_eq!(lengths[0].1, "3");
    }
}
