/// Fixed lookup from status code to reason phrase.
///
/// Unknown codes map to an empty phrase rather than an error; a response may
/// carry any numeric status.
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",

        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",

        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",

        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        418 => "I'm a teapot",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",

        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",

        _ => "",
    }
}

/// Renders `"<code> <phrase>"`, or just `"<code>"` for an unknown code.
pub fn status_line(code: u16) -> String {
    let phrase = reason_phrase(code);
    if phrase.is_empty() {
        code.to_string()
    } else {
        format!("{} {}", code, phrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_phrases() {
        assert_eq!(status_line(200), "200 OK");
        assert_eq!(status_line(404), "404 Not Found");
        assert_eq!(status_line(505), "505 HTTP Version Not Supported");
    }

    #[test]
    fn unknown_codes_render_bare() {
        assert_eq!(reason_phrase(299), "");
        assert_eq!(status_line(299), "299");
    }
}
