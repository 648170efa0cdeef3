//! Pure builders for response status-line + header blocks.
//!
//! Handlers write their own responses; these helpers produce the canonical
//! head blocks so the framing stays uniform. Each block ends with the blank
//! line, so callers append body bytes directly after it.
//!
//! The `Connection: close` line is included only when `close` is set, which
//! callers derive from the absence of the request's keep-alive header.

/// Head block for a `200 OK` response with the given content type and
/// body length.
pub fn ok_head(mime_type: &str, length: u64, close: bool) -> String {
    let connection = if close { "Connection: close\r\n\r\n" } else { "\r\n" };
    format!("HTTP/1.1 200 OK\r\nContent-Type: {mime_type}\r\nContent-Length: {length}\r\n{connection}")
}

/// Head block for a bodyless `404 Not Found` response. The connection layer
/// writes this itself when no handler resolves.
pub fn not_found_head(close: bool) -> String {
    let connection = if close { "Connection: close\r\n\r\n" } else { "\r\n" };
    format!("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n{connection}")
}

/// Head block for a bodyless `400 Bad Request` response.
///
/// The parser's failure path closes the socket without any response, so
/// nothing in the core sends this block; it is provided for handlers that
/// validate payloads themselves.
pub fn bad_request_head() -> String {
    "HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_owned()
}
