//! The parsed request model.
//!
//! A [`Request`] is an immutable snapshot of one wire message: verb, raw
//! path (query string included), the header lines exactly as they appeared
//! on the wire (order preserved, duplicates allowed, names untouched) and
//! the body bytes. It is created by the codec per parsed message and
//! dropped once its handler returns.

use bytes::Bytes;

use crate::protocol::Method;

/// An immutable, fully parsed HTTP request.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<String>,
    body: Bytes,
}

impl Request {
    /// Only the codec builds requests; it has already checked that `path`
    /// is rooted at `/` and `method` is in the closed set.
    pub(crate) fn new(method: Method, path: String, headers: Vec<String>, body: Bytes) -> Self {
        Self { method, path, headers, body }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The raw request path, query string included.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw header lines in wire order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The path up to (not including) the first `?`.
    pub fn path_without_query(&self) -> &str {
        match self.path.split_once('?') {
            Some((path, _query)) => path,
            None => &self.path,
        }
    }

    /// Whether the client asked to reuse this connection.
    ///
    /// This is a literal match on the raw header line, exactly what the
    /// wire carried; `connection: Keep-Alive` does not count.
    pub fn keep_alive(&self) -> bool {
        self.headers.iter().any(|line| line == "Connection: keep-alive")
    }

    /// The value of the first header line starting with the literal
    /// (case-sensitive) `name` followed by a colon, trimmed.
    pub fn find_header<'a>(headers: &'a [String], name: &str) -> Option<&'a str> {
        headers.iter().find_map(|line| {
            let rest = line.strip_prefix(name)?;
            let value = rest.strip_prefix(':')?;
            Some(value.trim())
        })
    }

    /// [`Self::find_header`] over this request's own header lines.
    pub fn header(&self, name: &str) -> Option<&str> {
        Self::find_header(&self.headers, name)
    }
}

/// Filesystem-style parent of a request path: `/a/b` is under `/a`, `/a`
/// under `/`. The root itself has no parent.
pub fn parent_path(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        // the path was "/" (or only slashes)
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(&trimmed[..idx]),
        None => None,
    }
}
