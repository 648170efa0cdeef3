//! Streaming HTTP/1.1 request decoder.
//!
//! The decoder turns raw bytes into [`Request`] values through a two-phase
//! state machine:
//!
//! 1. **Head**: the lookahead buffer is searched for the request-line `CRLF`
//!    and the blank-line `CRLF CRLF`. The request line must split into
//!    exactly three space-separated tokens (verb, path, version), the verb
//!    must come from the closed [`Method`] set and the path must be rooted
//!    at `/`. Header lines between the two delimiters are kept raw: order
//!    preserved, duplicates allowed, names untouched.
//! 2. **Body**: for verbs that may carry one, the first literal
//!    `Content-Length:` line sizes the body; the decoder then waits until
//!    exactly that many bytes are buffered. GET bodies are always empty,
//!    even when a `Content-Length` line is present.
//!
//! The head may occupy at most [`MAX_REQUEST_BYTES`] of lookahead; a buffer
//! that reaches the limit without both delimiters is a malformed request.
//! All head failures are reported uniformly: the connection layer closes
//! the socket without writing a response.
//!
//! The buffered framing decouples "peek for delimiters" from "consume the
//! payload": nothing is taken off the buffer until the whole head has been
//! validated, so there is no stream rewind.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{Method, ParseError, Request};

/// Maximum size in bytes of the request head (request line + headers).
pub const MAX_REQUEST_BYTES: usize = 4096;

const LINE_DELIMITER: &[u8] = b"\r\n";
const HEAD_DELIMITER: &[u8] = b"\r\n\r\n";

/// Decoder for complete HTTP requests implementing [`Decoder`].
///
/// One instance serves one connection and is reused across keep-alive
/// request cycles.
#[derive(Debug, Default)]
pub struct RequestDecoder {
    /// Parsed head waiting for its body bytes, with the declared length.
    pending: Option<(Head, usize)>,
}

#[derive(Debug)]
struct Head {
    method: Method,
    path: String,
    headers: Vec<String>,
}

impl Head {
    fn into_request(self, body: Bytes) -> Request {
        Request::new(self.method, self.path, self.headers, body)
    }
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode one complete request from `src`.
    ///
    /// Returns `Ok(None)` while the head or the declared body is still
    /// incomplete; the framed read retries after more bytes arrive, so a
    /// short body read blocks until the peer delivers or closes.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some((head, length)) = self.pending.take() {
            if src.len() < length {
                src.reserve(length - src.len());
                self.pending = Some((head, length));
                return Ok(None);
            }
            let body = src.split_to(length).freeze();
            return Ok(Some(head.into_request(body)));
        }

        match decode_head(src)? {
            None => Ok(None),
            Some((head, 0)) => Ok(Some(head.into_request(Bytes::new()))),
            Some((head, length)) => {
                trace!(length, "request head parsed, awaiting body");
                self.pending = Some((head, length));
                self.decode(src)
            }
        }
    }
}

/// Parses and consumes the request head, returning it together with the
/// declared body length. `Ok(None)` means more bytes are needed.
fn decode_head(src: &mut BytesMut) -> Result<Option<(Head, usize)>, ParseError> {
    let Some(line_end) = find(src, LINE_DELIMITER) else {
        ensure!(src.len() < MAX_REQUEST_BYTES, ParseError::too_large_request(src.len(), MAX_REQUEST_BYTES));
        return Ok(None);
    };

    // the request line is validated as soon as it is framed, before the
    // rest of the head arrives
    let request_line = std::str::from_utf8(&src[..line_end])
        .map_err(|_| ParseError::invalid_request_line("request line is not utf-8"))?;

    let mut tokens = request_line.split(' ');
    let (Some(method_token), Some(path), Some(_version), None) =
        (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(ParseError::invalid_request_line(format!("expected 3 tokens in {request_line:?}")));
    };

    let method = Method::try_from(method_token)?;
    ensure!(path.starts_with('/'), ParseError::invalid_path(format!("{path:?} does not start with '/'")));

    // the blank-line search starts at the request line's own CRLF so that a
    // header-less request (request line + CRLF CRLF) still frames
    let Some(head_end) = find(&src[line_end..], HEAD_DELIMITER).map(|idx| line_end + idx) else {
        ensure!(src.len() < MAX_REQUEST_BYTES, ParseError::too_large_request(src.len(), MAX_REQUEST_BYTES));
        return Ok(None);
    };

    let headers: Vec<String> = if head_end == line_end {
        Vec::new()
    } else {
        let block = std::str::from_utf8(&src[line_end + LINE_DELIMITER.len()..head_end])
            .map_err(|_| ParseError::invalid_header("header block is not utf-8"))?;
        block.split("\r\n").map(str::to_owned).collect()
    };

    let length = if method.need_body() {
        match Request::find_header(&headers, "Content-Length") {
            Some(value) => value
                .parse::<usize>()
                .map_err(|_| ParseError::invalid_content_length(format!("{value:?} is not a non-negative integer")))?,
            None => 0,
        }
    } else {
        // GET carries no body, whatever the headers declare
        0
    };

    let head = Head { method, path: path.to_owned(), headers };
    src.advance(head_end + HEAD_DELIMITER.len());

    Ok(Some((head, length)))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn decode_all(raw: &[u8]) -> Result<Option<Request>, ParseError> {
        RequestDecoder::new().decode(&mut BytesMut::from(raw))
    }

    #[test]
    fn single_line_request_without_headers() {
        let request = decode_all(b"GET /index.html HTTP/1.1\r\n\r\n").unwrap().unwrap();
        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.path(), "/index.html");
        assert!(request.headers().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn headers_are_kept_raw_and_ordered() {
        let raw = indoc! {"
            GET /index/?a=1&b=2 HTTP/1.1
            Host: 127.0.0.1:8080
            Connection: keep-alive
            accept: */*

        "}
        .replace('\n', "\r\n");

        let request = decode_all(raw.as_bytes()).unwrap().unwrap();
        assert_eq!(request.path(), "/index/?a=1&b=2");
        assert_eq!(request.path_without_query(), "/index/");
        assert_eq!(
            request.headers(),
            &["Host: 127.0.0.1:8080".to_owned(), "Connection: keep-alive".to_owned(), "accept: */*".to_owned()]
        );
        assert!(request.keep_alive());
    }

    #[test]
    fn content_length_body_is_read_exactly() {
        let mut buffer = BytesMut::from(&b"POST /upload HTTP/1.1\r\nContent-Length: 5\r\n\r\nhelloEXTRA"[..]);
        let request = RequestDecoder::new().decode(&mut buffer).unwrap().unwrap();
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.body(), b"hello");
        // bytes past the declared length stay for the next cycle
        assert_eq!(&buffer[..], b"EXTRA");
    }

    #[test]
    fn post_without_content_length_has_empty_body() {
        let request = decode_all(b"POST /upload HTTP/1.1\r\nHost: x\r\n\r\n").unwrap().unwrap();
        assert!(request.body().is_empty());
    }

    #[test]
    fn get_ignores_content_length() {
        let mut buffer = BytesMut::from(&b"GET /x HTTP/1.1\r\nContent-Length: 5\r\n\r\n"[..]);
        let request = RequestDecoder::new().decode(&mut buffer).unwrap().unwrap();
        assert!(request.body().is_empty());
        assert!(buffer.is_empty());
    }

    #[test]
    fn partial_head_needs_more_data() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = BytesMut::from(&b"GET /index.html HT"[..]);
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"TP/1.1\r\nHost: x\r\n");
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"\r\n");
        let request = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(request.path(), "/index.html");
        assert_eq!(request.headers(), &["Host: x".to_owned()]);
    }

    #[test]
    fn partial_body_needs_more_data() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = BytesMut::from(&b"PUT /f HTTP/1.1\r\nContent-Length: 10\r\n\r\n12345"[..]);
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"67890");
        let request = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(request.body(), b"1234567890");
    }

    #[test]
    fn pipelined_requests_decode_in_sequence() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = BytesMut::from(&b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n"[..]);

        let first = decoder.decode(&mut buffer).unwrap().unwrap();
        let second = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(first.path(), "/a");
        assert_eq!(second.path(), "/b");
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn garbage_request_line_fails() {
        assert!(matches!(decode_all(b"GARBAGE\r\n\r\n"), Err(ParseError::InvalidRequestLine { .. })));
    }

    #[test]
    fn wrong_token_count_fails() {
        assert!(decode_all(b"GET /a HTTP/1.1 EXTRA\r\n\r\n").is_err());
        assert!(decode_all(b"GET  /a HTTP/1.1\r\n\r\n").is_err());
    }

    #[test]
    fn unknown_method_fails() {
        assert!(matches!(decode_all(b"PATCH /a HTTP/1.1\r\n\r\n"), Err(ParseError::InvalidMethod)));
    }

    #[test]
    fn unrooted_path_fails() {
        assert!(matches!(decode_all(b"GET a HTTP/1.1\r\n\r\n"), Err(ParseError::InvalidPath { .. })));
    }

    #[test]
    fn invalid_content_length_fails() {
        let raw = b"POST /a HTTP/1.1\r\nContent-Length: ten\r\n\r\n";
        assert!(matches!(decode_all(raw), Err(ParseError::InvalidContentLength { .. })));
    }

    #[test]
    fn oversized_head_fails() {
        // no CRLF at all within the limit
        let raw = vec![b'a'; MAX_REQUEST_BYTES];
        assert!(matches!(decode_all(&raw), Err(ParseError::TooLargeRequest { .. })));

        // request line frames but the blank line never arrives
        let mut raw = b"GET /a HTTP/1.1\r\n".to_vec();
        raw.resize(MAX_REQUEST_BYTES, b'x');
        assert!(matches!(decode_all(&raw), Err(ParseError::TooLargeRequest { .. })));
    }
}
