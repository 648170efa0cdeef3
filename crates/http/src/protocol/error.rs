use std::io;
use thiserror::Error;

/// Top-level error for a connection's request/response cycle.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// Request parsing failures.
///
/// Every variant except `Io` means "malformed request": the connection is
/// closed without writing a response byte.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("request head too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeRequest { current_size: usize, max_size: usize },

    #[error("invalid request line: {reason}")]
    InvalidRequestLine { reason: String },

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid request path: {reason}")]
    InvalidPath { reason: String },

    #[error("invalid header block: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_request(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeRequest { current_size, max_size }
    }

    pub fn invalid_request_line<S: ToString>(str: S) -> Self {
        Self::InvalidRequestLine { reason: str.to_string() }
    }

    pub fn invalid_path<S: ToString>(str: S) -> Self {
        Self::InvalidPath { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Response writing failures.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
