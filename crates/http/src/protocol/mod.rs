//! Core protocol types.
//!
//! This module holds the building blocks the rest of the crate works with:
//!
//! - [`Method`]: the closed set of request verbs the server accepts
//! - [`Request`]: an immutable, fully parsed request
//! - [`parent_path`]: filesystem-style parent of a request path, used by the
//!   router's fallback lookup
//! - [`HttpError`] / [`ParseError`] / [`SendError`]: the error taxonomy
//!
//! A [`Request`] is only ever constructed by the codec, so its invariants
//! (rooted path, verb from the closed set) hold by construction.

mod method;
pub use method::Method;

mod request;
pub use request::parent_path;
pub use request::Request;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
