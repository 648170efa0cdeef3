//! Wire-level encoding and decoding.
//!
//! - [`RequestDecoder`]: streaming request parser, driven through
//!   `tokio_util::codec::FramedRead`
//! - [`ok_head`] / [`not_found_head`] / [`bad_request_head`]: pure builders
//!   for the response status-line + header blocks

mod request_decoder;
mod response_encoder;

pub use request_decoder::RequestDecoder;
pub use response_encoder::bad_request_head;
pub use response_encoder::not_found_head;
pub use response_encoder::ok_head;
