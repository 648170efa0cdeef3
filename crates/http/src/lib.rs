//! A minimal asynchronous HTTP/1.1 server core.
//!
//! This crate provides the three pieces a small HTTP server actually needs,
//! built on top of tokio:
//!
//! - a wire-level request parser ([`codec::RequestDecoder`]) that frames a
//!   byte stream into immutable [`protocol::Request`] values
//! - a handler registry ([`router::Router`]) resolving requests by exact
//!   path first, then by the path's parent directory
//! - a connection lifecycle ([`connection::HttpConnection`] driven by
//!   [`server::Server`]) with keep-alive looping and a bounded pool of
//!   concurrently served connections
//!
//! Handlers are external collaborators: a handler receives the parsed
//! request and the connection's writable sink, and is responsible for the
//! complete response, status line through body. The [`codec`] module
//! provides the canonical head blocks so handlers only append body bytes.
//!
//! # Example
//!
//! ```no_run
//! use std::io;
//! use nano_http::codec::ok_head;
//! use nano_http::handler::{handler_fn, BoxFuture, ResponseSink};
//! use nano_http::protocol::{Method, Request};
//! use nano_http::router::{Route, Router};
//! use nano_http::server::Server;
//! use tokio::io::AsyncWriteExt;
//!
//! fn index<'a>(request: &'a Request, sink: &'a mut ResponseSink) -> BoxFuture<'a, io::Result<()>> {
//!     Box::pin(async move {
//!         let body = b"hello world";
//!         let head = ok_head(mime::TEXT_PLAIN.as_ref(), body.len() as u64, !request.keep_alive());
//!         sink.write_all(head.as_bytes()).await?;
//!         sink.write_all(body).await?;
//!         sink.flush().await
//!     })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.register(Method::Get, Route::exact("/index.html"), handler_fn(index));
//!     // anything else under "/" without its own registration
//!     router.register(Method::Get, Route::parent("/"), handler_fn(index));
//!
//!     let server = Server::builder().address("127.0.0.1:9999").router(router).build()?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Behavior notes
//!
//! - Requests on one connection are processed strictly sequentially; there
//!   is no pipelining. Connections are independent of each other.
//! - A malformed request (bad framing, wrong token count, unknown verb,
//!   unrooted path) closes the connection without any response bytes.
//! - A request whose route does not resolve gets the canonical 404 block,
//!   written by the connection layer itself.
//! - The request head is limited to 4 KiB; bodies are sized by the first
//!   `Content-Length` header line and GET bodies are always empty.
//! - No TLS, no chunked transfer-encoding, no read or write timeouts.

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod router;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
