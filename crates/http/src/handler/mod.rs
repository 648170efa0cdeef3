//! Request handler contract.
//!
//! A [`Handler`] is an opaque capability: given a parsed [`Request`] and
//! the connection's writable sink, it produces a complete, correctly framed
//! response (status line, headers, body) and flushes it. The core never
//! inspects a handler's internals and never writes to the sink once a
//! handler has been selected.

use std::future::Future;
use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::protocol::Request;

/// The writable sink a handler responds into.
pub type ResponseSink = dyn AsyncWrite + Send + Unpin;

/// Boxed future alias used by the [`handler_fn`] adapter.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A request handler.
///
/// Implementations are shared across connections, so they must be `Send`
/// and `Sync`; per-request state belongs in locals of `handle`.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: &Request, sink: &mut ResponseSink) -> io::Result<()>;
}

/// Adapter created by [`handler_fn`], wrapping a boxed-future function.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(&'a Request, &'a mut ResponseSink) -> BoxFuture<'a, io::Result<()>> + Send + Sync,
{
    async fn handle(&self, request: &Request, sink: &mut ResponseSink) -> io::Result<()> {
        (self.f)(request, sink).await
    }
}

/// Wraps a function into a [`Handler`].
///
/// ```no_run
/// use std::io;
/// use nano_http::handler::{handler_fn, BoxFuture, ResponseSink};
/// use nano_http::protocol::Request;
/// use tokio::io::AsyncWriteExt;
///
/// fn hello<'a>(_request: &'a Request, sink: &'a mut ResponseSink) -> BoxFuture<'a, io::Result<()>> {
///     Box::pin(async move { sink.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await })
/// }
///
/// let handler = handler_fn(hello);
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a Request, &'a mut ResponseSink) -> BoxFuture<'a, io::Result<()>> + Send + Sync,
{
    HandlerFn { f }
}
