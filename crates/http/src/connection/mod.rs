//! Per-connection request/response lifecycle.
//!
//! [`HttpConnection`] owns one accepted socket (as a reader/writer pair)
//! and runs its full state machine: parse a request, resolve a handler,
//! let it respond, then either loop for the next request (keep-alive) or
//! shut the connection down.
//!
//! Failure policy:
//!
//! - a malformed request tears the socket down without writing a byte
//! - an unresolved route gets the canonical not-found block, written by
//!   this layer itself
//! - transport errors abort this connection only; the acceptor and other
//!   connections are unaffected

use std::sync::Arc;

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::FramedRead;
use tracing::{debug, error};

use crate::codec::{not_found_head, RequestDecoder};
use crate::protocol::{HttpError, Request, SendError};
use crate::router::Router;

/// One accepted connection, processing requests strictly sequentially.
///
/// # Type Parameters
///
/// * `R`: the readable half of the socket
/// * `W`: the writable half, handed to handlers as their response sink
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    writer: W,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Send + Unpin + 'static,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), 4 * 1024), writer }
    }

    /// Runs the connection until it closes.
    ///
    /// Returns `Ok(())` on an orderly shutdown (peer EOF or a non-keep-alive
    /// cycle) and `Err` when parsing or writing failed; in both cases the
    /// socket is finished when this returns.
    pub async fn process(mut self, router: Arc<Router>) -> Result<(), HttpError> {
        loop {
            match self.framed_read.next().await {
                Some(Ok(request)) => {
                    let keep_alive = self.dispatch(&request, router.as_ref()).await?;
                    if !keep_alive {
                        self.writer.shutdown().await.map_err(SendError::io)?;
                        return Ok(());
                    }
                }

                Some(Err(e)) => {
                    // malformed request: close without writing a response
                    error!(cause = %e, "can't parse request, closing connection");
                    return Err(e.into());
                }

                None => {
                    debug!("peer closed the connection");
                    return Ok(());
                }
            }
        }
    }

    /// One parse-route-handle cycle; returns the keep-alive decision.
    async fn dispatch(&mut self, request: &Request, router: &Router) -> Result<bool, HttpError> {
        let keep_alive = request.keep_alive();

        match router.resolve(request.method(), request.path()) {
            Some(handler) => {
                // the handler owns the sink from here: it writes the complete
                // response and flushes it
                handler.handle(request, &mut self.writer).await.map_err(SendError::io)?;
            }
            None => {
                let head = not_found_head(!keep_alive);
                self.writer.write_all(head.as_bytes()).await.map_err(SendError::io)?;
                self.writer.flush().await.map_err(SendError::io)?;
            }
        }

        Ok(keep_alive)
    }
}

impl<R, W> std::fmt::Debug for HttpConnection<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnection").finish_non_exhaustive()
    }
}
