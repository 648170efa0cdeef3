//! Server bootstrap: builder, acceptor loop and worker dispatch.
//!
//! The acceptor blocks on incoming connections and hands each accepted
//! socket to its own task for the connection's whole lifetime. A semaphore
//! with a fixed number of permits bounds how many connections are served
//! concurrently; when the pool is saturated, accepted connections wait for
//! a permit instead of being rejected.
//!
//! Registration happens on the [`Router`] before the server starts, so
//! lookups need no locking while serving.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::connection::HttpConnection;
use crate::router::Router;

/// Default bound on concurrently served connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 64;

/// Builder for [`Server`].
pub struct ServerBuilder {
    router: Option<Router>,
    address: Option<io::Result<Vec<SocketAddr>>>,
    max_connections: usize,
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,
    #[error("address must be set")]
    MissingAddress,
    #[error("can't resolve address: {0}")]
    InvalidAddress(io::Error),
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, address: None, max_connections: DEFAULT_MAX_CONNECTIONS }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Caps the number of connections served at once; further accepted
    /// connections queue until a permit frees up.
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let address = match self.address {
            None => return Err(ServerBuildError::MissingAddress),
            Some(Err(e)) => return Err(ServerBuildError::InvalidAddress(e)),
            Some(Ok(address)) => address,
        };
        Ok(Server { router: Arc::new(router), address, max_connections: self.max_connections })
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("address", &self.address)
            .field("max_connections", &self.max_connections)
            .finish_non_exhaustive()
    }
}

/// The assembled server. [`Server::start`] blocks the calling task for the
/// server's lifetime.
pub struct Server {
    router: Arc<Router>,
    address: Vec<SocketAddr>,
    max_connections: usize,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Binds the configured address and serves until the process exits.
    pub async fn start(self) -> io::Result<()> {
        info!(address = ?self.address, "start listening");
        let listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e);
            }
        };
        self.serve(listener).await
    }

    /// Serves an already-bound listener. Useful when the caller needs the
    /// local address first, e.g. after binding port 0.
    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        let permits = Arc::new(Semaphore::new(self.max_connections));

        loop {
            let (tcp_stream, remote_addr) = match listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    // accept failures are recoverable, keep listening
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let router = Arc::clone(&self.router);
            let permits = Arc::clone(&permits);

            tokio::spawn(async move {
                // a saturated pool delays the connection, it is never rejected
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };

                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::new(reader, writer);
                match connection.process(router).await {
                    Ok(()) => {
                        info!(peer = %remote_addr, "connection closed");
                    }
                    Err(e) => {
                        error!(peer = %remote_addr, cause = %e, "connection aborted");
                    }
                }
            });
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("address", &self.address)
            .field("max_connections", &self.max_connections)
            .field("router", &self.router)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_router_and_address() {
        assert!(matches!(Server::builder().build(), Err(ServerBuildError::MissingRouter)));
        assert!(matches!(
            Server::builder().router(Router::new()).build(),
            Err(ServerBuildError::MissingAddress)
        ));
        let server = Server::builder().router(Router::new()).address("127.0.0.1:0").build().unwrap();
        assert_eq!(server.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn build_rejects_unresolvable_address() {
        let result = Server::builder().router(Router::new()).address("definitely not an address").build();
        assert!(matches!(result, Err(ServerBuildError::InvalidAddress(_))));
    }
}
