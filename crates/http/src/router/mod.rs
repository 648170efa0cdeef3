//! Handler registry and route resolution.
//!
//! Handlers are registered under a [`Route`]: either an exact resource path
//! or a parent-directory fallback. Exact and parent registrations live in
//! two separate per-method tables, and resolution queries them in a fixed
//! order: the exact table first, then the parent table keyed by the
//! request path's parent. An exact match therefore always wins, regardless
//! of registration order, and at most one handler is invoked per request.
//!
//! The router is built once before serving starts and is read-only
//! afterwards; it is shared between connections as `Arc<Router>` with no
//! locking.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use tracing::debug;

use crate::handler::Handler;
use crate::protocol::{parent_path, Method};

/// A registration key for the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Matches requests whose path (query string stripped) equals this path.
    Exact(String),
    /// Matches requests whose path's parent directory equals this path,
    /// when no exact registration applies. `Route::parent("/")` catches
    /// every top-level resource without its own handler.
    Parent(String),
}

impl Route {
    pub fn exact(path: impl Into<String>) -> Self {
        Self::Exact(path.into())
    }

    pub fn parent(path: impl Into<String>) -> Self {
        Self::Parent(path.into())
    }
}

type BoxHandler = Box<dyn Handler>;
type PathTable = HashMap<String, BoxHandler>;

/// Mapping from (method, route) to handlers, with parent-path fallback.
#[derive(Default)]
pub struct Router {
    exact: HashMap<Method, PathTable>,
    parent: HashMap<Method, PathTable>,
}

impl Router {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers `handler` under `route`. Registering the same (method,
    /// route) pair again silently replaces the previous handler.
    pub fn register(&mut self, method: Method, route: Route, handler: impl Handler + 'static) {
        let (table, path) = match route {
            Route::Exact(path) => (self.exact.entry(method).or_default(), path),
            Route::Parent(path) => (self.parent.entry(method).or_default(), path),
        };
        table.insert(path, Box::new(handler));
    }

    /// Resolves the handler for a request path (query string allowed).
    ///
    /// Returns `None` when neither the exact path nor its parent has a
    /// registration; the caller responds with the not-found block.
    pub fn resolve(&self, method: Method, request_path: &str) -> Option<&dyn Handler> {
        let path = match request_path.split_once('?') {
            Some((path, _query)) => path,
            None => request_path,
        };

        if let Some(handler) = self.exact.get(&method).and_then(|table| table.get(path)) {
            return Some(handler.as_ref());
        }

        let parent = parent_path(path)?;
        match self.parent.get(&method).and_then(|table| table.get(parent)) {
            Some(handler) => Some(handler.as_ref()),
            None => {
                debug!(path, parent, "no handler registered");
                None
            }
        }
    }
}

impl Debug for Router {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let count = |tables: &HashMap<Method, PathTable>| tables.values().map(HashMap::len).sum::<usize>();
        f.debug_struct("Router")
            .field("exact_routes", &count(&self.exact))
            .field("parent_routes", &count(&self.parent))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ResponseSink;
    use crate::protocol::Request;
    use bytes::Bytes;
    use std::io;

    /// Writes its tag into the sink so tests can tell handlers apart.
    struct Tag(&'static str);

    #[async_trait::async_trait]
    impl Handler for Tag {
        async fn handle(&self, _request: &Request, sink: &mut ResponseSink) -> io::Result<()> {
            use tokio::io::AsyncWriteExt;
            sink.write_all(self.0.as_bytes()).await
        }
    }

    async fn tag_of(router: &Router, method: Method, path: &str) -> Option<String> {
        let handler = router.resolve(method, path)?;
        let request = Request::new(method, path.to_owned(), Vec::new(), Bytes::new());
        let mut sink: Vec<u8> = Vec::new();
        handler.handle(&request, &mut sink).await.unwrap();
        Some(String::from_utf8(sink).unwrap())
    }

    fn router() -> Router {
        let mut router = Router::new();
        router.register(Method::Get, Route::exact("/a"), Tag("exact-a"));
        router.register(Method::Get, Route::parent("/"), Tag("root-fallback"));
        router.register(Method::Get, Route::parent("/files"), Tag("files-fallback"));
        router
    }

    #[tokio::test]
    async fn exact_match_wins_over_parent() {
        let router = router();
        assert_eq!(tag_of(&router, Method::Get, "/a").await.unwrap(), "exact-a");
    }

    #[tokio::test]
    async fn parent_fallback_applies_without_exact_match() {
        let router = router();
        assert_eq!(tag_of(&router, Method::Get, "/b").await.unwrap(), "root-fallback");
        assert_eq!(tag_of(&router, Method::Get, "/files/report.pdf").await.unwrap(), "files-fallback");
    }

    #[tokio::test]
    async fn unregistered_paths_do_not_resolve() {
        let router = router();
        assert!(router.resolve(Method::Get, "/missing/sub").is_none());
        assert!(router.resolve(Method::Post, "/a").is_none());
        // the root itself has no parent to fall back to
        let mut bare = Router::new();
        bare.register(Method::Get, Route::parent("/"), Tag("root-fallback"));
        assert!(bare.resolve(Method::Get, "/").is_none());
    }

    #[tokio::test]
    async fn query_string_is_stripped_before_lookup() {
        let router = router();
        assert_eq!(tag_of(&router, Method::Get, "/a?version=2").await.unwrap(), "exact-a");
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let router = router();
        assert_eq!(tag_of(&router, Method::Get, "/b").await, tag_of(&router, Method::Get, "/b").await);
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let mut router = router();
        router.register(Method::Get, Route::exact("/a"), Tag("exact-a-v2"));
        assert_eq!(tag_of(&router, Method::Get, "/a").await.unwrap(), "exact-a-v2");
    }
}
