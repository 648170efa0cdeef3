//! Demo server: an exact route, a parent-path fallback and a POST echo.
//!
//! ```shell
//! cargo run --example server
//! curl -v http://127.0.0.1:9999/index.html
//! curl -v http://127.0.0.1:9999/anything-else
//! curl -v -d 'hello' http://127.0.0.1:9999/echo
//! ```

use std::io;

use nano_http::codec::ok_head;
use nano_http::handler::{handler_fn, BoxFuture, ResponseSink};
use nano_http::protocol::{Method, Request};
use nano_http::router::{Route, Router};
use nano_http::server::Server;
use tokio::io::AsyncWriteExt;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn index<'a>(request: &'a Request, sink: &'a mut ResponseSink) -> BoxFuture<'a, io::Result<()>> {
    static_text(request, sink, "<h1>it works</h1>\n")
}

fn fallback<'a>(request: &'a Request, sink: &'a mut ResponseSink) -> BoxFuture<'a, io::Result<()>> {
    static_text(request, sink, "<p>no such page, but the parent route caught you</p>\n")
}

fn static_text<'a>(
    request: &'a Request,
    sink: &'a mut ResponseSink,
    body: &'static str,
) -> BoxFuture<'a, io::Result<()>> {
    Box::pin(async move {
        let head = ok_head(mime::TEXT_HTML.as_ref(), body.len() as u64, !request.keep_alive());
        sink.write_all(head.as_bytes()).await?;
        sink.write_all(body.as_bytes()).await?;
        sink.flush().await
    })
}

fn echo<'a>(request: &'a Request, sink: &'a mut ResponseSink) -> BoxFuture<'a, io::Result<()>> {
    Box::pin(async move {
        info!(path = request.path(), bytes = request.body().len(), "echoing request body");
        let head = ok_head(
            mime::APPLICATION_OCTET_STREAM.as_ref(),
            request.body().len() as u64,
            !request.keep_alive(),
        );
        sink.write_all(head.as_bytes()).await?;
        sink.write_all(request.body()).await?;
        sink.flush().await
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut router = Router::new();
    router.register(Method::Get, Route::exact("/index.html"), handler_fn(index));
    router.register(Method::Get, Route::parent("/"), handler_fn(fallback));
    router.register(Method::Post, Route::exact("/echo"), handler_fn(echo));

    let server = Server::builder().address("127.0.0.1:9999").router(router).build()?;
    server.start().await?;
    Ok(())
}
