#![allow(dead_code)]

use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use lintel::{filter, Chain, Exchange, Filter, Response, RouteContext, Server};
use parking_lot::Mutex;

pub type Trail = Arc<Mutex<Vec<&'static str>>>;

pub fn server() -> Arc<Server> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
    Server::bind("127.0.0.1:0").unwrap()
}

pub fn get(path: &str) -> http::Request<Bytes> {
    http::Request::get(path).body(Bytes::new()).unwrap()
}

pub fn get_with_basic(path: &str, user: &str, pass: &str) -> http::Request<Bytes> {
    let credentials = general_purpose::STANDARD.encode(format!("{user}:{pass}"));
    http::Request::get(path)
        .header(http::header::AUTHORIZATION, format!("Basic {credentials}"))
        .body(Bytes::new())
        .unwrap()
}

/// What a server's dispatch loop does once it has picked `ctx`.
pub async fn dispatch(ctx: &RouteContext, request: http::Request<Bytes>) -> Response {
    let chain = ctx.chain().expect("context has a handler");
    chain.proceed(ctx.exchange(request)).await
}

pub fn body(res: &Response) -> &str {
    std::str::from_utf8(res.body()).unwrap()
}

/// A filter that records its name on the way in and passes the exchange on.
pub fn recording(name: &'static str, trail: &Trail) -> impl Filter + use<> {
    let trail = Arc::clone(trail);
    filter::from_fn(name, move |ex: Exchange, chain: Chain| {
        trail.lock().push(name);
        chain.proceed(ex)
    })
}

pub async fn handler_x(_: Exchange) -> Response {
    Response::text("x")
}

pub async fn handler_y(_: Exchange) -> Response {
    Response::text("y")
}
