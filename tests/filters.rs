mod common;

use std::sync::Arc;

use http::StatusCode;
use lintel::{filter, BoxFuture, Chain, Exchange, Filter, Response};
use tokio::sync::Notify;

use common::{body, dispatch, get, handler_x, recording, server, Trail};

#[tokio::test]
async fn user_filters_run_in_insertion_order() {
    let server = server();
    let ctx = server.create_context("http", "/ordered", handler_x).unwrap();
    let trail = Trail::default();

    for name in ["F1", "F2", "F3"] {
        ctx.user_filters().push(recording(name, &trail));
    }
    assert_eq!(ctx.user_filters().descriptions(), ["F1", "F2", "F3"]);
    assert_eq!(
        ctx.chain().unwrap().descriptions(),
        ["Authentication filter", "F1", "F2", "F3"],
    );

    let res = dispatch(&ctx, get("/ordered")).await;
    assert_eq!(body(&res), "x");
    assert_eq!(*trail.lock(), ["F1", "F2", "F3"]);
}

struct Wrap(&'static str);

impl Filter for Wrap {
    fn description(&self) -> &str { self.0 }

    fn filter(&self, exchange: Exchange, chain: Chain) -> BoxFuture {
        let tag = self.0;
        Box::pin(async move {
            let inner = chain.proceed(exchange).await;
            Response::text(format!("{tag}({})", std::str::from_utf8(inner.body()).unwrap()))
        })
    }
}

#[tokio::test]
async fn earlier_filters_wrap_later_ones() {
    let server = server();
    let ctx = server.create_context("http", "/wrapped", handler_x).unwrap();
    ctx.user_filters().push(Wrap("outer"));
    ctx.user_filters().push(Wrap("inner"));

    let res = dispatch(&ctx, get("/wrapped")).await;
    assert_eq!(body(&res), "outer(inner(x))");
}

#[tokio::test]
async fn a_filter_can_short_circuit() {
    let server = server();
    let ctx = server.create_context("http", "/blocked", handler_x).unwrap();
    let trail = Trail::default();

    ctx.user_filters().push(filter::from_fn("deny", |_: Exchange, _: Chain| async {
        StatusCode::FORBIDDEN
    }));
    ctx.user_filters().push(recording("never", &trail));

    let res = dispatch(&ctx, get("/blocked")).await;
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    assert!(trail.lock().is_empty());
}

#[tokio::test]
async fn appending_does_not_disturb_an_exchange_in_flight() {
    let server = server();
    let ctx = server.create_context("http", "/live", handler_x).unwrap();
    let trail = Trail::default();

    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    {
        let (entered, release) = (Arc::clone(&entered), Arc::clone(&release));
        ctx.user_filters().push(filter::from_fn("gate", move |ex: Exchange, chain: Chain| {
            let (entered, release) = (Arc::clone(&entered), Arc::clone(&release));
            async move {
                entered.notify_one();
                release.notified().await;
                chain.proceed(ex).await
            }
        }));
    }

    let in_flight = {
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move { dispatch(&ctx, get("/live")).await })
    };
    entered.notified().await;

    ctx.user_filters().push(recording("late", &trail));
    release.notify_one();

    let res = in_flight.await.unwrap();
    assert_eq!(body(&res), "x");
    assert!(trail.lock().is_empty());
    assert_eq!(ctx.user_filters().len(), 2);
}

#[tokio::test]
async fn one_filter_instance_can_serve_many_routes() {
    let server = server();
    let trail = Trail::default();
    let shared: lintel::BoxedFilter = Arc::new(recording("shared", &trail));

    let a = server.create_context("http", "/a", handler_x).unwrap();
    let b = server.create_context("https", "/b", handler_x).unwrap();
    a.user_filters().push_arc(Arc::clone(&shared));
    b.user_filters().push_arc(shared);

    dispatch(&a, get("/a")).await;
    dispatch(&b, get("/b")).await;
    assert_eq!(*trail.lock(), ["shared", "shared"]);
}

#[test]
fn chain_reports_what_is_left() {
    let server = server();
    let ctx = server.create_context("http", "/", handler_x).unwrap();
    let chain = ctx.chain().unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.remaining(), 1);
    assert!(!chain.is_empty());
}
