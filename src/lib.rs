//! # lintel
//!
//! Route contexts for an embedded HTTP server: the binding between a
//! protocol and path prefix and everything that serves it.
//!
//! A [`RouteContext`] holds
//!
//! - one **handler**, bound at registration or exactly once afterwards;
//! - a chain of **system filters** lintel installs itself, led by the
//!   authentication filter;
//! - a list of **user filters** the application appends;
//! - an optional **authenticator**, swapped in place without moving the
//!   authentication filter;
//! - an **attribute bag** shared by every exchange on the route.
//!
//! lintel does not accept connections, parse HTTP, or pick which route a
//! request belongs to. The server around it does that, then asks the chosen
//! context for an [`Exchange`] and a [`Chain`] and runs it.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use lintel::{filter, BasicAuthenticator, Chain, Exchange, Response, Server};
//!
//! async fn api(ex: Exchange) -> Response {
//!     let who = ex.principal().map(|p| p.username().to_owned()).unwrap_or_default();
//!     Response::text(format!("hello {who}"))
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let server = Server::bind("127.0.0.1:8080").unwrap();
//! let ctx = server.create_context("http", "/api", api).unwrap();
//!
//! ctx.user_filters().push(filter::from_fn("logging", |ex: Exchange, chain: Chain| async move {
//!     tracing::info!(path = ex.path(), "request");
//!     chain.proceed(ex).await
//! }));
//!
//! let auth = BasicAuthenticator::new("api", |user, pass| user == "ada" && pass == "lovelace").unwrap();
//! ctx.set_authenticator(Some(Arc::new(auth)));
//!
//! // What a server's dispatch loop does for every request matched to `ctx`:
//! let request = http::Request::get("/api/users").body(Bytes::new()).unwrap();
//! let response = ctx.chain().unwrap().proceed(ctx.exchange(request)).await;
//! assert_eq!(response.status_code(), http::StatusCode::UNAUTHORIZED);
//! # }
//! ```

mod attributes;
mod authenticator;
mod context;
mod error;
mod exchange;
mod handler;
mod protocol;
mod response;
mod server;

pub mod filter;

pub use attributes::{AttributeValue, Attributes};
pub use authenticator::{Authenticator, BasicAuthenticator, Outcome, Principal, SharedAuthenticator};
pub use context::RouteContext;
pub use error::{Error, InvalidArgument};
pub use exchange::Exchange;
pub use filter::{BoxedFilter, Chain, Filter, FilterList};
pub use handler::{BoxFuture, BoxedHandler, Handler};
#[doc(hidden)]
pub use handler::ErasedHandler;
pub use protocol::Protocol;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use server::Server;
