//! The owning server: registry of route contexts.
//!
//! lintel does not accept connections. `Server` is the piece of an embedded
//! server that owns the route contexts: it creates them, rejects duplicates,
//! hands out snapshots to whatever routes requests, and gives every context a
//! way back to shared server facilities (currently its tracing span).
//!
//! Contexts point back at their server weakly; dropping the last `Arc<Server>`
//! tears the registry down.

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{Span, info, info_span};

use crate::context::RouteContext;
use crate::error::{Error, InvalidArgument};
use crate::handler::{BoxedHandler, Handler};
use crate::protocol::Protocol;

/// An embedded HTTP server's route registry.
pub struct Server {
    addr: SocketAddr,
    contexts: RwLock<Vec<Arc<RouteContext>>>,
    span: Span,
}

impl Server {
    pub fn new(addr: SocketAddr) -> Arc<Self> {
        Arc::new(Self {
            addr,
            contexts: RwLock::new(Vec::new()),
            span: info_span!("server", %addr),
        })
    }

    /// Like [`Server::new`], parsing `addr` as `host:port`.
    ///
    /// ```rust
    /// use lintel::Server;
    /// let server = Server::bind("0.0.0.0:3000").unwrap();
    /// assert_eq!(server.address().port(), 3000);
    /// ```
    pub fn bind(addr: &str) -> Result<Arc<Self>, Error> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| InvalidArgument::Address(addr.to_owned()))?;
        Ok(Self::new(addr))
    }

    pub fn address(&self) -> SocketAddr { self.addr }

    /// Parent span of every route's span.
    pub fn span(&self) -> &Span { &self.span }

    /// Registers a route bound to `handler`.
    ///
    /// ```rust
    /// use lintel::{Exchange, Response, Server};
    ///
    /// async fn users(_: Exchange) -> Response { Response::text("[]") }
    ///
    /// let server = Server::bind("127.0.0.1:8080").unwrap();
    /// let ctx = server.create_context("HTTP", "/users", users).unwrap();
    /// assert_eq!(ctx.protocol().as_str(), "http");
    /// ```
    pub fn create_context(
        self: &Arc<Self>,
        protocol: &str,
        path: &str,
        handler: impl Handler,
    ) -> Result<Arc<RouteContext>, Error> {
        self.register(protocol, path, Some(handler.into_boxed_handler()))
    }

    /// Registers a route whose handler is bound later with
    /// [`RouteContext::set_handler`]. Until then it has no chain to dispatch.
    pub fn create_unbound_context(
        self: &Arc<Self>,
        protocol: &str,
        path: &str,
    ) -> Result<Arc<RouteContext>, Error> {
        self.register(protocol, path, None)
    }

    fn register(
        self: &Arc<Self>,
        protocol: &str,
        path: &str,
        handler: Option<BoxedHandler>,
    ) -> Result<Arc<RouteContext>, Error> {
        let ctx = Arc::new(RouteContext::new(protocol, path, handler, self)?);

        let mut contexts = self.contexts.write();
        if contexts.iter().any(|c| c.protocol() == ctx.protocol() && c.path() == ctx.path()) {
            return Err(Error::DuplicateContext {
                protocol: ctx.protocol(),
                path: ctx.path().to_owned(),
            });
        }
        contexts.push(Arc::clone(&ctx));
        drop(contexts);

        info!(parent: &self.span, protocol = %ctx.protocol(), path = ctx.path(), bound = ctx.is_bound(), "context registered");
        Ok(ctx)
    }

    /// Unregisters the context for exactly this protocol and path.
    /// Exchanges already holding it finish normally.
    pub fn remove_context(&self, protocol: Protocol, path: &str) -> Option<Arc<RouteContext>> {
        let mut contexts = self.contexts.write();
        let index = contexts
            .iter()
            .position(|c| c.protocol() == protocol && c.path() == path)?;
        let ctx = contexts.remove(index);
        drop(contexts);

        info!(parent: &self.span, %protocol, path, "context removed");
        Some(ctx)
    }

    /// Exact lookup; no prefix matching.
    pub fn context(&self, protocol: Protocol, path: &str) -> Option<Arc<RouteContext>> {
        self.contexts
            .read()
            .iter()
            .find(|c| c.protocol() == protocol && c.path() == path)
            .cloned()
    }

    /// Every registered context, in registration order.
    pub fn contexts(&self) -> Vec<Arc<RouteContext>> {
        self.contexts.read().clone()
    }
}
