//! Route contexts: the binding of a protocol and path prefix to a handler,
//! a filter chain, an authenticator and a shared attribute bag.
//!
//! # Concurrency
//!
//! A [`RouteContext`] is shared as `Arc<RouteContext>` between the server's
//! registry and every task dispatching to it. Each field has its own
//! discipline so readers never need a context-wide lock:
//!
//! | Field | Discipline |
//! |---|---|
//! | protocol, path | immutable after construction |
//! | handler | [`OnceLock`]: one bind wins, readers see all or nothing |
//! | authenticator | atomic swap inside the authentication filter |
//! | user filters | `RwLock`, snapshotted once per exchange |
//! | attributes | sharded concurrent map |
//!
//! # Lifecycle
//!
//! A context is *unbound* until it has a handler and *bound* afterwards. The
//! transition happens once, either at construction or through
//! [`RouteContext::set_handler`], and is never undone.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use bytes::Bytes;
use tracing::{Span, debug, debug_span};

use crate::attributes::Attributes;
use crate::authenticator::SharedAuthenticator;
use crate::error::{Error, InvalidArgument};
use crate::exchange::Exchange;
use crate::filter::auth::AuthFilter;
use crate::filter::{BoxedFilter, Chain, FilterList};
use crate::handler::{BoxedHandler, Handler};
use crate::protocol::Protocol;
use crate::server::Server;

/// One registered route.
///
/// Created through [`Server::create_context`] or
/// [`Server::create_unbound_context`].
pub struct RouteContext {
    protocol: Protocol,
    path: String,
    handler: OnceLock<BoxedHandler>,
    auth: Arc<AuthFilter>,
    // Index 0 is always `auth`.
    system_filters: Vec<BoxedFilter>,
    user_filters: FilterList,
    attributes: Attributes,
    server: Weak<Server>,
    span: Span,
}

impl RouteContext {
    /// Validates the route and installs the authentication filter.
    ///
    /// `path` must be non-empty and start with `/`; `protocol` must be
    /// `http` or `https` in any case. A `None` handler leaves the context
    /// unbound.
    pub(crate) fn new(
        protocol: &str,
        path: &str,
        handler: Option<BoxedHandler>,
        server: &Arc<Server>,
    ) -> Result<Self, Error> {
        if path.is_empty() {
            return Err(InvalidArgument::EmptyPath.into());
        }
        if !path.starts_with('/') {
            return Err(InvalidArgument::RelativePath(path.to_owned()).into());
        }
        let protocol: Protocol = protocol.parse()?;

        let auth = Arc::new(AuthFilter::new(None));
        let auth_filter: BoxedFilter = auth.clone();
        let system_filters = vec![auth_filter];
        let span = debug_span!(parent: server.span(), "route", %protocol, path);

        Ok(Self {
            protocol,
            path: path.to_owned(),
            handler: handler.map_or_else(OnceLock::new, OnceLock::from),
            auth,
            system_filters,
            user_filters: FilterList::new(),
            attributes: Attributes::new(),
            server: Arc::downgrade(server),
            span,
        })
    }

    pub fn protocol(&self) -> Protocol { self.protocol }
    pub fn path(&self) -> &str { &self.path }

    /// The owning server, or `None` once it has been dropped.
    pub fn server(&self) -> Option<Arc<Server>> {
        self.server.upgrade()
    }

    /// Span for events about this route, nested under the server's span.
    pub fn span(&self) -> &Span { &self.span }

    // ── Handler ──────────────────────────────────────────────────────────────

    /// Binds the handler of a context created without one.
    ///
    /// Fails with [`Error::AlreadyBound`] if a handler is already bound, from
    /// construction or an earlier call. The existing binding is kept.
    pub fn set_handler(&self, handler: impl Handler) -> Result<(), Error> {
        self.handler
            .set(handler.into_boxed_handler())
            .map_err(|_| Error::AlreadyBound {
                protocol: self.protocol,
                path: self.path.clone(),
            })?;
        debug!(parent: &self.span, "handler bound");
        Ok(())
    }

    pub fn handler(&self) -> Option<BoxedHandler> {
        self.handler.get().cloned()
    }

    pub fn is_bound(&self) -> bool {
        self.handler.get().is_some()
    }

    // ── Authentication ───────────────────────────────────────────────────────

    /// Replaces the authenticator and returns the previous one.
    ///
    /// `None` turns authentication off: the authentication filter then passes
    /// every exchange through. The filter keeps its place in the chain.
    pub fn set_authenticator(
        &self,
        authenticator: Option<SharedAuthenticator>,
    ) -> Option<SharedAuthenticator> {
        let installed = authenticator.is_some();
        let previous = self.auth.swap(authenticator);
        debug!(parent: &self.span, installed, replaced = previous.is_some(), "authenticator set");
        previous
    }

    pub fn authenticator(&self) -> Option<SharedAuthenticator> {
        self.auth.current()
    }

    // ── Filters ──────────────────────────────────────────────────────────────

    /// The application's filters. Append to install one; they run after
    /// every system filter, in insertion order.
    pub fn user_filters(&self) -> &FilterList { &self.user_filters }

    pub(crate) fn system_filters(&self) -> &[BoxedFilter] { &self.system_filters }

    /// Snapshot of the full pipeline for one exchange: system filters, then
    /// user filters, then the handler. `None` while the context is unbound.
    pub fn chain(&self) -> Option<Chain> {
        let handler = self.handler()?;
        let mut filters = self.system_filters.clone();
        filters.extend(self.user_filters.snapshot());
        Some(Chain::new(filters, handler))
    }

    // ── Per-request state ────────────────────────────────────────────────────

    /// The attribute bag every exchange on this route shares.
    pub fn attributes(&self) -> &Attributes { &self.attributes }

    /// Wraps a request for dispatch on this route, handing it the shared
    /// attribute bag.
    pub fn exchange(&self, request: http::Request<Bytes>) -> Exchange {
        Exchange::new(request, self.attributes.clone())
    }
}

impl fmt::Debug for RouteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteContext")
            .field("protocol", &self.protocol)
            .field("path", &self.path)
            .field("bound", &self.is_bound())
            .field("user_filters", &self.user_filters)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}
