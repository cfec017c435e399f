//! Request/response filters and the chain that runs them.
//!
//! A filter sees an [`Exchange`] before the route's handler does. It may
//! short-circuit with its own [`Response`](crate::Response), or hand the
//! exchange on by calling [`Chain::proceed`] and post-process the result.
//!
//! Each route carries two filter lists:
//!
//! - **system filters**, installed by lintel itself and never visible to
//!   application code. The authentication filter is always first.
//! - **user filters**, appended by the application through
//!   [`RouteContext::user_filters`](crate::RouteContext::user_filters).
//!
//! The dispatch order for one exchange is every system filter, then every user
//! filter, then the handler. Each filter wraps the ones after it.

pub(crate) mod auth;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::exchange::Exchange;
use crate::handler::{BoxFuture, BoxedHandler};
use crate::response::IntoResponse;

/// A request/response interceptor attached to a route.
///
/// ```rust
/// use lintel::{BoxFuture, Chain, Exchange, Filter};
///
/// struct Timing;
///
/// impl Filter for Timing {
///     fn description(&self) -> &str { "request timing" }
///
///     fn filter(&self, exchange: Exchange, chain: Chain) -> BoxFuture {
///         Box::pin(async move {
///             let started = std::time::Instant::now();
///             let res = chain.proceed(exchange).await;
///             tracing::debug!(elapsed = ?started.elapsed(), "request finished");
///             res
///         })
///     }
/// }
/// ```
pub trait Filter: Send + Sync + 'static {
    /// Short human-readable name, used in logs and introspection.
    fn description(&self) -> &str;

    /// Handles one exchange. Call `chain.proceed(exchange)` at most once to
    /// continue; return a response without calling it to short-circuit.
    fn filter(&self, exchange: Exchange, chain: Chain) -> BoxFuture;
}

/// A filter shared between a route and every in-flight chain built from it.
pub type BoxedFilter = Arc<dyn Filter>;

// ── Chain ─────────────────────────────────────────────────────────────────────

/// The remainder of a route's pipeline, as seen from inside a filter.
///
/// A chain owns a snapshot of the filters it was built from, so appending a
/// filter to a route never changes the order of an exchange already in flight.
#[derive(Clone)]
pub struct Chain {
    filters: Arc<[BoxedFilter]>,
    next: usize,
    handler: BoxedHandler,
}

impl Chain {
    pub(crate) fn new(filters: Vec<BoxedFilter>, handler: BoxedHandler) -> Self {
        Self { filters: filters.into(), next: 0, handler }
    }

    /// Runs the next filter, or the handler once every filter has run.
    pub fn proceed(self, exchange: Exchange) -> BoxFuture {
        match self.filters.get(self.next) {
            Some(filter) => {
                let filter = Arc::clone(filter);
                let rest = Self { next: self.next + 1, ..self };
                filter.filter(exchange, rest)
            }
            None => self.handler.call(exchange),
        }
    }

    /// Filters left to run before the handler.
    pub fn remaining(&self) -> usize {
        self.filters.len() - self.next
    }

    /// Total filters in the snapshot.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Descriptions of every filter in dispatch order.
    pub fn descriptions(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.description().to_owned()).collect()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("filters", &self.descriptions())
            .field("next", &self.next)
            .finish()
    }
}

// ── FilterList ────────────────────────────────────────────────────────────────

/// The application's filters for one route, in dispatch order.
///
/// Append-only: there is no remove or reorder. Order is insertion order.
/// Appends take a write lock; dispatch takes a [`snapshot`](Self::snapshot)
/// under the read lock once per exchange.
#[derive(Default)]
pub struct FilterList {
    inner: RwLock<Vec<BoxedFilter>>,
}

impl FilterList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends `filter` after every filter already present.
    pub fn push(&self, filter: impl Filter) {
        self.push_arc(Arc::new(filter));
    }

    /// Appends an already shared filter, e.g. one reused across routes.
    pub fn push_arc(&self, filter: BoxedFilter) {
        tracing::debug!(filter = filter.description(), "user filter appended");
        self.inner.write().push(filter);
    }

    /// Copy of the current list; later appends do not affect it.
    pub fn snapshot(&self) -> Vec<BoxedFilter> {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.inner.read().iter().map(|f| f.description().to_owned()).collect()
    }
}

impl fmt::Debug for FilterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.descriptions()).finish()
    }
}

// ── Closure filters ───────────────────────────────────────────────────────────

/// Builds a [`Filter`] from an async closure.
///
/// ```rust
/// use lintel::{filter, Chain, Exchange};
///
/// let logging = filter::from_fn("logging", |ex: Exchange, chain: Chain| async move {
///     tracing::info!(path = ex.path(), "request");
///     chain.proceed(ex).await
/// });
/// ```
pub fn from_fn<F, Fut, R>(description: impl Into<String>, f: F) -> FnFilter<F>
where
    F: Fn(Exchange, Chain) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    FnFilter { description: description.into(), f }
}

/// A closure-backed filter. See [`from_fn`].
pub struct FnFilter<F> {
    description: String,
    f: F,
}

impl<F, Fut, R> Filter for FnFilter<F>
where
    F: Fn(Exchange, Chain) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn description(&self) -> &str {
        &self.description
    }

    fn filter(&self, exchange: Exchange, chain: Chain) -> BoxFuture {
        let fut = (self.f)(exchange, chain);
        Box::pin(async move { fut.await.into_response() })
    }
}
