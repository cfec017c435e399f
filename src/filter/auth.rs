//! The synthetic authentication filter every route carries.
//!
//! The filter object is created once, with the route, and installed as the
//! first system filter. Changing a route's authenticator swaps the delegate
//! inside this filter; the filter itself never leaves its slot, so its
//! position relative to other system filters is fixed.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::debug;

use crate::authenticator::{Outcome, SharedAuthenticator};
use crate::exchange::Exchange;
use crate::filter::{Chain, Filter};
use crate::handler::BoxFuture;
use crate::response::Response;

/// Delegates each exchange to the route's current authenticator, or passes it
/// straight through when none is set.
pub(crate) struct AuthFilter {
    // `ArcSwapOption` cannot hold an unsized `dyn` directly, hence the
    // second `Arc`.
    delegate: ArcSwapOption<SharedAuthenticator>,
}

impl AuthFilter {
    pub(crate) fn new(delegate: Option<SharedAuthenticator>) -> Self {
        Self { delegate: ArcSwapOption::new(delegate.map(Arc::new)) }
    }

    /// Installs `next` and returns the authenticator it replaced, in one
    /// atomic step. Exchanges in flight see either the old or the new one.
    pub(crate) fn swap(&self, next: Option<SharedAuthenticator>) -> Option<SharedAuthenticator> {
        self.delegate
            .swap(next.map(Arc::new))
            .map(|previous| Arc::clone(&*previous))
    }

    pub(crate) fn current(&self) -> Option<SharedAuthenticator> {
        self.delegate.load_full().map(|current| Arc::clone(&*current))
    }
}

impl Filter for AuthFilter {
    fn description(&self) -> &str {
        "Authentication filter"
    }

    fn filter(&self, mut exchange: Exchange, chain: Chain) -> BoxFuture {
        // One load per exchange: a concurrent swap cannot change the decision
        // half-way through.
        let Some(authenticator) = self.current() else {
            return chain.proceed(exchange);
        };

        match authenticator.authenticate(&exchange) {
            Outcome::Success(principal) => {
                debug!(principal = %principal, path = exchange.path(), "authenticated");
                exchange.set_principal(principal);
                chain.proceed(exchange)
            }
            Outcome::Failure(status) => {
                debug!(%status, path = exchange.path(), "authentication failed");
                Box::pin(async move { Response::status(status) })
            }
            Outcome::Retry(challenge) => {
                debug!(status = %challenge.status_code(), path = exchange.path(), "authentication challenged");
                Box::pin(async move { challenge })
            }
        }
    }
}
