//! Authenticators: the pluggable decision behind a route's authentication filter.
//!
//! An [`Authenticator`] inspects an [`Exchange`] and returns an [`Outcome`]:
//! let it through as some [`Principal`], reject it with a status, or answer
//! with a challenge the client can retry against. A route holds at most one
//! authenticator, set with
//! [`RouteContext::set_authenticator`](crate::RouteContext::set_authenticator).
//!
//! [`BasicAuthenticator`] implements the HTTP Basic scheme (RFC 7617).

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use http::header::{AUTHORIZATION, HeaderValue, WWW_AUTHENTICATE};
use http::StatusCode;

use crate::error::InvalidArgument;
use crate::exchange::Exchange;
use crate::response::Response;

/// Decides whether an exchange may proceed.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(&self, exchange: &Exchange) -> Outcome;
}

/// An authenticator shared between a route and whoever configured it.
pub type SharedAuthenticator = Arc<dyn Authenticator>;

/// The result of [`Authenticator::authenticate`].
#[derive(Debug)]
pub enum Outcome {
    /// Proceed; the principal is attached to the exchange.
    Success(Principal),
    /// Stop with this status and an empty body.
    Failure(StatusCode),
    /// Stop with this response, typically `401` plus a `WWW-Authenticate`
    /// challenge the client can answer.
    Retry(Response),
}

/// An authenticated identity: a user name within a realm.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Principal {
    username: String,
    realm: String,
}

impl Principal {
    pub fn new(username: impl Into<String>, realm: impl Into<String>) -> Self {
        Self { username: username.into(), realm: realm.into() }
    }

    pub fn username(&self) -> &str { &self.username }
    pub fn realm(&self) -> &str { &self.realm }

    /// `realm:username`.
    pub fn name(&self) -> String {
        format!("{}:{}", self.realm, self.username)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.realm, self.username)
    }
}

// ── Basic ─────────────────────────────────────────────────────────────────────

/// HTTP Basic authentication against a credential check.
///
/// ```rust
/// use lintel::BasicAuthenticator;
///
/// let auth = BasicAuthenticator::new("admin", |user, pass| {
///     user == "root" && pass == "hunter2"
/// })
/// .unwrap();
/// assert_eq!(auth.realm(), "admin");
/// ```
pub struct BasicAuthenticator<F> {
    realm: String,
    challenge: HeaderValue,
    check: F,
}

impl<F> BasicAuthenticator<F>
where
    F: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    /// `check(username, password)` returns whether the credentials are valid.
    ///
    /// The realm is quoted into the challenge header, so it may not contain
    /// `"` or control characters.
    pub fn new(realm: impl Into<String>, check: F) -> Result<Self, InvalidArgument> {
        let realm = realm.into();
        if realm.contains('"') {
            return Err(InvalidArgument::Realm(realm));
        }
        let challenge = HeaderValue::from_str(&format!("Basic realm=\"{realm}\""))
            .map_err(|_| InvalidArgument::Realm(realm.clone()))?;
        Ok(Self { realm, challenge, check })
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    fn challenge(&self) -> Outcome {
        Outcome::Retry(
            Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header(WWW_AUTHENTICATE, self.challenge.clone())
                .no_body(),
        )
    }
}

impl<F> Authenticator for BasicAuthenticator<F>
where
    F: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    fn authenticate(&self, exchange: &Exchange) -> Outcome {
        let Some(header) = exchange.headers().get(AUTHORIZATION) else {
            return self.challenge();
        };
        let Some((user, pass)) = header.to_str().ok().and_then(decode_basic) else {
            return Outcome::Failure(StatusCode::UNAUTHORIZED);
        };
        if (self.check)(&user, &pass) {
            Outcome::Success(Principal::new(user, self.realm.clone()))
        } else {
            self.challenge()
        }
    }
}

impl<F> fmt::Debug for BasicAuthenticator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthenticator").field("realm", &self.realm).finish()
    }
}

/// `Basic <base64(user:pass)>` → `(user, pass)`. The scheme name is
/// case-insensitive; the password may itself contain `:`.
fn decode_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_owned(), pass.to_owned()))
}
