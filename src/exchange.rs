//! One request as seen by a route's filters and handler.

use std::any::Any;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

use crate::attributes::Attributes;
use crate::authenticator::Principal;

/// An incoming request bound to the route context that will serve it.
///
/// Built by [`RouteContext::exchange`](crate::RouteContext::exchange). It owns
/// the request parts, carries the route's shared [`Attributes`], and picks up a
/// [`Principal`] once the authentication filter accepts it.
#[derive(Debug)]
pub struct Exchange {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    attributes: Attributes,
    principal: Option<Principal>,
}

impl Exchange {
    pub fn new(request: http::Request<Bytes>, attributes: Attributes) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            attributes,
            principal: None,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Header lookup; names are case-insensitive. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The route's shared attribute bag.
    pub fn attributes(&self) -> &Attributes { &self.attributes }

    /// Typed shortcut for `self.attributes().get(key)`.
    pub fn attribute<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.attributes.get(key)
    }

    /// Set by the authentication filter after a successful authentication.
    pub fn principal(&self) -> Option<&Principal> { self.principal.as_ref() }

    pub(crate) fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }
}
