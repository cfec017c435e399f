//! Unified error type.

use crate::protocol::Protocol;

/// The error type returned by lintel's fallible operations.
///
/// Every variant is a synchronous rejection: either malformed input or an
/// illegal state transition. Nothing here is transient, so nothing here is
/// worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// A handler was bound a second time.
    #[error("handler already bound for {protocol} context `{path}`")]
    AlreadyBound { protocol: Protocol, path: String },

    /// The server already holds a context for this protocol and path.
    #[error("{protocol} context `{path}` is already registered")]
    DuplicateContext { protocol: Protocol, path: String },
}

/// Which input constraint was violated.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvalidArgument {
    #[error("protocol `{0}` is neither http nor https")]
    Protocol(String),

    #[error("path is empty")]
    EmptyPath,

    #[error("path `{0}` does not start with `/`")]
    RelativePath(String),

    #[error("realm `{0}` contains a quote or control character")]
    Realm(String),

    #[error("`{0}` is not a valid socket address")]
    Address(String),
}
