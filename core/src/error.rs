//! Error types for request building and dispatch.
//!
//! # Design
//! Construction-time failures (`InvalidTarget`, `InvalidHeader`) are always
//! returned to the caller. `Transport` and `AsyncSubmission` are what the
//! `try_send_*` methods report; the plain `send_*` methods log them and hand
//! back `None` instead. `Aborted` only ever comes out of a `PendingResponse`.

use thiserror::Error;
use ureq::http::uri::InvalidUri;

/// Why a target was rejected.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error(transparent)]
    Malformed(#[from] InvalidUri),

    #[error("scheme must be http or https")]
    UnsupportedScheme,

    #[error("missing host")]
    MissingAuthority,
}

/// Errors produced by `HttpApi`.
#[derive(Debug, Error)]
pub enum HttpApiError {
    /// The target is not an absolute `http` or `https` URI.
    #[error("invalid target {target:?}: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: TargetError,
    },

    /// A header name or value is not valid on the wire.
    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },

    /// Connection, I/O, timeout or protocol failure while sending.
    #[error("request to {uri} failed: {source}")]
    Transport {
        uri: String,
        #[source]
        source: ureq::Error,
    },

    /// There was no async runtime to schedule the request on.
    #[error("no async runtime available to schedule request to {uri}")]
    AsyncSubmission { uri: String },

    /// The deferred request panicked or was cancelled before completing.
    #[error("request to {uri} was aborted before completing")]
    Aborted { uri: String },
}

impl HttpApiError {
    /// The target URI this error relates to, when there is one.
    pub fn uri(&self) -> Option<&str> {
        match self {
            HttpApiError::InvalidTarget { target, .. } => Some(target),
            HttpApiError::InvalidHeader { .. } => None,
            HttpApiError::Transport { uri, .. }
            | HttpApiError::AsyncSubmission { uri }
            | HttpApiError::Aborted { uri } => Some(uri),
        }
    }
}
