use brane_json_rpc::{ErrorPayload, Id, RpcError};
use serde_json::value::RawValue;
use std::error::Error as StdError;
use thiserror::Error;

/// A transport error is an [`RpcError`] wrapping a [`TransportErrorKind`].
pub type TransportError<ErrResp = Box<RawValue>> = RpcError<TransportErrorKind, ErrResp>;

/// A transport result. This is a plain [`Result`], not [`brane_json_rpc::RpcResult`]'s
/// success/failure/err three-way split — `tower::Service::Future`'s `Output`
/// must be a standard `Result` for `?`/combinators to work, and the
/// three-way split (did the server answer at all vs. did it answer with an
/// error) belongs one layer up, at `brane-rpc-client`, where a single RPC
/// call's outcome is more than "did the transport succeed".
pub type TransportResult<T, ErrResp = Box<RawValue>> = Result<T, TransportError<ErrResp>>;

/// The transport-level error layer from spec.md §4.13: faults below the
/// JSON-RPC application layer, raised by `brane-transport-http`,
/// `brane-pubsub`, and the retry wrapper in this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportErrorKind {
    /// A batch request's response array was missing an entry for this id.
    #[error("missing response for request with id {0}")]
    MissingBatchResponse(Id),

    /// The node returned a non-2xx HTTP status (C12).
    #[error("http error {code}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        code: u16,
        /// The response body.
        body: String,
    },

    /// A persistent transport's connection dropped; every pending request
    /// in the correlation table fails with this (C13's `RECONNECTING`
    /// entry).
    #[error("connection lost")]
    ConnectionLost,

    /// A submission's deadline elapsed before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// The outbound buffer is not writable and the submission's
    /// backpressure deadline elapsed.
    #[error("transport backpressure: submission deadline elapsed")]
    Backpressure,

    /// The transport has been closed (C13 `CLOSED` state); terminal.
    #[error("transport is closed")]
    Closed,

    /// The persistent connection is gone and no reconnect is in flight.
    #[error("backend connection task has stopped")]
    BackendGone,

    /// Subscriptions are not available on this transport.
    #[error("subscriptions are not available on this transport")]
    PubsubUnavailable,

    /// Custom, transport-specific error.
    #[error("{0}")]
    Custom(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl TransportErrorKind {
    /// `true` if a retry wrapper should consider this fault transient
    /// (C14's transient/terminal classification).
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionLost
                | Self::Timeout
                | Self::Backpressure
                | Self::BackendGone
                | Self::MissingBatchResponse(_)
        ) || matches!(self, Self::HttpStatus { code, .. } if *code >= 500)
    }

    /// Builds a [`TransportErrorKind::Custom`] from a string.
    pub fn custom_str(err: &str) -> TransportError {
        RpcError::Transport(Self::Custom(err.into()))
    }

    /// Builds a [`TransportErrorKind::Custom`] from an error value.
    pub fn custom(err: impl StdError + Send + Sync + 'static) -> TransportError {
        RpcError::Transport(Self::Custom(Box::new(err)))
    }

    /// Builds a [`TransportErrorKind::MissingBatchResponse`].
    pub const fn missing_batch_response(id: Id) -> TransportError {
        RpcError::Transport(Self::MissingBatchResponse(id))
    }

    /// Builds a [`TransportErrorKind::HttpStatus`].
    pub const fn http_status(code: u16, body: String) -> TransportError {
        RpcError::Transport(Self::HttpStatus { code, body })
    }

    /// Builds a [`TransportErrorKind::ConnectionLost`].
    pub const fn connection_lost() -> TransportError {
        RpcError::Transport(Self::ConnectionLost)
    }

    /// Builds a [`TransportErrorKind::Timeout`].
    pub const fn timeout() -> TransportError {
        RpcError::Transport(Self::Timeout)
    }

    /// Builds a [`TransportErrorKind::Backpressure`].
    pub const fn backpressure() -> TransportError {
        RpcError::Transport(Self::Backpressure)
    }

    /// Builds a [`TransportErrorKind::Closed`].
    pub const fn closed() -> TransportError {
        RpcError::Transport(Self::Closed)
    }

    /// Builds a [`TransportErrorKind::BackendGone`].
    pub const fn backend_gone() -> TransportError {
        RpcError::Transport(Self::BackendGone)
    }

    /// Builds a [`TransportErrorKind::PubsubUnavailable`].
    pub const fn pubsub_unavailable() -> TransportError {
        RpcError::Transport(Self::PubsubUnavailable)
    }
}

/// `true` if a JSON-RPC error response's code names a transient,
/// retry-worthy node condition ("busy" / "rate limited" / "not ready"),
/// per spec.md §4.10. Deliberately conservative: specific named codes plus
/// a substring match on the message, not the teacher's provider-specific
/// heuristics (Alchemy/Infura/QuickNode code numbers), since those are
/// provider quirks this crate no longer targets.
pub fn is_transient_rpc_error<ErrData>(err: &ErrorPayload<ErrData>) -> bool {
    const TRANSIENT_CODES: &[i64] = &[-32000, -32005, -32603];
    if TRANSIENT_CODES.contains(&err.code) {
        return true;
    }
    let msg = err.message.to_ascii_lowercase();
    msg.contains("rate limit")
        || msg.contains("too many requests")
        || msg.contains("busy")
        || msg.contains("not ready")
        || msg.contains("try again")
}
