use crate::ErrorPayload;
use brane_primitives::Hash;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

/// An error encountered while issuing a JSON-RPC request.
///
/// Generic over `E`, the underlying transport's own error type, and
/// `ErrResp`, the shape the node's error `data` field deserializes to
/// (defaults to an un-interpreted [`RawValue`]).
#[derive(Debug, thiserror::Error)]
pub enum RpcError<E, ErrResp = Box<RawValue>> {
    /// The server returned an error response.
    #[error("server returned an error response: {0}")]
    ErrorResp(ErrorPayload<ErrResp>),

    /// The server returned a null response where a value was expected.
    #[error("server returned a null response when a non-null response was expected")]
    NullResp,

    /// The server does not support a feature the request required.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(&'static str),

    /// A local pre-processing step failed (e.g. a signer or a request
    /// filler), so the request was never sent.
    #[error("local usage error: {0}")]
    LocalUsageError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A request failed to serialize.
    #[error("serialization error: {0}")]
    SerError(#[source] serde_json::Error),

    /// A response failed to deserialize.
    #[error("deserialization error: {err}\n{text}")]
    DeserError {
        /// The underlying error.
        #[source]
        err: serde_json::Error,
        /// The text that failed to deserialize.
        text: String,
    },

    /// The transport itself failed.
    #[error(transparent)]
    Transport(#[from] E),
}

impl<E, ErrResp> RpcError<E, ErrResp>
where
    ErrResp: DeserializeOwned,
{
    /// Builds a new [`RpcError::ErrorResp`].
    pub const fn err_resp(err: ErrorPayload<ErrResp>) -> Self {
        Self::ErrorResp(err)
    }

    /// Builds a new [`RpcError::LocalUsageError`] from an arbitrary error.
    pub fn local_usage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::LocalUsageError(Box::new(err))
    }

    /// Builds a new [`RpcError::LocalUsageError`] from a message.
    pub fn local_usage_str(err: &str) -> Self {
        Self::LocalUsageError(err.into())
    }

    /// Builds a [`RpcError::DeserError`] from a deserialization failure,
    /// first checking whether `text` actually decodes as an
    /// [`ErrorPayload`] (a node that failed mid-response can still have
    /// sent a well-formed error object).
    pub fn deser_err(err: serde_json::Error, text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        if let Ok(err) = serde_json::from_str::<ErrorPayload<ErrResp>>(text) {
            return Self::ErrorResp(err);
        }
        Self::DeserError { err, text: text.to_owned() }
    }
}

impl<E, ErrResp> RpcError<E, ErrResp> {
    /// Builds a new [`RpcError::SerError`].
    pub const fn ser_err(err: serde_json::Error) -> Self {
        Self::SerError(err)
    }

    /// `true` for [`RpcError::SerError`].
    pub const fn is_ser_error(&self) -> bool {
        matches!(self, Self::SerError(_))
    }

    /// `true` for [`RpcError::DeserError`].
    pub const fn is_deser_error(&self) -> bool {
        matches!(self, Self::DeserError { .. })
    }

    /// `true` for [`RpcError::Transport`].
    pub const fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// `true` for [`RpcError::ErrorResp`].
    pub const fn is_error_resp(&self) -> bool {
        matches!(self, Self::ErrorResp(_))
    }

    /// `true` for [`RpcError::NullResp`].
    pub const fn is_null_resp(&self) -> bool {
        matches!(self, Self::NullResp)
    }

    /// Fallible conversion to the error response.
    pub const fn as_error_resp(&self) -> Option<&ErrorPayload<ErrResp>> {
        match self {
            Self::ErrorResp(err) => Some(err),
            _ => None,
        }
    }

    /// Fallible conversion to the transport error.
    pub const fn as_transport_err(&self) -> Option<&E> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl<E> RpcError<E, Box<RawValue>> {
    fn parse_data<T: std::str::FromStr>(&self) -> Option<T> {
        let data = self.as_error_resp()?.data.as_ref()?;
        data.get().trim_matches('"').trim().parse().ok()
    }

    /// Extracts a transaction hash from the error data field, for nodes
    /// that report the hash of a transaction that failed after being
    /// accepted into the mempool.
    pub fn tx_hash_data(&self) -> Option<Hash> {
        self.parse_data()
    }
}
