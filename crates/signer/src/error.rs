use k256::ecdsa;
use thiserror::Error;

/// Result type alias for [`Error`](enum@Error).
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Generic error type for [`Signer`](crate::Signer) implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// This operation is not supported by the signer.
    #[error("operation `{0}` is not supported by the signer")]
    UnsupportedOperation(UnsupportedSignerOperation),
    /// Mismatch between a transaction's chain ID and the signer's chain ID.
    #[error("transaction chain ID ({tx}) does not match the signer's ({signer})")]
    ChainIdMismatch {
        /// The signer's chain ID.
        signer: u64,
        /// The chain ID carried by the transaction.
        tx: u64,
    },
    /// Underlying ECDSA error (invalid scalar, failed recovery, ...).
    #[error(transparent)]
    Ecdsa(#[from] ecdsa::Error),
    /// Generic error, for signer backends (hardware, remote) with their
    /// own error type.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Constructs an [`Error::Other`] from any boxable error.
    #[cold]
    pub fn other(error: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Other(error.into())
    }

    /// `true` if this is [`Error::UnsupportedOperation`].
    #[inline]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation(_))
    }
}

/// A signer capability that a given backend cannot provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnsupportedSignerOperation {
    /// `sign_hash` is not supported.
    SignHash,
    /// `sign_message` is not supported.
    SignMessage,
    /// `sign_transaction` is not supported.
    SignTransaction,
}

impl std::fmt::Display for UnsupportedSignerOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::SignHash => "sign_hash",
            Self::SignMessage => "sign_message",
            Self::SignTransaction => "sign_transaction",
        })
    }
}
