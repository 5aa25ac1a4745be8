use thiserror::Error;

/// Error thrown by [`PrivateKeySigner`](crate::PrivateKeySigner).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LocalSignerError {
    /// The supplied bytes do not form a valid `secp256k1` scalar.
    #[error(transparent)]
    Ecdsa(#[from] k256::ecdsa::Error),
    /// The supplied hex string could not be decoded.
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
}
