//! Errors raised while building, signing, or decoding a transaction.

/// Errors specific to transaction envelope handling, distinct from the
/// lower-level [`brane_rlp::Error`] a malformed wire encoding raises.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The leading type byte did not match any known [`crate::TxType`].
    #[error("unknown transaction type byte {0:#04x}")]
    UnknownType(u8),
    /// An EIP-4844 transaction declared a `to` of `None` (contract creation
    /// is forbidden for blob transactions).
    #[error("EIP-4844 transactions cannot create contracts")]
    Eip4844ContractCreation,
    /// An EIP-4844 transaction's blob count fell outside `[1, 6]`.
    #[error("blob count {0} outside the allowed range 1..=6")]
    InvalidBlobCount(usize),
    /// A typed transaction's envelope `v` was not `0` or `1`.
    #[error("invalid yParity {0} for typed transaction")]
    InvalidYParity(u64),
}
