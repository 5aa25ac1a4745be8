//! Error layering for the provider facade.
//!
//! `brane_provider::Error` wraps `brane_rpc_client::Error`, which wraps
//! `brane_transport::TransportError`, which wraps `brane_json_rpc::RpcError`
//! — each layer adds the failures meaningful at its level without
//! re-describing the ones below it.

use brane_primitives::Hash;

/// Errors the provider facade can return.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The underlying RPC client (transport, serialization, server error
    /// response) failed.
    #[error(transparent)]
    RpcClient(#[from] brane_rpc_client::Error),

    /// Signing the transaction failed.
    #[error(transparent)]
    Signer(#[from] brane_signer::Error),

    /// ABI-encoding a multicall batch, or decoding its result, failed.
    #[error(transparent)]
    Abi(#[from] brane_dyn_abi::AbiError),

    /// A [`GasStrategy`](crate::GasStrategy) could not produce fee values and
    /// its policy was [`FallbackPolicy::Throw`](crate::FallbackPolicy::Throw).
    #[error("no base fee available for EIP-1559 pricing, and the fallback policy is `throw`")]
    NoBaseFee,

    /// A read the provider needed to fill a transaction (nonce, chain id,
    /// ...) returned nothing.
    #[error("RPC call `{0}` returned a null result")]
    NullResponse(&'static str),

    /// `send_transaction_and_wait` polled past its timeout without seeing a
    /// receipt for `tx_hash`.
    #[error("timed out waiting for a receipt for transaction {tx_hash}")]
    TransactionTimeout {
        /// The transaction hash being waited on.
        tx_hash: Hash,
    },

    /// A capability the current provider handle does not have was invoked
    /// (e.g. a `Tester` op on a provider that isn't wrapped in
    /// [`TesterProvider`](crate::TesterProvider)).
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
