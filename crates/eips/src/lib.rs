//! Shared EIP types consumed by transaction envelopes: [EIP-2930] access
//! lists, [EIP-7702] authorization lists, and the [EIP-4844] blob sidecar.
//!
//! [EIP-2930]: https://eips.ethereum.org/EIPS/eip-2930
//! [EIP-7702]: https://eips.ethereum.org/EIPS/eip-7702
//! [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844

#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

pub mod eip2930;
pub mod eip4844;
pub mod eip7702;

pub use eip2930::{AccessList, AccessListItem};
pub use eip4844::{
    kzg_to_versioned_hash, Blob, BlobTransactionSidecar, Bytes48, KzgCommitment, KzgProof,
    BYTES_PER_BLOB, BYTES_PER_COMMITMENT, BYTES_PER_PROOF, MAX_BLOBS_PER_TRANSACTION,
    MIN_BLOBS_PER_TRANSACTION, VERSIONED_HASH_VERSION_KZG,
};
pub use eip7702::{Authorization, AuthorizationList, SignedAuthorization};
