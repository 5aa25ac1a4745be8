//! [EIP-4844] blob transaction types: blobs, commitments, proofs, and the
//! sidecar that bundles them with their versioned hashes.
//!
//! [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844

mod sidecar;
pub use sidecar::BlobTransactionSidecar;
#[cfg(feature = "kzg")]
pub use sidecar::BlobTransactionValidationError;

use brane_primitives::Hash;
use brane_rlp::{decode_str_payload, Decodable, Encodable, Error as RlpError};
use sha2::{Digest, Sha256};

/// Number of bytes in a single blob (4096 field elements of 32 bytes).
pub const BYTES_PER_BLOB: usize = 131_072;
/// Number of bytes in a KZG commitment.
pub const BYTES_PER_COMMITMENT: usize = 48;
/// Number of bytes in a KZG proof.
pub const BYTES_PER_PROOF: usize = 48;
/// The version byte prepended to every blob versioned hash.
pub const VERSIONED_HASH_VERSION_KZG: u8 = 0x01;
/// Minimum and maximum number of blobs a single transaction may carry.
pub const MIN_BLOBS_PER_TRANSACTION: usize = 1;
/// Maximum number of blobs a single transaction may carry.
pub const MAX_BLOBS_PER_TRANSACTION: usize = 6;

/// A single blob: the raw field-element data submitted alongside a blob
/// transaction. Transmitted out-of-band from the transaction itself; only
/// its versioned hash is referenced on-chain.
#[derive(Clone, Eq, PartialEq)]
pub struct Blob(Box<[u8; BYTES_PER_BLOB]>);

impl Blob {
    /// Wraps raw blob bytes without validating field-element encoding;
    /// that check happens during KZG commitment verification.
    pub fn new(bytes: [u8; BYTES_PER_BLOB]) -> Self {
        Self(Box::new(bytes))
    }

    /// The raw blob bytes.
    pub fn as_bytes(&self) -> &[u8; BYTES_PER_BLOB] {
        &self.0
    }
}

impl std::fmt::Debug for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Blob").field(&format!("{} bytes", BYTES_PER_BLOB)).finish()
    }
}

impl Default for Blob {
    fn default() -> Self {
        Self::new([0u8; BYTES_PER_BLOB])
    }
}

impl Encodable for Blob {
    fn encode(&self, out: &mut Vec<u8>) {
        brane_rlp::Header {
            list: false,
            payload_length: BYTES_PER_BLOB,
        }
        .encode(out);
        out.extend_from_slice(self.0.as_slice());
    }

    fn length(&self) -> usize {
        brane_rlp::Header {
            list: false,
            payload_length: BYTES_PER_BLOB,
        }
        .length()
            + BYTES_PER_BLOB
    }
}

impl Decodable for Blob {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        let payload = decode_str_payload(buf)?;
        let bytes: [u8; BYTES_PER_BLOB] = payload.try_into().map_err(|_| {
            RlpError::UnexpectedLength {
                expected: BYTES_PER_BLOB,
                actual: payload.len(),
            }
        })?;
        Ok(Self::new(bytes))
    }
}

/// A fixed 48-byte value: either a KZG commitment or a KZG proof.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Bytes48(pub [u8; BYTES_PER_COMMITMENT]);

impl Bytes48 {
    /// Wraps raw 48-byte commitment or proof bytes.
    pub const fn new(bytes: [u8; BYTES_PER_COMMITMENT]) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    pub const fn as_bytes(&self) -> &[u8; BYTES_PER_COMMITMENT] {
        &self.0
    }
}

impl Encodable for Bytes48 {
    fn encode(&self, out: &mut Vec<u8>) {
        brane_rlp::Header {
            list: false,
            payload_length: BYTES_PER_COMMITMENT,
        }
        .encode(out);
        out.extend_from_slice(&self.0);
    }

    fn length(&self) -> usize {
        brane_rlp::Header {
            list: false,
            payload_length: BYTES_PER_COMMITMENT,
        }
        .length()
            + BYTES_PER_COMMITMENT
    }
}

impl Decodable for Bytes48 {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        let payload = decode_str_payload(buf)?;
        let bytes: [u8; BYTES_PER_COMMITMENT] = payload.try_into().map_err(|_| {
            RlpError::UnexpectedLength {
                expected: BYTES_PER_COMMITMENT,
                actual: payload.len(),
            }
        })?;
        Ok(Self::new(bytes))
    }
}

/// A [`Bytes48`] used specifically as a KZG commitment.
pub type KzgCommitment = Bytes48;
/// A [`Bytes48`] used specifically as a KZG proof.
pub type KzgProof = Bytes48;

/// Derives the versioned hash of a KZG commitment: the version byte
/// [`VERSIONED_HASH_VERSION_KZG`] followed by the last 31 bytes of the
/// commitment's SHA-256 hash.
pub fn kzg_to_versioned_hash(commitment: &KzgCommitment) -> Hash {
    let mut hash = Sha256::digest(commitment.as_bytes());
    hash[0] = VERSIONED_HASH_VERSION_KZG;
    Hash::new(hash.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versioned_hash_has_version_byte() {
        let commitment = KzgCommitment::new([0x42u8; BYTES_PER_COMMITMENT]);
        let hash = kzg_to_versioned_hash(&commitment);
        assert!(hash.has_version(VERSIONED_HASH_VERSION_KZG));
    }

    #[test]
    fn versioned_hash_is_deterministic() {
        let commitment = KzgCommitment::new([0x07u8; BYTES_PER_COMMITMENT]);
        assert_eq!(
            kzg_to_versioned_hash(&commitment),
            kzg_to_versioned_hash(&commitment)
        );
    }
}
