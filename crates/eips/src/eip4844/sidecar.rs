use brane_primitives::Hash;
use brane_rlp::{Decodable, Encodable, Error as RlpError};

use super::{kzg_to_versioned_hash, Blob, Bytes48, BYTES_PER_BLOB, BYTES_PER_COMMITMENT, BYTES_PER_PROOF};

/// A set of blobs and their corresponding commitments and proofs, carried
/// alongside (not inside) a signed EIP-4844 transaction's wire form.
///
/// Encodes and decodes its three fields without an RLP list header of its
/// own, matching the network wrapper's `[[tx_fields], blobs, commitments,
/// proofs]` shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlobTransactionSidecar {
    /// The blob data.
    pub blobs: Vec<Blob>,
    /// The blob commitments.
    pub commitments: Vec<Bytes48>,
    /// The blob proofs.
    pub proofs: Vec<Bytes48>,
}

impl BlobTransactionSidecar {
    /// Builds a sidecar from a set of blobs, commitments, and proofs. Does
    /// not itself check that the counts match or fall in `[1, 6]`; callers
    /// do that at the transaction-construction boundary.
    pub fn new(blobs: Vec<Blob>, commitments: Vec<Bytes48>, proofs: Vec<Bytes48>) -> Self {
        Self {
            blobs,
            commitments,
            proofs,
        }
    }

    /// Verifies that `blob_versioned_hashes` matches this sidecar's
    /// commitments, and that every blob KZG-verifies against its
    /// commitment and proof.
    #[cfg(feature = "kzg")]
    pub fn validate(
        &self,
        blob_versioned_hashes: &[Hash],
        settings: &c_kzg::KzgSettings,
    ) -> Result<(), BlobTransactionValidationError> {
        if blob_versioned_hashes.len() != self.commitments.len() {
            return Err(BlobTransactionValidationError::LengthMismatch {
                versioned_hashes: blob_versioned_hashes.len(),
                commitments: self.commitments.len(),
            });
        }

        for (versioned_hash, commitment) in blob_versioned_hashes.iter().zip(&self.commitments) {
            let calculated = kzg_to_versioned_hash(commitment);
            if *versioned_hash != calculated {
                return Err(BlobTransactionValidationError::WrongVersionedHash {
                    have: versioned_hash.clone(),
                    expected: calculated,
                });
            }
        }

        let c_kzg_blobs: Vec<c_kzg::Blob> = self
            .blobs
            .iter()
            .map(|blob| c_kzg::Blob::from_bytes(blob.as_bytes().as_slice()))
            .collect::<Result<_, _>>()
            .map_err(BlobTransactionValidationError::Kzg)?;
        let c_kzg_commitments: Vec<c_kzg::Bytes48> = self
            .commitments
            .iter()
            .map(|c| c_kzg::Bytes48::from_bytes(c.as_bytes().as_slice()))
            .collect::<Result<_, _>>()
            .map_err(BlobTransactionValidationError::Kzg)?;
        let c_kzg_proofs: Vec<c_kzg::Bytes48> = self
            .proofs
            .iter()
            .map(|p| c_kzg::Bytes48::from_bytes(p.as_bytes().as_slice()))
            .collect::<Result<_, _>>()
            .map_err(BlobTransactionValidationError::Kzg)?;

        let valid = c_kzg::KzgProof::verify_blob_kzg_proof_batch(
            &c_kzg_blobs,
            &c_kzg_commitments,
            &c_kzg_proofs,
            settings,
        )
        .map_err(BlobTransactionValidationError::Kzg)?;

        if valid {
            Ok(())
        } else {
            Err(BlobTransactionValidationError::InvalidProof)
        }
    }

    /// Versioned hash for each commitment, in order.
    pub fn versioned_hashes(&self) -> impl Iterator<Item = Hash> + '_ {
        self.commitments.iter().map(kzg_to_versioned_hash)
    }

    /// The versioned hash for the blob at `index`, if present.
    pub fn versioned_hash_for_blob(&self, index: usize) -> Option<Hash> {
        self.commitments.get(index).map(kzg_to_versioned_hash)
    }

    /// A heuristic for this sidecar's in-memory size.
    pub fn size(&self) -> usize {
        self.blobs.len() * BYTES_PER_BLOB
            + self.commitments.len() * BYTES_PER_COMMITMENT
            + self.proofs.len() * BYTES_PER_PROOF
    }
}

impl Encodable for BlobTransactionSidecar {
    fn encode(&self, out: &mut Vec<u8>) {
        self.blobs.encode(out);
        self.commitments.encode(out);
        self.proofs.encode(out);
    }

    fn length(&self) -> usize {
        self.blobs.length() + self.commitments.length() + self.proofs.length()
    }
}

impl Decodable for BlobTransactionSidecar {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        Ok(Self {
            blobs: Decodable::decode(buf)?,
            commitments: Decodable::decode(buf)?,
            proofs: Decodable::decode(buf)?,
        })
    }
}

/// Errors from [`BlobTransactionSidecar::validate`].
#[derive(Debug, thiserror::Error)]
#[cfg(feature = "kzg")]
pub enum BlobTransactionValidationError {
    /// A blob's KZG proof failed to verify, or a versioned hash did not
    /// match its commitment.
    #[error("invalid KZG proof")]
    InvalidProof,
    /// An error surfaced directly from `c-kzg`.
    #[error("KZG error: {0}")]
    Kzg(c_kzg::Error),
    /// The number of versioned hashes did not match the number of
    /// commitments.
    #[error("{versioned_hashes} versioned hashes but {commitments} commitments")]
    LengthMismatch {
        /// Number of versioned hashes supplied.
        versioned_hashes: usize,
        /// Number of commitments in the sidecar.
        commitments: usize,
    },
    /// A versioned hash did not match the hash derived from its
    /// commitment.
    #[error("wrong versioned hash: have {have}, expected {expected}")]
    WrongVersionedHash {
        /// The versioned hash supplied by the caller.
        have: Hash,
        /// The versioned hash derived from the commitment.
        expected: Hash,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sidecar_round_trips_through_rlp() {
        let sidecar = BlobTransactionSidecar::default();
        let bytes = brane_rlp::encode(&sidecar);
        let decoded: BlobTransactionSidecar = brane_rlp::decode(&bytes).unwrap();
        assert_eq!(sidecar, decoded);
    }

    #[test]
    fn sidecar_with_blobs_round_trips_through_rlp() {
        let sidecar = BlobTransactionSidecar::new(
            vec![Blob::new([0x11u8; BYTES_PER_BLOB])],
            vec![Bytes48::new([0x22u8; BYTES_PER_COMMITMENT])],
            vec![Bytes48::new([0x33u8; BYTES_PER_PROOF])],
        );
        let bytes = brane_rlp::encode(&sidecar);
        let decoded: BlobTransactionSidecar = brane_rlp::decode(&bytes).unwrap();
        assert_eq!(sidecar, decoded);
    }

    #[test]
    fn versioned_hash_for_blob_is_indexed_by_commitment() {
        let sidecar = BlobTransactionSidecar::new(
            vec![Blob::default(), Blob::default()],
            vec![
                Bytes48::new([0x01u8; BYTES_PER_COMMITMENT]),
                Bytes48::new([0x02u8; BYTES_PER_COMMITMENT]),
            ],
            vec![Bytes48::default(), Bytes48::default()],
        );
        assert!(sidecar.versioned_hash_for_blob(0).is_some());
        assert!(sidecar.versioned_hash_for_blob(1).is_some());
        assert!(sidecar.versioned_hash_for_blob(2).is_none());
        assert_eq!(sidecar.versioned_hashes().count(), 2);
    }
}
