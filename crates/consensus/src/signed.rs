use crate::transaction::SignableTransaction;
use brane_primitives::{Address, Hash};
use brane_signer::Signature;

/// A transaction paired with the signature over it and the envelope hash
/// that signature seals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signed<T> {
    tx: T,
    signature: Signature,
    hash: Hash,
}

impl<T> Signed<T> {
    /// The unsigned transaction.
    pub const fn tx(&self) -> &T {
        &self.tx
    }

    /// The signature over [`SignableTransaction::signature_hash`].
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The envelope hash (keccak256 of the signed RLP encoding).
    pub const fn hash(&self) -> &Hash {
        &self.hash
    }

    /// Splits this value into its transaction, signature, and hash.
    pub fn into_parts(self) -> (T, Signature, Hash) {
        (self.tx, self.signature, self.hash)
    }

    /// Discards the signature, returning the unsigned transaction.
    pub fn strip_signature(self) -> T {
        self.tx
    }
}

impl<T: SignableTransaction> Signed<T> {
    /// Builds a `Signed` from a transaction, signature, and hash that the
    /// caller has already verified to be consistent. Does not check that
    /// `signature` actually signs `tx`.
    pub const fn new_unchecked(tx: T, signature: Signature, hash: Hash) -> Self {
        Self { tx, signature, hash }
    }

    /// The hash the signature was produced over.
    pub fn signature_hash(&self) -> Hash {
        self.tx.signature_hash()
    }

    /// Recovers the address that produced [`Self::signature`].
    pub fn recover_signer(&self) -> Result<Address, k256::ecdsa::Error> {
        self.signature.recover_address_from_prehash(&self.tx.signature_hash())
    }
}
