use hmac::{Hmac, Mac};
use k256::{
    ecdsa::{SigningKey, VerifyingKey},
    elliptic_curve::sec1::ToEncodedPoint,
    FieldBytes, Scalar,
};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::Error;

type HmacSha512 = Hmac<Sha512>;

const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A single BIP-32 child number, distinguishing hardened from normal
/// derivation (hardened indices are offset by `2^31`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildNumber(pub u32);

impl ChildNumber {
    /// A normal (non-hardened) child index. `index` must be `< 2^31`.
    pub fn normal(index: u32) -> Result<Self, Error> {
        if index >= HARDENED_OFFSET {
            return Err(Error::InvalidPath(format!(
                "normal index {index} out of range"
            )));
        }
        Ok(Self(index))
    }

    /// A hardened child index. `index` must be `< 2^31`.
    pub fn hardened(index: u32) -> Result<Self, Error> {
        if index >= HARDENED_OFFSET {
            return Err(Error::InvalidPath(format!(
                "hardened index {index} out of range"
            )));
        }
        Ok(Self(index + HARDENED_OFFSET))
    }

    /// Whether this child number requests hardened derivation.
    pub fn is_hardened(&self) -> bool {
        self.0 >= HARDENED_OFFSET
    }
}

/// A BIP-32 extended private key: a secp256k1 scalar plus the chain code
/// needed to derive further children.
#[derive(Clone)]
pub struct ExtendedPrivateKey {
    signing_key: SigningKey,
    chain_code: [u8; 32],
    depth: u8,
    child_number: u32,
}

impl ExtendedPrivateKey {
    /// Derives the master extended key from a BIP-39 seed via
    /// `HMAC-SHA512("Bitcoin seed", seed)`.
    pub fn from_seed(seed: &[u8]) -> Result<Self, Error> {
        let mut mac = HmacSha512::new_from_slice(b"Bitcoin seed")
            .expect("HMAC accepts keys of any length");
        mac.update(seed);
        let digest = mac.finalize().into_bytes();

        let (key_bytes, chain_code_bytes) = digest.split_at(32);
        let signing_key = SigningKey::from_slice(key_bytes)
            .map_err(|_| Error::InvalidChildScalar(0))?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(chain_code_bytes);

        Ok(Self {
            signing_key,
            chain_code,
            depth: 0,
            child_number: 0,
        })
    }

    /// The raw 32-byte private scalar, zeroized once dropped by the caller.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self.signing_key.to_bytes());
        Zeroizing::new(bytes)
    }

    /// The corresponding compressed public key, SEC1-encoded (33 bytes).
    pub fn public_key_bytes(&self) -> [u8; 33] {
        let verifying_key: &VerifyingKey = self.signing_key.verifying_key();
        let encoded = verifying_key.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    /// Derives the child at `child.0`, hardened or normal per
    /// [`ChildNumber::is_hardened`].
    pub fn derive_child(&self, child: ChildNumber) -> Result<Self, Error> {
        let mut mac = HmacSha512::new_from_slice(&self.chain_code)
            .expect("HMAC accepts keys of any length");

        if child.is_hardened() {
            mac.update(&[0u8]);
            mac.update(&self.signing_key.to_bytes());
        } else {
            mac.update(&self.public_key_bytes());
        }
        mac.update(&child.0.to_be_bytes());

        let digest = mac.finalize().into_bytes();
        let (il, chain_code_bytes) = digest.split_at(32);

        let mut il_bytes = FieldBytes::default();
        il_bytes.copy_from_slice(il);
        let il_scalar = Option::<Scalar>::from(Scalar::from_repr(il_bytes))
            .ok_or(Error::InvalidChildScalar(child.0))?;

        let mut parent_bytes = FieldBytes::default();
        parent_bytes.copy_from_slice(&self.signing_key.to_bytes());
        let parent_scalar = Option::<Scalar>::from(Scalar::from_repr(parent_bytes))
            .ok_or(Error::InvalidChildScalar(child.0))?;

        let child_scalar = il_scalar + parent_scalar;

        // A zero or out-of-range sum is rejected by `SigningKey::from_bytes`
        // itself; BIP-32 says to advance to the next index in that case.
        let signing_key = SigningKey::from_bytes(&child_scalar.to_bytes())
            .map_err(|_| Error::InvalidChildScalar(child.0))?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(chain_code_bytes);

        Ok(Self {
            signing_key,
            chain_code,
            depth: self.depth + 1,
            child_number: child.0,
        })
    }

    /// This key's derivation depth (0 for the master key).
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// The child index used to derive this key from its parent.
    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    /// Consumes this extended key, returning the underlying signing key.
    pub fn into_signing_key(self) -> SigningKey {
        self.signing_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_key_from_seed_is_deterministic() {
        let seed = [0x5au8; 64];
        let a = ExtendedPrivateKey::from_seed(&seed).unwrap();
        let b = ExtendedPrivateKey::from_seed(&seed).unwrap();
        assert_eq!(*a.secret_bytes(), *b.secret_bytes());
        assert_eq!(a.chain_code, b.chain_code);
    }

    #[test]
    fn hardened_and_normal_children_differ() {
        let seed = [0x11u8; 64];
        let master = ExtendedPrivateKey::from_seed(&seed).unwrap();

        let hardened = master.derive_child(ChildNumber::hardened(0).unwrap()).unwrap();
        let normal = master.derive_child(ChildNumber::normal(0).unwrap()).unwrap();

        assert_ne!(*hardened.secret_bytes(), *normal.secret_bytes());
        assert_eq!(hardened.depth(), 1);
        assert_eq!(normal.depth(), 1);
    }

    #[test]
    fn derivation_is_deterministic() {
        let seed = [0x77u8; 64];
        let master = ExtendedPrivateKey::from_seed(&seed).unwrap();

        let a = master.derive_child(ChildNumber::hardened(44).unwrap()).unwrap();
        let b = master.derive_child(ChildNumber::hardened(44).unwrap()).unwrap();
        assert_eq!(*a.secret_bytes(), *b.secret_bytes());
    }

    #[test]
    fn normal_child_cannot_be_derived_from_out_of_range_index() {
        assert!(ChildNumber::normal(HARDENED_OFFSET).is_err());
        assert!(ChildNumber::hardened(HARDENED_OFFSET).is_err());
    }
}
