use crate::LocalSignerError;
use async_trait::async_trait;
use brane_primitives::{Address, ChainId, Hash};
use brane_signer::{public_key_to_address, Error, Result, Signature, Signer};
use k256::ecdsa::{signature::hazmat::PrehashSigner, RecoveryId, Signature as K256Signature, SigningKey};
use rand::{CryptoRng, Rng};
use std::{fmt, str::FromStr};
use zeroize::Zeroizing;

/// A `secp256k1` private key, held only long enough to sign; the
/// underlying scalar is zeroized on drop.
///
/// This is the canonical in-memory key representation. [`PrivateKeySigner`]
/// wraps it together with the derived address and an optional chain id to
/// implement [`Signer`].
pub struct PrivateKey {
    signing_key: SigningKey,
}

impl PrivateKey {
    /// Generates a new random private key.
    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }

    /// Generates a new random private key using the given RNG.
    pub fn random_with<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        Self { signing_key: SigningKey::random(rng) }
    }

    /// Constructs a private key from its raw 32-byte scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LocalSignerError> {
        Ok(Self { signing_key: SigningKey::from_slice(bytes)? })
    }

    /// Returns the 32-byte scalar, wrapped so the caller is reminded to
    /// zeroize it once done. Exporting key material at all is inherently
    /// dangerous; prefer [`Signer::sign_hash`] wherever possible.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self.signing_key.to_bytes());
        Zeroizing::new(bytes)
    }

    /// The uncompressed public key's derived [`Address`].
    pub fn address(&self) -> Address {
        public_key_to_address(self.signing_key.verifying_key())
    }

    fn sign_prehash(&self, prehash: &Hash) -> Result<Signature, k256::ecdsa::Error> {
        let (sig, recid): (K256Signature, RecoveryId) =
            self.signing_key.sign_prehash(prehash.as_bytes())?;
        Ok(Signature::new(sig, recid))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").field("address", &self.address()).finish_non_exhaustive()
    }
}

impl Clone for PrivateKey {
    fn clone(&self) -> Self {
        Self { signing_key: self.signing_key.clone() }
    }
}

impl FromStr for PrivateKey {
    type Err = LocalSignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }
}

impl From<SigningKey> for PrivateKey {
    fn from(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }
}

/// A [`Signer`] backed by a local [`PrivateKey`].
///
/// Signing is deterministic ([RFC 6979]) and always produces a low-S
/// canonical signature, matching what every other Ethereum client expects
/// on the wire.
///
/// [RFC 6979]: https://www.rfc-editor.org/rfc/rfc6979
pub struct PrivateKeySigner {
    key: PrivateKey,
    address: Address,
    chain_id: Option<ChainId>,
}

impl PrivateKeySigner {
    /// Wraps a [`PrivateKey`] as a signer, with no chain id configured.
    pub fn new(key: PrivateKey) -> Self {
        let address = key.address();
        Self { key, address, chain_id: None }
    }

    /// Generates a new random signer.
    pub fn random() -> Self {
        Self::new(PrivateKey::random())
    }

    /// Generates a new random signer using the given RNG.
    pub fn random_with<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        Self::new(PrivateKey::random_with(rng))
    }

    /// Parses a signer from a hex-encoded 32-byte private key, with or
    /// without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, LocalSignerError> {
        Ok(Self::new(s.parse()?))
    }

    /// Returns the underlying [`PrivateKey`].
    pub fn key(&self) -> &PrivateKey {
        &self.key
    }
}

impl fmt::Debug for PrivateKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeySigner")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

impl FromStr for PrivateKeySigner {
    type Err = LocalSignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[async_trait]
impl Signer for PrivateKeySigner {
    async fn sign_hash(&self, hash: Hash) -> Result<Signature> {
        self.key.sign_prehash(&hash).map_err(Error::Ecdsa)
    }

    fn address(&self) -> Address {
        self.address
    }

    fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    fn set_chain_id(&mut self, chain_id: Option<ChainId>) {
        self.chain_id = chain_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_is_deterministic() {
        let hex = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
        let a: PrivateKeySigner = hex.parse().unwrap();
        let b: PrivateKeySigner = hex.parse().unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn from_hex_accepts_0x_prefix() {
        let a = PrivateKeySigner::from_hex(
            "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
        .unwrap();
        let b = PrivateKeySigner::from_hex(
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
        .unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[tokio::test]
    async fn signing_is_deterministic() {
        let signer = PrivateKeySigner::random();
        let hash = Hash::new([7u8; 32]);
        let sig_a = signer.sign_hash(hash).await.unwrap();
        let sig_b = signer.sign_hash(hash).await.unwrap();
        assert_eq!(sig_a, sig_b);
    }

    #[tokio::test]
    async fn signature_recovers_to_signer_address() {
        let signer = PrivateKeySigner::random();
        let sig = signer.sign_message(b"hello brane").await.unwrap();
        let recovered = sig.recover_address_from_msg(b"hello brane").unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[tokio::test]
    async fn chain_id_is_settable() {
        let mut signer = PrivateKeySigner::random();
        signer.set_chain_id(Some(1));
        assert_eq!(signer.chain_id(), Some(1));
    }
}
