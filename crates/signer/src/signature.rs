use brane_primitives::{keccak256, Address, Hash};
use brane_rlp::{Decodable, Encodable, Error as RlpError};
use k256::ecdsa::{self, RecoveryId, VerifyingKey};
use std::str::FromStr;

/// An Ethereum ECDSA signature: a `secp256k1` signature plus the recovery
/// id needed to recover the signer's public key from the signature and
/// message hash alone.
///
/// Always held in "low S" canonical form (BIP-62), so two signers signing
/// the same hash with the same key produce byte-identical signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    inner: ecdsa::Signature,
    recid: RecoveryId,
}

impl Signature {
    /// Builds a signature from an inner ECDSA signature and recovery id,
    /// normalizing to low-S form.
    pub fn new(inner: ecdsa::Signature, recid: RecoveryId) -> Self {
        let mut sig = Self { inner, recid };
        sig.normalize_s();
        sig
    }

    /// Normalizes this signature into low-S form in place, flipping the
    /// recovery id's parity bit to match.
    pub fn normalize_s(&mut self) {
        if let Some(normalized) = self.inner.normalize_s() {
            self.inner = normalized;
            self.recid = RecoveryId::from_byte(self.recid.to_byte() ^ 1)
                .expect("flipping bit 0 of a valid recovery id stays valid");
        }
    }

    /// Parses a signature from its raw `r || s` bytes and a bare `v` in
    /// `{0, 1}` (or any form `v` accepted by [`normalize_v`]).
    pub fn from_bytes(bytes: &[u8], v: u64) -> Result<Self, ecdsa::Error> {
        let inner = ecdsa::Signature::from_slice(bytes)?;
        Ok(Self::new(inner, normalize_v(v)))
    }

    /// Builds a signature from its `r`, `s` scalars and a `v` value.
    pub fn from_scalars(r: Hash, s: Hash, v: u64) -> Result<Self, ecdsa::Error> {
        let inner = ecdsa::Signature::from_scalars(*r.as_bytes(), *s.as_bytes())?;
        Ok(Self::new(inner, normalize_v(v)))
    }

    /// The `r` component, as a 32-byte hash.
    pub fn r(&self) -> Hash {
        Hash::try_from_slice(&self.inner.r().to_bytes()).expect("scalar is always 32 bytes")
    }

    /// The `s` component, as a 32-byte hash.
    pub fn s(&self) -> Hash {
        Hash::try_from_slice(&self.inner.s().to_bytes()).expect("scalar is always 32 bytes")
    }

    /// The recovery id, as the bare byte `0` or `1`.
    pub const fn recid(&self) -> RecoveryId {
        self.recid
    }

    /// The recovery id in "Electrum" notation (`27`/`28`).
    pub const fn v(&self) -> u8 {
        self.recid.to_byte()
    }

    /// Applies [EIP-155](https://eips.ethereum.org/EIPS/eip-155) replay
    /// protection to this signature's `v` value for the given chain id.
    pub fn apply_eip155(&mut self, chain_id: u64) {
        self.recid = normalize_v(to_eip155_v(self.recid.to_byte(), chain_id));
    }

    /// The canonical 65-byte `r || s || v` encoding, `v` in Electrum form.
    pub fn as_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.inner.r().to_bytes());
        out[32..64].copy_from_slice(&self.inner.s().to_bytes());
        out[64] = self.recid.to_byte();
        out
    }

    /// Recovers the signer's public key from this signature and a
    /// prehashed message.
    pub fn recover_from_prehash(&self, prehash: &Hash) -> Result<VerifyingKey, ecdsa::Error> {
        VerifyingKey::recover_from_prehash(prehash.as_bytes(), &self.inner, self.recid)
    }

    /// Recovers the signer's [`Address`] from this signature and a
    /// prehashed message.
    pub fn recover_address_from_prehash(&self, prehash: &Hash) -> Result<Address, ecdsa::Error> {
        self.recover_from_prehash(prehash).map(|key| public_key_to_address(&key))
    }

    /// Recovers the signer's [`Address`] from this signature and an
    /// [EIP-191](https://eips.ethereum.org/EIPS/eip-191)-prefixed message.
    pub fn recover_address_from_msg(&self, msg: impl AsRef<[u8]>) -> Result<Address, ecdsa::Error> {
        self.recover_address_from_prehash(&eip191_hash_message(msg))
    }
}

/// Hashes `message` per [EIP-191](https://eips.ethereum.org/EIPS/eip-191):
/// `keccak256("\x19Ethereum Signed Message:\n" + len(message) + message)`.
pub fn eip191_hash_message(message: impl AsRef<[u8]>) -> Hash {
    let message = message.as_ref();
    let mut buf = format!("\x19Ethereum Signed Message:\n{}", message.len()).into_bytes();
    buf.extend_from_slice(message);
    Hash::new(keccak256(&buf))
}

/// Derives the Ethereum address (lower 20 bytes of the Keccak-256 hash of
/// the uncompressed public key, sans the 0x04 prefix) from a verifying key.
pub fn public_key_to_address(key: &VerifyingKey) -> Address {
    let uncompressed = key.to_encoded_point(false);
    let hash = keccak256(&uncompressed.as_bytes()[1..]);
    Address::try_from_slice(&hash[12..]).expect("keccak256 output is always 32 bytes")
}

/// Normalizes a `v` value from raw (`0`/`1`), legacy (`27`/`28`), or
/// [EIP-155](https://eips.ethereum.org/EIPS/eip-155) form into a
/// [`RecoveryId`].
pub fn normalize_v(v: u64) -> RecoveryId {
    let byte = match v {
        0..=26 => (v % 4) as u8,
        27..=34 => ((v - 27) % 4) as u8,
        _ => ((v - 1) % 2) as u8,
    };
    RecoveryId::from_byte(byte).expect("byte is always in 0..=3")
}

/// Computes the [EIP-155](https://eips.ethereum.org/EIPS/eip-155) `v`
/// value for a bare recovery byte (`0`/`1`) and chain id.
pub const fn to_eip155_v(recid: u8, chain_id: u64) -> u64 {
    recid as u64 + chain_id * 2 + 35
}

impl FromStr for Signature {
    type Err = ecdsa::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| ecdsa::Error::new())?;
        if bytes.len() != 65 {
            return Err(ecdsa::Error::new());
        }
        Self::from_bytes(&bytes[..64], bytes[64] as u64)
    }
}

impl Encodable for Signature {
    fn encode(&self, out: &mut Vec<u8>) {
        self.v().encode(out);
        self.r().encode(out);
        self.s().encode(out);
    }

    fn length(&self) -> usize {
        self.v().length() + self.r().length() + self.s().length()
    }
}

impl Decodable for Signature {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        let v = u64::decode(buf)?;
        let r = Hash::decode(buf)?;
        let s = Hash::decode(buf)?;
        Self::from_scalars(r, s, v).map_err(|_| RlpError::UnexpectedLength { expected: 32, actual: 32 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recover_web3_signature() {
        let signature = Signature::from_str(
            "b91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a0291c"
        ).expect("valid signature hex");
        let expected: Address = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23".parse().unwrap();
        assert_eq!(signature.recover_address_from_msg("Some data").unwrap(), expected);
    }

    #[test]
    fn signature_from_str_with_and_without_prefix() {
        let hex = "aa231fbe0ed2b5418e6ba7c19bee2522852955ec50996c02a2fe3e71d30ddaf1645baf4823fea7cb4fcc7150842493847cfb6a6d63ab93e8ee928ee3f61f503500";
        let a = Signature::from_str(hex).unwrap();
        let b = Signature::from_str(&format!("0x{hex}")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rlp_round_trip() {
        let sig = Signature::from_str(
            "48b55bfa915ac795c431978d8a6a992b628d557da5ff759b307d495a36649353efffd310ac743f371de3b9f7f9cb56c0b28ad43601b4ab949f53faa07bd2c8041b"
        ).unwrap();
        let bytes = brane_rlp::encode(&sig);
        let back = Signature::decode(&mut &bytes[..]).unwrap();
        assert_eq!(sig, back);
    }

    #[test]
    fn low_s_normalization_flips_recid_parity() {
        let sig = Signature::from_str(
            "48b55bfa915ac795c431978d8a6a992b628d557da5ff759b307d495a36649353efffd310ac743f371de3b9f7f9cb56c0b28ad43601b4ab949f53faa07bd2c8041b"
        ).unwrap();
        // `Signature::new` already normalized; re-normalizing must be a no-op.
        let mut copy = sig;
        copy.normalize_s();
        assert_eq!(copy, sig);
    }
}
