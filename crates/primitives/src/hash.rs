use crate::{error::PrimitiveError, HashBytes};
use once_cell::sync::OnceCell;
use std::{fmt, str::FromStr};

/// A 32-byte hash: a block hash, transaction hash, storage/event topic, or
/// EIP-4844 versioned blob hash.
///
/// Follows the same canonical-lowercase-hex, lazily-cached-string
/// discipline as [`crate::Address`].
#[derive(Clone)]
pub struct Hash {
    bytes: HashBytes,
    cached_hex: OnceCell<String>,
}

impl Hash {
    /// The all-zero sentinel hash.
    pub const ZERO: Self = Self { bytes: [0u8; 32], cached_hex: OnceCell::new() };

    /// Constructs a hash from its raw 32-byte representation.
    pub const fn new(bytes: HashBytes) -> Self {
        Self { bytes, cached_hex: OnceCell::new() }
    }

    /// Returns the raw bytes of this hash.
    pub const fn as_bytes(&self) -> &HashBytes {
        &self.bytes
    }

    /// Constructs a hash from an arbitrary byte slice.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, PrimitiveError> {
        let bytes: HashBytes = slice
            .try_into()
            .map_err(|_| PrimitiveError::InvalidLength { expected: 32, actual: slice.len() })?;
        Ok(Self::new(bytes))
    }

    /// Returns the canonical `0x`-prefixed lowercase hex form of this hash.
    pub fn as_hex(&self) -> &str {
        self.cached_hex.get_or_init(|| format!("0x{}", hex::encode(self.bytes)))
    }

    /// `true` if the first byte equals the given EIP-4844 versioned-hash
    /// version marker (`0x01` for KZG commitments).
    pub fn has_version(&self, version: u8) -> bool {
        self.bytes[0] == version
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hash").field(&self.as_hex()).finish()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_hex())
    }
}

impl PartialEq for Hash {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Hash {}

impl std::hash::Hash for Hash {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl From<HashBytes> for Hash {
    fn from(bytes: HashBytes) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl FromStr for Hash {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped =
            s.strip_prefix("0x").ok_or_else(|| PrimitiveError::MissingPrefix(s.to_owned()))?;
        if stripped.len() != 64 {
            return Err(PrimitiveError::InvalidLength { expected: 32, actual: stripped.len() / 2 });
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(stripped, &mut bytes)
            .map_err(|e| PrimitiveError::InvalidHex(e.to_string()))?;
        Ok(Self::new(bytes))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Hash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Hash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display() {
        let hash: Hash = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcd"
            .parse()
            .unwrap();
        assert_eq!(hash.as_hex(), "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcd");
    }

    #[test]
    fn versioned_hash_marker() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x01;
        let hash = Hash::new(bytes);
        assert!(hash.has_version(0x01));
        assert!(!hash.has_version(0x02));
    }
}
