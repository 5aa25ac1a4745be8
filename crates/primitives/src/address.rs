use crate::{error::PrimitiveError, AddressBytes};
use once_cell::sync::OnceCell;
use std::{fmt, str::FromStr};

/// A 20-byte Ethereum account address.
///
/// The canonical string form is lowercase hex with a `0x` prefix; it is
/// computed lazily from the byte representation and cached under a
/// safe-publication discipline ([`OnceCell`]), since the cache may be read
/// from multiple threads after the value crosses a `Send` boundary.
#[derive(Clone)]
pub struct Address {
    bytes: AddressBytes,
    cached_hex: OnceCell<String>,
}

impl Address {
    /// The all-zero sentinel address.
    pub const ZERO: Self = Self { bytes: [0u8; 20], cached_hex: OnceCell::new() };

    /// Constructs an address from its raw 20-byte representation.
    pub const fn new(bytes: AddressBytes) -> Self {
        Self { bytes, cached_hex: OnceCell::new() }
    }

    /// Returns the raw bytes of this address.
    pub const fn as_bytes(&self) -> &AddressBytes {
        &self.bytes
    }

    /// Returns `true` if this is the [`Address::ZERO`] sentinel.
    pub fn is_zero(&self) -> bool {
        self.bytes == [0u8; 20]
    }

    /// Constructs an address from an arbitrary byte slice.
    ///
    /// Fails with [`PrimitiveError::InvalidLength`] unless the slice is
    /// exactly 20 bytes long.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, PrimitiveError> {
        let bytes: AddressBytes = slice
            .try_into()
            .map_err(|_| PrimitiveError::InvalidLength { expected: 20, actual: slice.len() })?;
        Ok(Self::new(bytes))
    }

    /// Returns the canonical `0x`-prefixed lowercase hex form of this address.
    pub fn as_checksum(&self) -> &str {
        self.cached_hex.get_or_init(|| format!("0x{}", hex::encode(self.bytes)))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&self.as_checksum()).finish()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_checksum())
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Address {}

impl std::hash::Hash for Address {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl From<AddressBytes> for Address {
    fn from(bytes: AddressBytes) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl FromStr for Address {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").ok_or_else(|| PrimitiveError::MissingPrefix(s.to_owned()))?;
        if stripped.len() != 40 {
            let decoded_len = stripped.len() / 2;
            return Err(PrimitiveError::InvalidLength { expected: 20, actual: decoded_len });
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(stripped, &mut bytes)
            .map_err(|e| PrimitiveError::InvalidHex(e.to_string()))?;
        Ok(Self::new(bytes))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_checksum())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_lowercases_mixed_case() {
        let addr: Address = "0x000000000000000000000000000000000000dEaD".parse().unwrap();
        assert_eq!(addr.as_checksum(), "0x000000000000000000000000000000000000dead");
        assert_eq!(addr.as_bytes()[18..], [0xde, 0xad]);
    }

    #[test]
    fn rejects_short_input() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(matches!(err, PrimitiveError::InvalidLength { expected: 20, actual: 2 }));
    }

    #[test]
    fn rejects_missing_prefix() {
        let err = "dead".parse::<Address>().unwrap_err();
        assert!(matches!(err, PrimitiveError::MissingPrefix(_)));
    }

    #[test]
    fn zero_is_zero() {
        assert!(Address::ZERO.is_zero());
        assert_eq!(Address::ZERO.as_checksum(), "0x0000000000000000000000000000000000000000");
    }

    #[test]
    fn equality_ignores_cache_state() {
        let a: Address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap();
        let b = Address::new(*a.as_bytes());
        // `a` has a populated cache from parsing (which needs the hex form
        // for validation only, not necessarily cached) while `b` never had
        // its cache touched; equality must not depend on that.
        assert_eq!(a, b);
    }
}
