use crate::error::PrimitiveError;
use once_cell::sync::OnceCell;
use std::{fmt, ops::Deref, str::FromStr, sync::Arc};

/// An arbitrary-length byte string (calldata, log data, signed transaction
/// payloads, ...).
///
/// Value-equality is by byte content regardless of how the value was
/// constructed. The hex string form is computed lazily and cached under a
/// safe-publication discipline, matching [`crate::Address`] and
/// [`crate::Hash`].
#[derive(Clone)]
pub struct Bytes {
    inner: Arc<[u8]>,
    cached_hex: OnceCell<String>,
}

impl Bytes {
    /// The canonical empty byte string.
    pub fn empty() -> Self {
        Self { inner: Arc::from(&[][..]), cached_hex: OnceCell::new() }
    }

    /// Wraps an owned byte vector.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { inner: Arc::from(bytes), cached_hex: OnceCell::new() }
    }

    /// Returns the raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    /// Returns `true` if this is the canonical empty value.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the byte length.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns the canonical `0x`-prefixed lowercase hex form.
    pub fn as_hex(&self) -> &str {
        self.cached_hex.get_or_init(|| format!("0x{}", hex::encode(&self.inner)))
    }
}

impl Default for Bytes {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bytes").field(&self.as_hex()).finish()
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_hex())
    }
}

impl PartialEq for Bytes {
    fn eq(&self, other: &Self) -> bool {
        self.inner.as_ref() == other.inner.as_ref()
    }
}

impl Eq for Bytes {}

impl std::hash::Hash for Bytes {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.as_ref().hash(state);
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.inner
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl FromIterator<u8> for Bytes {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FromStr for Bytes {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped =
            s.strip_prefix("0x").ok_or_else(|| PrimitiveError::MissingPrefix(s.to_owned()))?;
        if stripped.len() % 2 != 0 {
            return Err(PrimitiveError::OddLength(s.to_owned()));
        }
        let bytes = hex::decode(stripped).map_err(|e| PrimitiveError::InvalidHex(e.to_string()))?;
        Ok(Self::new(bytes))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Bytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Bytes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_round_trips() {
        let empty = Bytes::empty();
        assert_eq!(empty.as_hex(), "0x");
        assert!(empty.is_empty());
        assert_eq!("0x".parse::<Bytes>().unwrap(), empty);
    }

    #[test]
    fn equality_is_by_content() {
        let a = Bytes::new(vec![1, 2, 3]);
        let b: Bytes = "0x010203".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_odd_length() {
        let err = "0xabc".parse::<Bytes>().unwrap_err();
        assert!(matches!(err, PrimitiveError::OddLength(_)));
    }
}
