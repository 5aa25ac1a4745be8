use crate::error::PrimitiveError;
use num_bigint::BigUint;
use std::{fmt, ops::Add, str::FromStr};

/// A numeric identifier binding a signed transaction to a specific network
/// ([EIP-155]).
///
/// [EIP-155]: https://eips.ethereum.org/EIPS/eip-155
pub type ChainId = u64;

/// An unbounded non-negative integer: a native-currency amount, a gas
/// price, or any other JSON-RPC "quantity" value.
///
/// Ethereum quantities are conceptually arbitrary precision (they are
/// encoded as minimal big-endian hex on the wire), so `Wei` wraps
/// [`BigUint`] rather than a fixed-width integer.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wei(BigUint);

impl Wei {
    /// The zero value.
    pub fn zero() -> Self {
        Self(BigUint::from(0u8))
    }

    /// Constructs a `Wei` from a `u64`.
    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    /// Constructs a `Wei` from a `u128`.
    pub fn from_u128(value: u128) -> Self {
        Self(BigUint::from(value))
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::from(0u8)
    }

    /// Checked addition; `Wei` is unbounded so this never overflows, but
    /// the method is kept for API symmetry with callers that add
    /// externally-sourced values and want a uniform fallible interface.
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        Some(Self(&self.0 + &other.0))
    }

    /// Attempts to narrow this value to a `u128`, failing if it does not
    /// fit (used when handing a value to a wire format or FFI boundary
    /// that requires a fixed width).
    pub fn try_to_u128(&self) -> Option<u128> {
        use num_bigint::ToBigUint;
        let max = u128::MAX.to_biguint().unwrap();
        if self.0 > max {
            None
        } else {
            let digits = self.0.to_u64_digits();
            let mut out: u128 = 0;
            for (i, d) in digits.iter().enumerate() {
                out |= (*d as u128) << (64 * i);
            }
            Some(out)
        }
    }

    /// Returns the canonical JSON-RPC "quantity" hex form: `0x`-prefixed,
    /// lowercase, no leading zeros, except the literal zero which encodes
    /// as `0x0`.
    pub fn to_hex_quantity(&self) -> String {
        if self.is_zero() {
            return "0x0".to_owned();
        }
        format!("0x{}", self.0.to_str_radix(16))
    }

    /// Borrows the underlying arbitrary-precision integer, for codecs
    /// (RLP, ABI) that operate on [`BigUint`] directly.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Wraps an already-constructed [`BigUint`].
    pub fn from_biguint(value: BigUint) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Wei").field(&self.0.to_str_radix(10)).finish()
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Wei {
    type Output = Wei;

    fn add(self, rhs: Self) -> Self::Output {
        Wei(self.0 + rhs.0)
    }
}

impl From<u64> for Wei {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u128> for Wei {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl FromStr for Wei {
    type Err = PrimitiveError;

    /// Parses a JSON-RPC quantity: `0x`-prefixed hex, or a bare decimal
    /// string for convenience in tests and config files.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(stripped) = s.strip_prefix("0x") {
            if stripped.is_empty() {
                return Err(PrimitiveError::InvalidHex(s.to_owned()));
            }
            let value = BigUint::parse_bytes(stripped.as_bytes(), 16)
                .ok_or_else(|| PrimitiveError::InvalidHex(s.to_owned()))?;
            Ok(Self(value))
        } else {
            let value = BigUint::parse_bytes(s.as_bytes(), 10)
                .ok_or_else(|| PrimitiveError::InvalidHex(s.to_owned()))?;
            Ok(Self(value))
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Wei {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_quantity())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Wei {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity() {
        assert_eq!(Wei::zero().to_hex_quantity(), "0x0");
    }

    #[test]
    fn no_leading_zeros() {
        let wei = Wei::from_u64(255);
        assert_eq!(wei.to_hex_quantity(), "0xff");
    }

    #[test]
    fn parses_hex_and_decimal() {
        let a: Wei = "0xff".parse().unwrap();
        let b: Wei = "255".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn checked_add_is_exact() {
        let a = Wei::from_u128(u128::MAX);
        let b = Wei::from_u64(1);
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.try_to_u128(), None);
    }
}
