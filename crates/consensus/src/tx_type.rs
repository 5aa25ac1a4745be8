use crate::error::TransactionError;
use brane_rlp::{Decodable, Encodable, Error as RlpError};
use std::fmt;

/// The [EIP-2718] transaction type byte.
///
/// [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TxType {
    /// Pre-[EIP-2718] transaction, no type byte.
    #[default]
    Legacy = 0,
    /// [EIP-2930](https://eips.ethereum.org/EIPS/eip-2930) access-list transaction.
    Eip2930 = 1,
    /// [EIP-1559](https://eips.ethereum.org/EIPS/eip-1559) dynamic-fee transaction.
    Eip1559 = 2,
    /// [EIP-4844](https://eips.ethereum.org/EIPS/eip-4844) blob transaction.
    Eip4844 = 3,
    /// [EIP-7702](https://eips.ethereum.org/EIPS/eip-7702) set-code transaction.
    Eip7702 = 4,
}

impl TxType {
    /// `true` for dynamic-fee variants (everything but legacy and 2930).
    pub const fn is_dynamic_fee(&self) -> bool {
        matches!(self, Self::Eip1559 | Self::Eip4844 | Self::Eip7702)
    }
}

impl From<TxType> for u8 {
    fn from(value: TxType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for TxType {
    type Error = TransactionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Legacy,
            1 => Self::Eip2930,
            2 => Self::Eip1559,
            3 => Self::Eip4844,
            4 => Self::Eip7702,
            other => return Err(TransactionError::UnknownType(other)),
        })
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "Legacy"),
            Self::Eip2930 => write!(f, "EIP-2930"),
            Self::Eip1559 => write!(f, "EIP-1559"),
            Self::Eip4844 => write!(f, "EIP-4844"),
            Self::Eip7702 => write!(f, "EIP-7702"),
        }
    }
}

impl Encodable for TxType {
    fn encode(&self, out: &mut Vec<u8>) {
        (*self as u8).encode(out);
    }

    fn length(&self) -> usize {
        1
    }
}

impl Decodable for TxType {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        let ty = u8::decode(buf)?;
        Self::try_from(ty).map_err(|_| RlpError::UnexpectedLength { expected: 1, actual: 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u8_round_trip() {
        for ty in [TxType::Legacy, TxType::Eip2930, TxType::Eip1559, TxType::Eip4844, TxType::Eip7702] {
            assert_eq!(TxType::try_from(u8::from(ty)).unwrap(), ty);
        }
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(TxType::try_from(9).is_err());
    }
}
