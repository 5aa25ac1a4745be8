use brane_primitives::Address;
use brane_rlp::{Decodable, Encodable, Error as RlpError, Header};

/// The `to` field of a transaction: either a target address, or empty for
/// a contract creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TxKind {
    /// A transaction that creates a contract.
    #[default]
    Create,
    /// A transaction that calls a contract or transfers value.
    Call(Address),
}

impl TxKind {
    /// The address the transaction calls, or `None` for a creation.
    pub fn to(&self) -> Option<&Address> {
        match self {
            Self::Create => None,
            Self::Call(to) => Some(to),
        }
    }

    /// `true` for a contract creation.
    pub const fn is_create(&self) -> bool {
        matches!(self, Self::Create)
    }
}

impl From<Address> for TxKind {
    fn from(value: Address) -> Self {
        Self::Call(value)
    }
}

impl From<Option<Address>> for TxKind {
    fn from(value: Option<Address>) -> Self {
        match value {
            None => Self::Create,
            Some(addr) => Self::Call(addr),
        }
    }
}

impl Encodable for TxKind {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::Create => Header { list: false, payload_length: 0 }.encode(out),
            Self::Call(addr) => addr.encode(out),
        }
    }

    fn length(&self) -> usize {
        match self {
            Self::Create => 1,
            Self::Call(addr) => addr.length(),
        }
    }
}

impl Decodable for TxKind {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        if buf.first() == Some(&0x80) {
            *buf = &buf[1..];
            return Ok(Self::Create);
        }
        Ok(Self::Call(Address::decode(buf)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_round_trips() {
        let kind = TxKind::Create;
        let bytes = brane_rlp::encode(&kind);
        assert_eq!(bytes, vec![0x80]);
        let decoded: TxKind = brane_rlp::decode(&bytes).unwrap();
        assert_eq!(decoded, kind);
    }

    #[test]
    fn call_round_trips() {
        let kind = TxKind::Call(Address::ZERO);
        let bytes = brane_rlp::encode(&kind);
        let decoded: TxKind = brane_rlp::decode(&bytes).unwrap();
        assert_eq!(decoded, kind);
    }
}
