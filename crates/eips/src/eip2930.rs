//! [EIP-2930] access list types.
//!
//! [EIP-2930]: https://eips.ethereum.org/EIPS/eip-2930

use brane_primitives::{Address, Hash};
use brane_rlp::{Decodable, Encodable, Error as RlpError, Header};

/// One account and the storage slots of it the transaction plans to touch.
/// Accesses outside the list remain possible; they just cost more gas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessListItem {
    /// The account address.
    pub address: Address,
    /// Storage slots pre-warmed for this account.
    pub storage_keys: Vec<Hash>,
}

impl Encodable for AccessListItem {
    fn encode(&self, out: &mut Vec<u8>) {
        let payload_length = self.address.length() + self.storage_keys.length();
        Header { list: true, payload_length }.encode(out);
        self.address.encode(out);
        self.storage_keys.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.address.length() + self.storage_keys.length();
        Header { list: true, payload_length }.length() + payload_length
    }
}

impl Decodable for AccessListItem {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(RlpError::UnexpectedString);
        }
        let before = buf.len();
        let item = Self {
            address: Address::decode(buf)?,
            storage_keys: Vec::decode(buf)?,
        };
        let consumed = before - buf.len();
        if consumed != header.payload_length {
            return Err(RlpError::ListLengthMismatch {
                declared_end: header.payload_length,
                actual_end: consumed,
            });
        }
        Ok(item)
    }
}

/// The access list carried by EIP-2930 and later transaction variants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessList(pub Vec<AccessListItem>);

impl AccessList {
    /// An empty access list.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Encodable for AccessList {
    fn encode(&self, out: &mut Vec<u8>) {
        self.0.encode(out);
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for AccessList {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        Ok(Self(Vec::decode(buf)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_rlp() {
        let list = AccessList(vec![
            AccessListItem {
                address: Address::ZERO,
                storage_keys: vec![Hash::ZERO],
            },
            AccessListItem {
                address: Address::ZERO,
                storage_keys: vec![Hash::ZERO, Hash::ZERO],
            },
        ]);
        let bytes = brane_rlp::encode(&list);
        let decoded: AccessList = brane_rlp::decode(&bytes).unwrap();
        assert_eq!(list, decoded);
    }

    #[test]
    fn empty_list_round_trips() {
        let list = AccessList::empty();
        let bytes = brane_rlp::encode(&list);
        let decoded: AccessList = brane_rlp::decode(&bytes).unwrap();
        assert!(decoded.is_empty());
    }
}
