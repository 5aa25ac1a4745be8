//! Recursive Length Prefix (RLP) encoding, the wire format used for
//! Ethereum transactions, and for the typed-envelope payloads defined by
//! [EIP-2718](https://eips.ethereum.org/EIPS/eip-2718).
//!
//! RLP encodes two shapes only: byte strings and lists of items. Integers,
//! addresses, and hashes are all encoded as their minimal big-endian byte
//! string. Every length prefix must use the shortest form that can
//! represent it; headers and integer payloads carrying an avoidable
//! leading zero byte are rejected on decode rather than silently accepted.

mod decode;
mod encode;
mod error;
mod header;
mod impls;

pub use decode::{decode, decode_str_payload, Decodable};
pub use encode::{encode, Encodable};
pub use error::Error;
pub use header::Header;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bytes_encode_to_single_prefix() {
        let out = encode(&brane_primitives::Bytes::empty());
        assert_eq!(out, vec![0x80]);
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let err = decode::<u64>(&[0x01, 0x02]).unwrap_err();
        assert_eq!(err, Error::TrailingBytes { remaining: 1 });
    }

    #[test]
    fn empty_list_round_trips() {
        let items: Vec<u64> = Vec::new();
        let out = encode(&items);
        assert_eq!(out, vec![0xc0]);
        let back: Vec<u64> = decode(&out).unwrap();
        assert!(back.is_empty());
    }
}
