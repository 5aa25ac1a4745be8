use crate::{
    decode::{decode_list_items, decode_str_payload},
    encode::{bytes_length, encode_bytes, encode_list_header, list_header_length},
    Decodable, Encodable, Error,
};
use brane_primitives::{Address, Bytes, Hash, Wei};
use num_bigint::BigUint;

macro_rules! impl_uint {
    ($ty:ty) => {
        impl Encodable for $ty {
            fn encode(&self, out: &mut Vec<u8>) {
                encode_bytes(&minimal_be(&self.to_be_bytes()), out);
            }

            fn length(&self) -> usize {
                bytes_length(&minimal_be(&self.to_be_bytes()))
            }
        }

        impl Decodable for $ty {
            fn decode(buf: &mut &[u8]) -> Result<Self, Error> {
                let payload = decode_str_payload(buf)?;
                if payload.first() == Some(&0) {
                    return Err(Error::NonMinimal { prefix: 0x80 });
                }
                if payload.len() > core::mem::size_of::<$ty>() {
                    return Err(Error::IntegerOverflow {
                        type_name: stringify!($ty),
                        payload_len: payload.len(),
                    });
                }
                let mut buf_arr = [0u8; core::mem::size_of::<$ty>()];
                buf_arr[core::mem::size_of::<$ty>() - payload.len()..].copy_from_slice(payload);
                Ok(<$ty>::from_be_bytes(buf_arr))
            }
        }
    };
}

fn minimal_be(bytes: &[u8]) -> Vec<u8> {
    let first_nonzero = bytes.iter().position(|&b| b != 0);
    match first_nonzero {
        Some(i) => bytes[i..].to_vec(),
        None => Vec::new(),
    }
}

impl_uint!(u8);
impl_uint!(u16);
impl_uint!(u32);
impl_uint!(u64);
impl_uint!(u128);

impl Encodable for bool {
    fn encode(&self, out: &mut Vec<u8>) {
        (*self as u8).encode(out);
    }

    fn length(&self) -> usize {
        (*self as u8).length()
    }
}

impl Decodable for bool {
    fn decode(buf: &mut &[u8]) -> Result<Self, Error> {
        Ok(u8::decode(buf)? != 0)
    }
}

impl Encodable for BigUint {
    fn encode(&self, out: &mut Vec<u8>) {
        let bytes = self.to_bytes_be();
        let bytes = if bytes.as_slice() == [0u8] { Vec::new() } else { bytes };
        encode_bytes(&bytes, out);
    }

    fn length(&self) -> usize {
        let bytes = self.to_bytes_be();
        let bytes = if bytes.as_slice() == [0u8] { Vec::new() } else { bytes };
        bytes_length(&bytes)
    }
}

impl Decodable for BigUint {
    fn decode(buf: &mut &[u8]) -> Result<Self, Error> {
        let payload = decode_str_payload(buf)?;
        if payload.first() == Some(&0) {
            return Err(Error::NonMinimal { prefix: 0x80 });
        }
        Ok(BigUint::from_bytes_be(payload))
    }
}

impl Encodable for Wei {
    fn encode(&self, out: &mut Vec<u8>) {
        self.as_biguint().encode(out);
    }

    fn length(&self) -> usize {
        self.as_biguint().length()
    }
}

impl Decodable for Wei {
    fn decode(buf: &mut &[u8]) -> Result<Self, Error> {
        Ok(Wei::from_biguint(BigUint::decode(buf)?))
    }
}

impl Encodable for Bytes {
    fn encode(&self, out: &mut Vec<u8>) {
        encode_bytes(self.as_slice(), out);
    }

    fn length(&self) -> usize {
        bytes_length(self.as_slice())
    }
}

impl Decodable for Bytes {
    fn decode(buf: &mut &[u8]) -> Result<Self, Error> {
        Ok(Bytes::new(decode_str_payload(buf)?.to_vec()))
    }
}

impl Encodable for Address {
    fn encode(&self, out: &mut Vec<u8>) {
        encode_bytes(self.as_ref(), out);
    }

    fn length(&self) -> usize {
        bytes_length(self.as_ref())
    }
}

impl Decodable for Address {
    fn decode(buf: &mut &[u8]) -> Result<Self, Error> {
        let payload = decode_str_payload(buf)?;
        Address::try_from_slice(payload)
            .map_err(|_| Error::UnexpectedLength { expected: 20, actual: payload.len() })
    }
}

impl Encodable for Hash {
    fn encode(&self, out: &mut Vec<u8>) {
        encode_bytes(self.as_ref(), out);
    }

    fn length(&self) -> usize {
        bytes_length(self.as_ref())
    }
}

impl Decodable for Hash {
    fn decode(buf: &mut &[u8]) -> Result<Self, Error> {
        let payload = decode_str_payload(buf)?;
        Hash::try_from_slice(payload)
            .map_err(|_| Error::UnexpectedLength { expected: 32, actual: payload.len() })
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode(&self, out: &mut Vec<u8>) {
        let payload_length: usize = self.iter().map(Encodable::length).sum();
        encode_list_header(payload_length, out);
        for item in self {
            item.encode(out);
        }
    }

    fn length(&self) -> usize {
        let payload_length: usize = self.iter().map(Encodable::length).sum();
        list_header_length(payload_length) + payload_length
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn decode(buf: &mut &[u8]) -> Result<Self, Error> {
        decode_list_items(buf)
    }
}

impl<T: Encodable> Encodable for &T {
    fn encode(&self, out: &mut Vec<u8>) {
        (**self).encode(out)
    }

    fn length(&self) -> usize {
        (**self).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode};

    #[test]
    fn zero_encodes_as_empty_string() {
        let out = encode(&0u64);
        assert_eq!(out, vec![0x80]);
    }

    #[test]
    fn small_integer_is_single_byte() {
        let out = encode(&15u64);
        assert_eq!(out, vec![0x0f]);
    }

    #[test]
    fn integer_round_trip() {
        let out = encode(&1024u64);
        let back: u64 = decode(&out).unwrap();
        assert_eq!(back, 1024);
    }

    #[test]
    fn rejects_non_minimal_integer() {
        // 0x82 0x00 0x01: 2-byte string with a leading zero byte.
        let err = decode::<u64>(&[0x82, 0x00, 0x01]).unwrap_err();
        assert_eq!(err, Error::NonMinimal { prefix: 0x80 });
    }

    #[test]
    fn list_length_mismatch_matches_example() {
        let err = decode::<Vec<Bytes>>(&[0xC2, 0x82, 0x00, 0x00]).unwrap_err();
        assert_eq!(err, Error::ListLengthMismatch { declared_end: 3, actual_end: 4 });
    }

    #[test]
    fn vec_round_trip() {
        let items = vec![Bytes::new(vec![1, 2]), Bytes::new(vec![3])];
        let out = encode(&items);
        let back: Vec<Bytes> = decode(&out).unwrap();
        assert_eq!(back, items);
    }

    #[test]
    fn address_round_trip() {
        let addr: Address = "0x000000000000000000000000000000000000dEaD".parse().unwrap();
        let out = encode(&addr);
        let back: Address = decode(&out).unwrap();
        assert_eq!(back, addr);
    }
}
