use crate::{AbiError, AbiType, AbiValue};
use brane_primitives::Address;
use num_bigint::{BigInt, BigUint, Sign};

const WORD: usize = 32;

fn read_word<'a>(buf: &'a [u8], offset: usize) -> Result<&'a [u8; WORD], AbiError> {
    let slice = buf.get(offset..offset + WORD).ok_or_else(|| AbiError::BufferTooShort {
        offset,
        required: WORD,
        available: buf.len().saturating_sub(offset),
    })?;
    Ok(slice.try_into().expect("slice is exactly WORD bytes"))
}

/// Reads a word at `offset` as a `usize` offset/length, rejecting values
/// that don't fit (the high 24 bytes must be zero on a 64-bit target).
fn read_usize(buf: &[u8], offset: usize) -> Result<usize, AbiError> {
    let word = read_word(buf, offset)?;
    if word[..WORD - 8].iter().any(|&b| b != 0) {
        return Err(AbiError::OffsetTooLarge { head_offset: offset });
    }
    let mut be = [0u8; 8];
    be.copy_from_slice(&word[WORD - 8..]);
    Ok(u64::from_be_bytes(be) as usize)
}

fn decode_scalar(ty: &AbiType, buf: &[u8], offset: usize) -> Result<AbiValue, AbiError> {
    let word = read_word(buf, offset)?;
    Ok(match ty {
        AbiType::Uint(bits) => AbiValue::Uint(*bits, BigUint::from_bytes_be(&word[..])),
        AbiType::Int(bits) => {
            let magnitude = BigUint::from_bytes_be(&word[..]);
            let value = if word[0] & 0x80 != 0 {
                let modulus = BigInt::from(1u8) << 256;
                BigInt::from_biguint(Sign::Plus, magnitude) - modulus
            } else {
                BigInt::from_biguint(Sign::Plus, magnitude)
            };
            AbiValue::Int(*bits, value)
        }
        AbiType::Address => {
            if word[..WORD - 20].iter().any(|&b| b != 0) {
                return Err(AbiError::NonZeroAddressPadding);
            }
            AbiValue::Address(Address::try_from_slice(&word[WORD - 20..]).expect("20 bytes"))
        }
        AbiType::Bool => {
            if word[..WORD - 1].iter().any(|&b| b != 0) || word[WORD - 1] > 1 {
                return Err(AbiError::InvalidBool);
            }
            AbiValue::Bool(word[WORD - 1] == 1)
        }
        AbiType::FixedBytes(len) => {
            let len = *len as usize;
            if word[len..].iter().any(|&b| b != 0) {
                return Err(AbiError::NonZeroPadding { width: len });
            }
            AbiValue::FixedBytes(word[..len].to_vec())
        }
        _ => unreachable!("decode_scalar called on a composite type"),
    })
}

fn decode_dynamic_bytes(buf: &[u8], offset: usize) -> Result<Vec<u8>, AbiError> {
    let len = read_usize(buf, offset)?;
    let start = offset + WORD;
    let end = start.checked_add(len).ok_or(AbiError::LengthOutOfBounds {
        offset: start,
        length: len,
        buffer_len: buf.len(),
    })?;
    buf.get(start..end)
        .map(<[u8]>::to_vec)
        .ok_or(AbiError::LengthOutOfBounds { offset: start, length: len, buffer_len: buf.len() })
}

/// Decodes a sequence of values laid out as a shared head/tail region
/// (a tuple's fields, a fixed array's elements, a dynamic array's elements
/// after its length word, or a top-level argument list).
fn decode_seq(buf: &[u8], types: &[AbiType]) -> Result<Vec<AbiValue>, AbiError> {
    let mut values = Vec::with_capacity(types.len());
    let mut head_cursor = 0usize;
    for ty in types {
        if ty.is_dynamic() {
            let rel_offset = read_usize(buf, head_cursor)?;
            head_cursor += WORD;
            if rel_offset > buf.len() {
                return Err(AbiError::OffsetOutOfBounds { offset: rel_offset, buffer_len: buf.len() });
            }
            values.push(decode_dynamic(ty, buf, rel_offset)?);
        } else {
            values.push(decode_static(ty, buf, head_cursor)?);
            head_cursor += ty.head_words() * WORD;
        }
    }
    Ok(values)
}

fn decode_static(ty: &AbiType, buf: &[u8], offset: usize) -> Result<AbiValue, AbiError> {
    match ty {
        AbiType::FixedArray(elem, len) => {
            let elem_types = vec![(**elem).clone(); *len];
            let slice = buf.get(offset..).ok_or(AbiError::BufferTooShort {
                offset,
                required: ty.head_words() * WORD,
                available: buf.len().saturating_sub(offset),
            })?;
            Ok(AbiValue::FixedArray(decode_seq(slice, &elem_types)?))
        }
        AbiType::Tuple(fields) => {
            let slice = buf.get(offset..).ok_or(AbiError::BufferTooShort {
                offset,
                required: ty.head_words() * WORD,
                available: buf.len().saturating_sub(offset),
            })?;
            Ok(AbiValue::Tuple(decode_seq(slice, fields)?))
        }
        _ => decode_scalar(ty, buf, offset),
    }
}

fn decode_dynamic(ty: &AbiType, buf: &[u8], offset: usize) -> Result<AbiValue, AbiError> {
    match ty {
        AbiType::Bytes => Ok(AbiValue::Bytes(decode_dynamic_bytes(buf, offset)?)),
        AbiType::String => {
            let raw = decode_dynamic_bytes(buf, offset)?;
            String::from_utf8(raw).map(AbiValue::String).map_err(|_| AbiError::InvalidUtf8)
        }
        AbiType::Array(elem) => {
            let len = read_usize(buf, offset)?;
            let body_start = offset + WORD;
            let body = buf.get(body_start..).ok_or(AbiError::OffsetOutOfBounds {
                offset: body_start,
                buffer_len: buf.len(),
            })?;
            let elem_types = vec![(**elem).clone(); len];
            Ok(AbiValue::Array(decode_seq(body, &elem_types)?))
        }
        AbiType::FixedArray(elem, len) => {
            let body = buf.get(offset..).ok_or(AbiError::OffsetOutOfBounds {
                offset,
                buffer_len: buf.len(),
            })?;
            let elem_types = vec![(**elem).clone(); *len];
            Ok(AbiValue::FixedArray(decode_seq(body, &elem_types)?))
        }
        AbiType::Tuple(fields) => {
            let body = buf.get(offset..).ok_or(AbiError::OffsetOutOfBounds {
                offset,
                buffer_len: buf.len(),
            })?;
            Ok(AbiValue::Tuple(decode_seq(body, fields)?))
        }
        _ => unreachable!("decode_dynamic called on a static type"),
    }
}

/// Decodes a tuple of values (e.g. a function call's argument list) from
/// its head/tail region, with no selector or other prefix.
pub fn decode(types: &[AbiType], buf: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    decode_seq(buf, types)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;

    #[test]
    fn round_trips_static_tuple() {
        let values =
            vec![AbiValue::Uint(256, BigUint::from(42u8)), AbiValue::Address(Address::ZERO)];
        let encoded = encode(&values).unwrap();
        let types = vec![AbiType::Uint(256), AbiType::Address];
        let decoded = decode(&types, &encoded).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn round_trips_dynamic_bytes_and_string() {
        let values =
            vec![AbiValue::Bytes(vec![1, 2, 3]), AbiValue::String("hello".to_owned())];
        let encoded = encode(&values).unwrap();
        let types = vec![AbiType::Bytes, AbiType::String];
        let decoded = decode(&types, &encoded).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn round_trips_dynamic_array() {
        let values = vec![AbiValue::Array(vec![
            AbiValue::Uint(256, BigUint::from(1u8)),
            AbiValue::Uint(256, BigUint::from(2u8)),
        ])];
        let encoded = encode(&values).unwrap();
        let types = vec![AbiType::Array(Box::new(AbiType::Uint(256)))];
        let decoded = decode(&types, &encoded).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn empty_dynamic_value_round_trips() {
        let values = vec![AbiValue::Bytes(Vec::new())];
        let encoded = encode(&values).unwrap();
        let decoded = decode(&[AbiType::Bytes], &encoded).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn rejects_offset_that_would_overflow_the_buffer() {
        // Low word of the (single) head slot is 0xFFFFFFFF, a huge offset.
        let mut buf = vec![0u8; 32];
        buf[28..32].copy_from_slice(&0xFFFFFFFFu32.to_be_bytes());
        let err = decode(&[AbiType::String], &buf).unwrap_err();
        assert!(matches!(err, AbiError::OffsetOutOfBounds { .. }));
    }

    #[test]
    fn rejects_non_minimal_bool() {
        let mut buf = vec![0u8; 32];
        buf[31] = 2;
        let err = decode_static(&AbiType::Bool, &buf, 0).unwrap_err();
        assert!(matches!(err, AbiError::InvalidBool));
    }

    #[test]
    fn rejects_non_zero_fixed_bytes_padding() {
        let mut buf = vec![0u8; 32];
        buf[4] = 1; // byte 4 is past bytes4's content, must be zero.
        let err = decode_static(&AbiType::FixedBytes(4), &buf, 0).unwrap_err();
        assert!(matches!(err, AbiError::NonZeroPadding { width: 4 }));
    }

    #[test]
    fn negative_int_round_trips() {
        let values = vec![AbiValue::Int(256, BigInt::from(-12345))];
        let encoded = encode(&values).unwrap();
        let decoded = decode(&[AbiType::Int(256)], &encoded).unwrap();
        assert_eq!(decoded, values);
    }
}
