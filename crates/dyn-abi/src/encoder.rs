use crate::{AbiError, AbiType, AbiValue};
use num_bigint::{BigInt, Sign};

const WORD: usize = 32;

/// A value's encoding split into its head contribution and, if dynamic, its
/// out-of-line tail. Joining a sequence of these (see [`encode_seq`]) is how
/// every composite type (tuple, array, top-level argument list) is encoded.
struct Token {
    /// Non-empty for a static value: its full inline encoding.
    /// Empty for a dynamic value, whose head slot is instead a 32-byte
    /// offset computed by [`encode_seq`].
    head: Vec<u8>,
    /// Empty for a static value. For a dynamic value, its full body
    /// (written once, after every head in the sequence).
    tail: Vec<u8>,
}

/// Encodes a left-pad-to-32-byte unsigned word.
fn word_from_biguint(value: &num_bigint::BigUint) -> [u8; WORD] {
    let bytes = value.to_bytes_be();
    let mut word = [0u8; WORD];
    let start = WORD.saturating_sub(bytes.len());
    word[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(WORD)..]);
    word
}

fn word_from_usize(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

/// Encodes a signed two's-complement 256-bit word.
fn word_from_bigint(value: &BigInt) -> [u8; WORD] {
    if value.sign() == Sign::Minus {
        let modulus = BigInt::from(1u8) << 256;
        let wrapped = modulus + value;
        let (_, bytes) = wrapped.to_bytes_be();
        let mut word = [0xffu8; WORD];
        let start = WORD.saturating_sub(bytes.len());
        word[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(WORD)..]);
        word
    } else {
        let (_, bytes) = value.to_bytes_be();
        let mut word = [0u8; WORD];
        let start = WORD.saturating_sub(bytes.len());
        word[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(WORD)..]);
        word
    }
}

fn encode_scalar(value: &AbiValue) -> Result<[u8; WORD], AbiError> {
    Ok(match value {
        AbiValue::Uint(_, n) => word_from_biguint(n),
        AbiValue::Int(_, n) => word_from_bigint(n),
        AbiValue::Address(addr) => {
            let mut word = [0u8; WORD];
            word[WORD - 20..].copy_from_slice(addr.as_bytes());
            word
        }
        AbiValue::Bool(b) => {
            let mut word = [0u8; WORD];
            word[WORD - 1] = *b as u8;
            word
        }
        AbiValue::FixedBytes(data) => {
            let mut word = [0u8; WORD];
            word[..data.len()].copy_from_slice(data);
            word
        }
        other => {
            return Err(AbiError::SchemaMismatch { schema: other.schema().canonical() });
        }
    })
}

fn encode_dynamic_bytes(data: &[u8]) -> Vec<u8> {
    let mut tail = Vec::with_capacity(WORD + data.len().div_ceil(WORD) * WORD);
    tail.extend_from_slice(&word_from_usize(data.len()));
    tail.extend_from_slice(data);
    let padding = (WORD - data.len() % WORD) % WORD;
    tail.extend(std::iter::repeat(0u8).take(padding));
    tail
}

fn encode_token(value: &AbiValue) -> Result<Token, AbiError> {
    Ok(match value {
        AbiValue::Uint(..) | AbiValue::Int(..) | AbiValue::Address(_) | AbiValue::Bool(_)
        | AbiValue::FixedBytes(_) => {
            Token { head: encode_scalar(value)?.to_vec(), tail: Vec::new() }
        }
        AbiValue::Bytes(data) => Token { head: Vec::new(), tail: encode_dynamic_bytes(data) },
        AbiValue::String(s) => {
            Token { head: Vec::new(), tail: encode_dynamic_bytes(s.as_bytes()) }
        }
        AbiValue::Array(elems) => {
            let mut tail = word_from_usize(elems.len()).to_vec();
            tail.extend(encode_seq(elems)?);
            Token { head: Vec::new(), tail }
        }
        AbiValue::FixedArray(elems) | AbiValue::Tuple(elems) => {
            let body = encode_seq(elems)?;
            if value.schema().is_dynamic() {
                Token { head: Vec::new(), tail: body }
            } else {
                Token { head: body, tail: Vec::new() }
            }
        }
    })
}

/// Encodes a sequence of values as the head/tail region that `tuple`,
/// `T[N]`, `T[]` bodies, and top-level argument lists all share.
fn encode_seq(values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let tokens = values.iter().map(encode_token).collect::<Result<Vec<_>, _>>()?;
    let head_size: usize =
        tokens.iter().map(|t| if t.head.is_empty() && !t.tail.is_empty() { WORD } else { t.head.len() }).sum();

    let mut out = Vec::with_capacity(head_size + tokens.iter().map(|t| t.tail.len()).sum::<usize>());
    let mut offset = head_size;
    for token in &tokens {
        if token.head.is_empty() && !token.tail.is_empty() {
            out.extend_from_slice(&word_from_usize(offset));
            offset += token.tail.len();
        } else {
            out.extend_from_slice(&token.head);
        }
    }
    for token in &tokens {
        out.extend_from_slice(&token.tail);
    }
    Ok(out)
}

/// Encodes a tuple of values (e.g. a function call's argument list) as its
/// head/tail region, with no selector or other prefix.
pub fn encode(values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    encode_seq(values)
}

/// Encodes `selector` followed by the head/tail encoding of `values`,
/// matching a Solidity function call's calldata layout.
pub fn encode_function_call(selector: [u8; 4], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let mut out = Vec::with_capacity(4 + values.len() * WORD);
    out.extend_from_slice(&selector);
    out.extend(encode_seq(values)?);
    Ok(out)
}

/// Validates each value against an externally supplied schema (e.g. parsed
/// from a JSON ABI, independent of the value's own structurally-inferred
/// schema) before encoding it, catching arity and shape mismatches earlier
/// than a consumer's own misuse would otherwise surface as malformed
/// calldata.
pub fn encode_with_schema(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::ArityMismatch { expected: types.len(), actual: values.len() });
    }
    for (ty, value) in types.iter().zip(values) {
        check_schema(ty, value)?;
    }
    encode_seq(values)
}

fn check_schema(ty: &AbiType, value: &AbiValue) -> Result<(), AbiError> {
    match (ty, value) {
        (AbiType::Uint(a), AbiValue::Uint(b, _))
        | (AbiType::Int(a), AbiValue::Int(b, _)) if a == b => Ok(()),
        (AbiType::Address, AbiValue::Address(_))
        | (AbiType::Bool, AbiValue::Bool(_))
        | (AbiType::Bytes, AbiValue::Bytes(_))
        | (AbiType::String, AbiValue::String(_)) => Ok(()),
        (AbiType::FixedBytes(n), AbiValue::FixedBytes(data)) if *n as usize == data.len() => {
            Ok(())
        }
        (AbiType::Array(elem_ty), AbiValue::Array(elems)) => {
            elems.iter().try_for_each(|e| check_schema(elem_ty, e))
        }
        (AbiType::FixedArray(elem_ty, n), AbiValue::FixedArray(elems)) => {
            if elems.len() != *n {
                return Err(AbiError::ArityMismatch { expected: *n, actual: elems.len() });
            }
            elems.iter().try_for_each(|e| check_schema(elem_ty, e))
        }
        (AbiType::Tuple(field_tys), AbiValue::Tuple(fields)) => {
            if field_tys.len() != fields.len() {
                return Err(AbiError::ArityMismatch {
                    expected: field_tys.len(),
                    actual: fields.len(),
                });
            }
            field_tys.iter().zip(fields).try_for_each(|(t, v)| check_schema(t, v))
        }
        _ => Err(AbiError::SchemaMismatch { schema: ty.canonical() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brane_primitives::Address;
    use num_bigint::BigUint;

    #[test]
    fn encodes_static_tuple_inline() {
        let values = vec![
            AbiValue::Uint(256, BigUint::from(1u8)),
            AbiValue::Address(Address::from([0x11u8; 20])),
        ];
        let out = encode(&values).unwrap();
        assert_eq!(out.len(), 64);
        assert_eq!(out[31], 1);
        assert_eq!(&out[44..64], &[0x11u8; 20]);
    }

    #[test]
    fn encodes_dynamic_bytes_with_length_prefix_and_padding() {
        let values = vec![AbiValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef])];
        let out = encode(&values).unwrap();
        // head: one offset word (32), tail: length word + 4 bytes padded to 32.
        assert_eq!(out.len(), 32 + 32 + 32);
        assert_eq!(out[56..64], [0, 0, 0, 4]);
        assert_eq!(&out[64..68], &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn encodes_negative_int_as_twos_complement() {
        let values = vec![AbiValue::Int(256, BigInt::from(-1))];
        let out = encode(&values).unwrap();
        assert_eq!(out, vec![0xffu8; 32]);
    }

    #[test]
    fn schema_checked_encode_rejects_arity_mismatch() {
        let types = vec![AbiType::FixedArray(Box::new(AbiType::Uint(256)), 3)];
        let values = vec![AbiValue::FixedArray(vec![AbiValue::Uint(256, BigUint::from(1u8))])];
        let err = encode_with_schema(&types, &values).unwrap_err();
        assert!(matches!(err, AbiError::ArityMismatch { expected: 3, actual: 1 }));
    }

    #[test]
    fn schema_checked_encode_accepts_matching_shape() {
        let types = vec![AbiType::Uint(256), AbiType::Bool];
        let values = vec![AbiValue::Uint(256, BigUint::from(7u8)), AbiValue::Bool(true)];
        assert!(encode_with_schema(&types, &values).is_ok());
    }
}
