use crate::AbiType;
use brane_primitives::Address;
use num_bigint::{BigInt, BigUint};

/// A runtime-typed Ethereum ABI value, paired with an [`AbiType`] schema
/// during encoding and decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiValue {
    /// A `uint<bits>` value.
    Uint(u16, BigUint),
    /// An `int<bits>` value.
    Int(u16, BigInt),
    /// An `address` value.
    Address(Address),
    /// A `bool` value.
    Bool(bool),
    /// A `bytes<len>` value; `data.len() == len`.
    FixedBytes(Vec<u8>),
    /// A `bytes` value.
    Bytes(Vec<u8>),
    /// A `string` value.
    String(String),
    /// A `T[]` value.
    Array(Vec<AbiValue>),
    /// A `T[N]` value.
    FixedArray(Vec<AbiValue>),
    /// A `(T1, T2, ...)` value.
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// The [`AbiType`] this value would encode under, inferred structurally
    /// (widths for arrays/tuples come from their elements).
    pub fn schema(&self) -> AbiType {
        match self {
            AbiValue::Uint(bits, _) => AbiType::Uint(*bits),
            AbiValue::Int(bits, _) => AbiType::Int(*bits),
            AbiValue::Address(_) => AbiType::Address,
            AbiValue::Bool(_) => AbiType::Bool,
            AbiValue::FixedBytes(data) => AbiType::FixedBytes(data.len() as u8),
            AbiValue::Bytes(_) => AbiType::Bytes,
            AbiValue::String(_) => AbiType::String,
            AbiValue::Array(elems) => {
                let elem_ty = elems.first().map(AbiValue::schema).unwrap_or(AbiType::Uint(256));
                AbiType::Array(Box::new(elem_ty))
            }
            AbiValue::FixedArray(elems) => {
                let elem_ty = elems.first().map(AbiValue::schema).unwrap_or(AbiType::Uint(256));
                AbiType::FixedArray(Box::new(elem_ty), elems.len())
            }
            AbiValue::Tuple(fields) => AbiType::Tuple(fields.iter().map(AbiValue::schema).collect()),
        }
    }
}
