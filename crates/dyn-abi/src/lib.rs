//! Runtime-typed Ethereum ABI encoding and decoding: the [`AbiType`] schema
//! and [`AbiValue`] value sum types, a head/tail [`encoder`], and a
//! bounds-checked [`decoder`] safe against adversarial input.

#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

mod error;
pub use error::AbiError;

mod types;
pub use types::AbiType;

mod value;
pub use value::AbiValue;

pub mod encoder;
pub mod decoder;

mod selector;
pub use selector::{canonical_signature, selector};

pub use encoder::{encode, encode_function_call, encode_with_schema};
pub use decoder::decode;
