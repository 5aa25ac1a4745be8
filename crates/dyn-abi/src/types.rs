use std::fmt;

/// A runtime-typed Ethereum ABI schema node.
///
/// Mirrors the Solidity ABI type universe: static scalars, fixed- and
/// variable-size arrays, and tuples, any of which may be dynamic (require a
/// head/tail encoding) depending on their contents.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// `uint<bits>`, `bits` a multiple of 8 in `8..=256`.
    Uint(u16),
    /// `int<bits>`, `bits` a multiple of 8 in `8..=256`.
    Int(u16),
    /// `address`.
    Address,
    /// `bool`.
    Bool,
    /// `bytes<len>`, `len` in `1..=32`.
    FixedBytes(u8),
    /// `bytes`.
    Bytes,
    /// `string`.
    String,
    /// `T[]`.
    Array(Box<AbiType>),
    /// `T[N]`.
    FixedArray(Box<AbiType>, usize),
    /// `(T1, T2, ...)`.
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// `true` if a value of this type requires a head/tail (offset +
    /// out-of-line body) encoding rather than an inline word sequence.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Uint(_)
            | AbiType::Int(_)
            | AbiType::Address
            | AbiType::Bool
            | AbiType::FixedBytes(_) => false,
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(elem, _) => elem.is_dynamic(),
            AbiType::Tuple(fields) => fields.iter().any(AbiType::is_dynamic),
        }
    }

    /// The number of 32-byte head words a *static* value of this type
    /// occupies. Must not be called on a dynamic type.
    pub(crate) fn head_words(&self) -> usize {
        debug_assert!(!self.is_dynamic(), "head_words called on a dynamic type");
        match self {
            AbiType::FixedArray(elem, len) => elem.head_words() * len,
            AbiType::Tuple(fields) => fields.iter().map(AbiType::head_words).sum(),
            _ => 1,
        }
    }

    /// The canonical Solidity type string used in function signatures
    /// (`uint256`, `(uint256,address)[]`, ...).
    pub fn canonical(&self) -> String {
        match self {
            AbiType::Uint(bits) => format!("uint{bits}"),
            AbiType::Int(bits) => format!("int{bits}"),
            AbiType::Address => "address".to_owned(),
            AbiType::Bool => "bool".to_owned(),
            AbiType::FixedBytes(len) => format!("bytes{len}"),
            AbiType::Bytes => "bytes".to_owned(),
            AbiType::String => "string".to_owned(),
            AbiType::Array(elem) => format!("{}[]", elem.canonical()),
            AbiType::FixedArray(elem, len) => format!("{}[{len}]", elem.canonical()),
            AbiType::Tuple(fields) => {
                let inner = fields.iter().map(AbiType::canonical).collect::<Vec<_>>().join(",");
                format!("({inner})")
            }
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_scalars_are_not_dynamic() {
        assert!(!AbiType::Uint(256).is_dynamic());
        assert!(!AbiType::Address.is_dynamic());
        assert!(!AbiType::FixedBytes(32).is_dynamic());
    }

    #[test]
    fn bytes_string_and_arrays_are_dynamic() {
        assert!(AbiType::Bytes.is_dynamic());
        assert!(AbiType::String.is_dynamic());
        assert!(AbiType::Array(Box::new(AbiType::Uint(256))).is_dynamic());
    }

    #[test]
    fn fixed_array_dynamic_follows_element() {
        assert!(!AbiType::FixedArray(Box::new(AbiType::Uint(256)), 3).is_dynamic());
        assert!(AbiType::FixedArray(Box::new(AbiType::String), 3).is_dynamic());
    }

    #[test]
    fn tuple_dynamic_if_any_field_dynamic() {
        let t = AbiType::Tuple(vec![AbiType::Uint(256), AbiType::String]);
        assert!(t.is_dynamic());
        let t = AbiType::Tuple(vec![AbiType::Uint(256), AbiType::Address]);
        assert!(!t.is_dynamic());
    }

    #[test]
    fn canonical_strings_match_solidity_signatures() {
        assert_eq!(AbiType::Uint(256).canonical(), "uint256");
        assert_eq!(AbiType::Array(Box::new(AbiType::Address)).canonical(), "address[]");
        let t = AbiType::Tuple(vec![AbiType::Uint(256), AbiType::Address]);
        assert_eq!(t.canonical(), "(uint256,address)");
        let nested = AbiType::Array(Box::new(t));
        assert_eq!(nested.canonical(), "(uint256,address)[]");
    }
}
