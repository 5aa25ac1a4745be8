use crate::AbiType;
use brane_primitives::keccak256;

/// Computes a 4-byte function selector: the first 4 bytes of
/// `keccak256("name(type,type,...)")`, with tuple parameter types expanded
/// recursively.
pub fn selector(name: &str, params: &[AbiType]) -> [u8; 4] {
    let signature = canonical_signature(name, params);
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// The canonical `name(type,type,...)` signature string a selector is
/// computed from.
pub fn canonical_signature(name: &str, params: &[AbiType]) -> String {
    let joined = params.iter().map(AbiType::canonical).collect::<Vec<_>>().join(",");
    format!("{name}({joined})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_selector_matches_known_value() {
        // transfer(address,uint256) -> 0xa9059cbb
        let sel = selector("transfer", &[AbiType::Address, AbiType::Uint(256)]);
        assert_eq!(sel, [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn balance_of_selector_matches_known_value() {
        // balanceOf(address) -> 0x70a08231
        let sel = selector("balanceOf", &[AbiType::Address]);
        assert_eq!(sel, [0x70, 0xa0, 0x82, 0x31]);
    }
}
