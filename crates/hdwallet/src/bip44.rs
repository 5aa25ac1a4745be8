use crate::bip32::{ChildNumber, ExtendedPrivateKey};
use crate::error::Error;

/// The standard Ethereum BIP-44 path: `m/44'/60'/account'/0/addressIndex`.
///
/// Only this shape is supported (purpose `44'`, coin type `60'` fixed, the
/// change level fixed to external `0`); callers choose `account` and
/// `address_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationPath {
    account: u32,
    address_index: u32,
}

const PURPOSE: u32 = 44;
const COIN_TYPE_ETH: u32 = 60;
const CHANGE_EXTERNAL: u32 = 0;

impl DerivationPath {
    /// Builds the path for a given account and address index, both of
    /// which must be `< 2^31` (they are hardened-ineligible leaf indices).
    pub fn new(account: u32, address_index: u32) -> Result<Self, Error> {
        ChildNumber::hardened(account)?;
        ChildNumber::normal(address_index)?;
        Ok(Self {
            account,
            address_index,
        })
    }

    /// Parses a path string of the exact form `m/44'/60'/account'/0/index`.
    pub fn parse(path: &str) -> Result<Self, Error> {
        let mut segments = path.split('/');
        let root = segments.next().ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        if root != "m" {
            return Err(Error::InvalidPath(path.to_string()));
        }

        let levels: Vec<&str> = segments.collect();
        if levels.len() != 5 {
            return Err(Error::InvalidPath(path.to_string()));
        }

        let purpose = parse_hardened_level(levels[0], path)?;
        let coin_type = parse_hardened_level(levels[1], path)?;
        let account = parse_hardened_level(levels[2], path)?;
        let change = parse_plain_level(levels[3], path)?;
        let address_index = parse_plain_level(levels[4], path)?;

        if purpose != PURPOSE || coin_type != COIN_TYPE_ETH || change != CHANGE_EXTERNAL {
            return Err(Error::InvalidPath(path.to_string()));
        }

        Self::new(account, address_index)
    }

    /// The account-level index (hardened).
    pub fn account(&self) -> u32 {
        self.account
    }

    /// The address index at the leaf of the path.
    pub fn address_index(&self) -> u32 {
        self.address_index
    }

    /// Derives the leaf extended key for this path from a BIP-39 seed,
    /// walking `m/44'/60'/account'/0/addressIndex` one level at a time.
    ///
    /// Every intermediate extended key is dropped (and its scalar zeroed by
    /// `SigningKey`'s own `Drop`) as soon as the next level is produced; only
    /// the master and the final leaf outlive this call.
    pub fn derive(&self, seed: &[u8]) -> Result<ExtendedPrivateKey, Error> {
        let master = ExtendedPrivateKey::from_seed(seed)?;
        let purpose = master.derive_child(ChildNumber::hardened(PURPOSE)?)?;
        let coin_type = purpose.derive_child(ChildNumber::hardened(COIN_TYPE_ETH)?)?;
        let account = coin_type.derive_child(ChildNumber::hardened(self.account)?)?;
        let change = account.derive_child(ChildNumber::normal(CHANGE_EXTERNAL)?)?;
        change.derive_child(ChildNumber::normal(self.address_index)?)
    }
}

fn parse_hardened_level(segment: &str, path: &str) -> Result<u32, Error> {
    let stripped = segment
        .strip_suffix('\'')
        .ok_or_else(|| Error::InvalidPath(path.to_string()))?;
    stripped
        .parse()
        .map_err(|_| Error::InvalidPath(path.to_string()))
}

fn parse_plain_level(segment: &str, path: &str) -> Result<u32, Error> {
    segment
        .parse()
        .map_err(|_| Error::InvalidPath(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_default_account_path() {
        let path = DerivationPath::parse("m/44'/60'/0'/0/0").unwrap();
        assert_eq!(path.account(), 0);
        assert_eq!(path.address_index(), 0);
    }

    #[test]
    fn parses_nonzero_account_and_index() {
        let path = DerivationPath::parse("m/44'/60'/2'/0/7").unwrap();
        assert_eq!(path.account(), 2);
        assert_eq!(path.address_index(), 7);
    }

    #[test]
    fn rejects_wrong_coin_type() {
        assert!(DerivationPath::parse("m/44'/0'/0'/0/0").is_err());
    }

    #[test]
    fn rejects_missing_hardened_marker() {
        assert!(DerivationPath::parse("m/44/60'/0'/0/0").is_err());
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!(DerivationPath::parse("m/44'/60'/0'/0").is_err());
    }

    #[test]
    fn derivation_is_deterministic_across_calls() {
        let seed = [0x99u8; 64];
        let path = DerivationPath::new(0, 0).unwrap();
        let a = path.derive(&seed).unwrap();
        let b = path.derive(&seed).unwrap();
        assert_eq!(*a.secret_bytes(), *b.secret_bytes());
    }

    #[test]
    fn different_address_indices_derive_different_keys() {
        let seed = [0x23u8; 64];
        let first = DerivationPath::new(0, 0).unwrap().derive(&seed).unwrap();
        let second = DerivationPath::new(0, 1).unwrap().derive(&seed).unwrap();
        assert_ne!(*first.secret_bytes(), *second.secret_bytes());
    }
}
