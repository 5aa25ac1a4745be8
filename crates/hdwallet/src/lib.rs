//! BIP-39 mnemonics, BIP-32 hierarchical key derivation, and the
//! BIP-44 Ethereum derivation path.

mod bip32;
mod bip44;
mod error;
mod mnemonic;
mod wordlist;

pub use bip32::{ChildNumber, ExtendedPrivateKey};
pub use bip44::DerivationPath;
pub use error::Error;
pub use mnemonic::Mnemonic;
pub use wordlist::Wordlist;
