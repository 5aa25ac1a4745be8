//! Local `secp256k1` [`Signer`](brane_signer::Signer) implementation:
//! in-memory private keys that sign deterministically (RFC 6979) and
//! zeroize their scalar on drop.

#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

mod error;
pub use error::LocalSignerError;

mod private_key;
pub use private_key::{PrivateKey, PrivateKeySigner};
