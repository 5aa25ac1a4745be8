//! Signer abstraction: the [`Signer`] trait and the [`Signature`] type
//! every Brane transaction and message signature is expressed in.
//!
//! Concrete backends (a local ECDSA key, eventually a remote signer) live
//! in their own crates and implement [`Signer`]; this crate only defines
//! the contract, shared ECDSA signature plumbing, and the error type
//! every backend reports through.

#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

mod error;
pub use error::{Error, Result, UnsupportedSignerOperation};

mod signature;
pub use signature::{eip191_hash_message, public_key_to_address, to_eip155_v, Signature};

mod signer;
pub use signer::{Signer, UnimplementedSigner};
