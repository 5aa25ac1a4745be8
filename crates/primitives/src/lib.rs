//! Core byte, hex, address and hash primitives shared across the Brane
//! workspace.
//!
//! This crate plays the role `alloy-primitives` plays for the teacher
//! workspace: every other crate depends on it for [`Address`], [`Hash`],
//! [`Bytes`], [`Wei`] and the [`keccak256`] hash function.

#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

mod address;
mod bytes;
mod error;
mod hash;
mod keccak;
mod wei;

pub use address::Address;
pub use bytes::Bytes;
pub use error::PrimitiveError;
pub use hash::Hash;
pub use keccak::{keccak256, Keccak256};
pub use wei::{ChainId, Wei};

pub use hex;

/// A 20-byte fixed array, the underlying storage of [`Address`].
pub type AddressBytes = [u8; 20];
/// A 32-byte fixed array, the underlying storage of [`Hash`].
pub type HashBytes = [u8; 32];
