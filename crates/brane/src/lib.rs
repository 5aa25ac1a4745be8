#![doc = include_str!("../README.md")]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![deny(unused_must_use, rust_2018_idioms)]

/* --------------------------------------- Core re-exports -------------------------------------- */

#[doc(inline)]
pub use brane_primitives as primitives;
#[doc(no_inline)]
pub use primitives::{Address, Bytes, Hash, Wei};

#[cfg(feature = "dyn-abi")]
#[doc(inline)]
pub use brane_dyn_abi as dyn_abi;

#[cfg(feature = "rlp")]
#[doc(inline)]
pub use brane_rlp as rlp;

/* --------------------------------------- Main re-exports -------------------------------------- */

#[cfg(feature = "consensus")]
#[doc(inline)]
pub use brane_consensus as consensus;

#[cfg(feature = "eips")]
#[doc(inline)]
pub use brane_eips as eips;

#[cfg(feature = "hdwallet")]
#[doc(inline)]
pub use brane_hdwallet as hdwallet;

/// Interface with an Ethereum node: the `Reader`/`Signer`/`Tester`
/// capability facade, gas strategy, and multicall batching.
///
/// See [`brane_provider`] for more details.
#[cfg(feature = "providers")]
pub mod providers {
    #[doc(inline)]
    pub use brane_provider::*;
}

/// Ethereum JSON-RPC publish-subscribe transport.
///
/// You will likely not need to use this module directly; see
/// [`providers`] for high-level usage.
///
/// See [`brane_pubsub`] for more details.
#[doc = "\n"]
#[cfg_attr(feature = "providers", doc = "[`providers`]: crate::providers")]
#[cfg_attr(
    not(feature = "providers"),
    doc = "[`providers`]: https://github.com/brane-rs/brane/tree/main/crates/provider"
)]
#[cfg(feature = "pubsub")]
pub mod pubsub {
    #[doc(inline)]
    pub use brane_pubsub::*;
}

/// Ethereum JSON-RPC client and types.
#[cfg(feature = "rpc")]
pub mod rpc {
    #[cfg(feature = "rpc-client")]
    #[doc(inline)]
    pub use brane_rpc_client as client;

    #[cfg(feature = "json-rpc")]
    #[doc(inline)]
    pub use brane_json_rpc as json_rpc;
}

/// Key management and transaction signing.
///
/// See [`brane_signer`] for more details.
#[cfg(feature = "signers")]
pub mod signers {
    #[doc(inline)]
    pub use brane_signer::*;

    #[cfg(feature = "signer-local")]
    #[doc(inline)]
    pub use brane_signer_local as local;
}

/// Low-level Ethereum JSON-RPC transport abstraction and implementations.
///
/// You will likely not need to use this module directly; see
/// [`providers`] for high-level usage of transports.
///
/// See [`brane_transport`] for more details.
#[doc = "\n"]
#[cfg_attr(feature = "providers", doc = "[`providers`]: crate::providers")]
#[cfg_attr(
    not(feature = "providers"),
    doc = "[`providers`]: https://github.com/brane-rs/brane/tree/main/crates/provider"
)]
#[cfg(feature = "transports")]
pub mod transports {
    #[doc(inline)]
    pub use brane_transport::*;

    #[cfg(feature = "transport-http")]
    #[doc(inline)]
    pub use brane_transport_http as http;

    #[cfg(feature = "transport-ws")]
    #[doc(inline)]
    pub use brane_transport_ws as ws;
}
