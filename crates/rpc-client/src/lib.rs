#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![deny(unused_must_use, rust_2018_idioms)]

//! Transport-agnostic JSON-RPC client (C11): request/response calls,
//! batching, a single-flight chain-id cache, and polling emulation of a
//! subscription over any [`Transport`](brane_transport::Transport).
//!
//! This crate does not implement a transport itself — see
//! `brane-transport-http` (C12) and `brane-pubsub` (C13).

#[macro_use]
extern crate tracing;

mod batch;
pub use batch::BatchRequest;

mod builder;
pub use builder::ClientBuilder;

mod builtin;
pub use builtin::{BuiltInConnectionString, ConnectionConfig};

mod call;
pub use call::RpcCall;

mod client;
pub use client::{ClientRef, RpcClient, WeakClient};

mod poller;
pub use poller::{PollChannel, PollTask};

mod stream;
pub use stream::PollerStream;

/// The error type returned by RPC client operations.
///
/// Every failure this layer produces — serialization, a server error
/// response, or a failure from the underlying transport — is already a
/// [`brane_transport::TransportError`]; this alias names that fact at the
/// crate boundary per the error-layering convention (`brane_provider::Error`
/// wraps this, which wraps `brane_transport::TransportError`).
pub type Error = brane_transport::TransportError;

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = brane_transport::TransportResult<T>;

#[cfg(feature = "ws")]
pub use brane_transport_ws::WsConnect;
