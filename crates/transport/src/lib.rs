//! Low-level transport abstraction shared by every way Brane talks to a
//! node: the `Transport` trait, its type-erased `BoxTransport` form, and the
//! crate-wide transport error and retry types (C12/C13/C14).
//!
//! This crate does not implement a connection itself — see
//! `brane-transport-http` (C12) and `brane-pubsub` (C13).

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![deny(unused_must_use, rust_2018_idioms)]

mod boxed;
pub use boxed::BoxTransport;

mod connect;
pub use connect::{BoxTransportConnect, TransportConnect};

mod common;
pub use common::Authorization;

mod error;
#[doc(hidden)]
pub use error::TransportErrorKind;
pub use error::{TransportError, TransportResult};

mod r#trait;
pub use r#trait::Transport;

mod retry;
pub use retry::{
    DefaultRetryPolicy, RetryBackoffLayer, RetryBackoffService, RetryExhausted, RetryPolicy,
    RpcRetryConfig,
};

pub use brane_json_rpc::{RpcError, RpcResult};

/// Misc. utilities for building transports.
pub mod utils;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use brane_json_rpc::ResponsePacket;

/// Pin-boxed future.
pub type Pbf<'a, T, E> = std::pin::Pin<Box<dyn std::future::Future<Output = Result<T, E>> + Send + 'a>>;

/// Future for transport-level requests.
pub type TransportFut<'a, T = ResponsePacket, E = TransportError> =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<T, E>> + Send + 'a>>;

/// Future for RPC-level requests.
pub type RpcFut<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = TransportResult<T>> + Send + 'a>>;
