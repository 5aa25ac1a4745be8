#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![deny(unused_must_use, rust_2018_idioms)]

//! Persistent transport core (C13): a single long-lived, full-duplex
//! connection to a node, multiplexed request/response correlation,
//! subscription demultiplexing, reconnection, and backpressure.
//!
//! The system has three logical parts:
//! - The **frontend** ([`PubSubFrontend`]) is what the rest of Brane talks to. It implements
//!   [`Transport`](brane_transport::Transport) and issues requests/subscription instructions to
//!   the running service.
//! - The **service** (private) owns the correlation table, the subscription table, and the
//!   state machine ([`ConnectionState`]: `Connecting` / `Connected` / `Reconnecting` / `Closed`)
//!   from spec.md §4.9. It runs as a long-lived task spawned by [`PubSubConnect::into_service`].
//! - The **backend** is the live connection itself. Callers never instantiate one directly —
//!   implement [`PubSubConnect`] instead (see `brane-transport-ws`), and call
//!   [`PubSubConnect::into_service`].

mod config;
pub use config::{OnReconnect, PersistentTransportConfig};

mod connect;
pub use connect::PubSubConnect;

mod frontend;
pub use frontend::PubSubFrontend;

mod handle;
pub use handle::{ConnectionHandle, ConnectionInterface};

mod ix;

mod managers;

mod service;

mod state;
pub use state::ConnectionState;

mod sub;
pub use sub::{RawSubscription, Subscription, SubscriptionId, SubscriptionItem};
