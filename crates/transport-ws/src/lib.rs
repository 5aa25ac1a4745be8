#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![deny(unused_must_use, rust_2018_idioms)]

//! WebSocket connector (C13) for [`brane_pubsub`]: implements
//! [`PubSubConnect`](brane_pubsub::PubSubConnect) over `tokio-tungstenite`
//! and drives the `ConnectionInterface` read/write loop.

#[macro_use]
extern crate tracing;

use brane_pubsub::ConnectionInterface;

mod backend;
pub use backend::WsConnect;

/// An ongoing connection to a backend.
///
/// Users should NEVER instantiate a backend directly. Use [`PubSubConnect`]
/// to get a running service with a running backend.
///
/// [`PubSubConnect`]: brane_pubsub::PubSubConnect
#[derive(Debug)]
pub struct WsBackend<T> {
    /// The websocket connection.
    pub(crate) socket: T,

    /// The interface to the connection.
    pub(crate) interface: ConnectionInterface,
}

impl<T> WsBackend<T> {
    /// Handles inbound text from the websocket.
    #[allow(clippy::result_unit_err)]
    pub fn handle_text(&mut self, text: &str) -> Result<(), ()> {
        trace!(%text, "received message from websocket");

        match serde_json::from_str(text) {
            Ok(item) => {
                trace!(?item, "deserialized message");
                if let Err(err) = self.interface.send_to_frontend(item) {
                    error!(item=?err.0, "failed to send deserialized item to handler");
                    return Err(());
                }
            }
            Err(err) => {
                error!(%err, "failed to deserialize message");
                return Err(());
            }
        }
        Ok(())
    }
}
