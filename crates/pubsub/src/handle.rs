use brane_json_rpc::PubSubItem;
use futures_util::{FutureExt, Stream};
use serde_json::value::RawValue;
use std::task::Poll;
use tokio::sync::{mpsc, oneshot};

/// A handle to a backend. Communicates with a [`ConnectionInterface`] owned
/// by the backend.
///
/// The backend SHOULD shut down when the handle is dropped (as indicated by
/// the shutdown channel).
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Outbound channel to the server.
    pub(crate) to_socket: mpsc::UnboundedSender<Box<RawValue>>,

    /// Inbound channel from the remote server.
    pub(crate) from_socket: mpsc::UnboundedReceiver<PubSubItem>,

    /// Notification from the backend of a terminal error.
    pub(crate) error: oneshot::Receiver<()>,

    /// Notifies the backend of intentional shutdown.
    pub(crate) shutdown: oneshot::Sender<()>,
}

impl ConnectionHandle {
    /// Creates a new connection handle, paired with the [`ConnectionInterface`]
    /// the backend task owns.
    pub fn new() -> (Self, ConnectionInterface) {
        let (to_socket, from_frontend) = mpsc::unbounded_channel();
        let (to_frontend, from_socket) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = Self { to_socket, from_socket, error: error_rx, shutdown: shutdown_tx };
        let interface = ConnectionInterface {
            from_frontend,
            to_frontend,
            error: error_tx,
            shutdown: shutdown_rx,
            dead: false,
        };
        (handle, interface)
    }

    /// Shuts down the backend.
    pub fn shutdown(self) {
        let _ = self.shutdown.send(());
    }
}

/// The reciprocal of [`ConnectionHandle`], owned by the backend task.
///
/// Implements [`Stream`] to receive requests from the frontend; the stream
/// ends permanently once the shutdown channel resolves. Responses go back
/// via [`ConnectionInterface::send_to_frontend`]; a terminal error is
/// signalled via [`ConnectionInterface::close_with_error`].
#[derive(Debug)]
pub struct ConnectionInterface {
    /// Inbound channel from the frontend.
    pub(crate) from_frontend: mpsc::UnboundedReceiver<Box<RawValue>>,

    /// Channel of items to the frontend.
    pub(crate) to_frontend: mpsc::UnboundedSender<PubSubItem>,

    /// Notifies the frontend of a terminal error.
    pub(crate) error: oneshot::Sender<()>,

    /// Causes local shutdown when the sender is triggered or dropped.
    pub(crate) shutdown: oneshot::Receiver<()>,

    /// `true` once the shutdown command has been received.
    dead: bool,
}

impl ConnectionInterface {
    /// Sends a pubsub item to the frontend.
    pub fn send_to_frontend(
        &self,
        item: PubSubItem,
    ) -> Result<(), mpsc::error::SendError<PubSubItem>> {
        self.to_frontend.send(item)
    }

    /// Receives a request from the frontend.
    pub async fn recv_from_frontend(&mut self) -> Option<Box<RawValue>> {
        self.from_frontend.recv().await
    }

    /// Closes the interface, signalling a terminal error to the frontend.
    pub fn close_with_error(self) {
        let _ = self.error.send(());
    }
}

impl Stream for ConnectionInterface {
    type Item = Box<RawValue>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        if self.dead {
            return Poll::Ready(None);
        }

        if self.shutdown.poll_unpin(cx).is_ready() {
            self.dead = true;
            return Poll::Ready(None);
        }

        self.from_frontend.poll_recv(cx)
    }
}
