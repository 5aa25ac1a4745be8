use crate::{config::PersistentTransportConfig, handle::ConnectionHandle, service::PubSubService, PubSubFrontend};
use brane_transport::TransportResult;
use std::future::Future;

/// Configuration objects that contain connection details for a backend.
///
/// Implementors hold the configuration for the underlying transport (a
/// WebSocket URL, an IPC socket path, ...) and are responsible for spawning
/// the backend task.
pub trait PubSubConnect: Sized + Send + Sync + 'static {
    /// Returns `true` if the transport connects to a local resource.
    fn is_local(&self) -> bool;

    /// Spawns the backend, returning a handle to it.
    ///
    /// This MUST create a long-lived task owning a
    /// [`ConnectionInterface`](crate::ConnectionInterface), and return the
    /// corresponding handle.
    fn connect(&self) -> impl Future<Output = TransportResult<ConnectionHandle>> + Send;

    /// Attempts to reconnect the transport.
    ///
    /// The default forwards to [`connect`](Self::connect); override to add
    /// connector-specific reconnection logic (e.g. re-resolving DNS).
    fn try_reconnect(&self) -> impl Future<Output = TransportResult<ConnectionHandle>> + Send {
        self.connect()
    }

    /// Converts the configuration object into a running service with a
    /// running backend, using default [`PersistentTransportConfig`].
    fn into_service(self) -> impl Future<Output = TransportResult<PubSubFrontend>> + Send {
        self.into_service_with(PersistentTransportConfig::default())
    }

    /// Like [`into_service`](Self::into_service), with an explicit
    /// [`PersistentTransportConfig`].
    fn into_service_with(
        self,
        config: PersistentTransportConfig,
    ) -> impl Future<Output = TransportResult<PubSubFrontend>> + Send {
        PubSubService::connect(self, config)
    }
}
