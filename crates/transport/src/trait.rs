use crate::{BoxTransport, TransportError, TransportFut};
use brane_json_rpc::{RequestPacket, ResponsePacket};
use tower::Service;

/// A `Transport` is anything capable of transmitting a [`RequestPacket`] and
/// returning the matching [`ResponsePacket`]: an HTTP client, a persistent
/// WebSocket connection, or an in-memory mock.
///
/// This is the seam spec.md's C12/C13 implementations (`brane-transport-http`,
/// `brane-pubsub`) are built against; `brane-rpc-client` and `brane-provider`
/// are generic over it rather than over a concrete connection type.
///
/// Blanket-implemented for any `tower::Service` with the right associated
/// types, so a fresh transport only needs to implement `Service`.
pub trait Transport:
    Service<RequestPacket, Response = ResponsePacket, Error = TransportError, Future = TransportFut<'static>>
    + Send
    + Sync
{
    /// Boxes this transport, erasing its concrete type.
    fn boxed(self) -> BoxTransport
    where
        Self: Clone + Sized + Send + Sync + 'static,
    {
        BoxTransport::new(self)
    }
}

impl<T> Transport for T where
    T: Service<
            RequestPacket,
            Response = ResponsePacket,
            Error = TransportError,
            Future = TransportFut<'static>,
        > + Send
        + Sync
{
}
