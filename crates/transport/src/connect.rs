use crate::{BoxTransport, Pbf, Transport, TransportError};

/// Connection details for a transport: what it takes to establish one, and
/// whether it points at a local endpoint.
///
/// Implement this to customize how a transport is built (a pre-configured
/// `reqwest::Client`, non-default auth, a custom reconnection policy) while
/// letting callers stay generic over `TransportConnect` rather than a
/// concrete connector type.
pub trait TransportConnect: Sized + Send + Sync + 'static {
    /// The transport type produced by [`Self::get_transport`].
    type Transport: Transport + Clone;

    /// `true` if this connects to a local resource (used to decide whether
    /// a caller should trust it for potentially sensitive RPC methods).
    fn is_local(&self) -> bool;

    /// Establishes the transport.
    fn get_transport<'a: 'b, 'b>(&'a self) -> Pbf<'b, Self::Transport, TransportError>;
}

/// Object-safe counterpart to [`TransportConnect`], for callers that need
/// to hold several different connectors behind `dyn BoxTransportConnect`.
pub trait BoxTransportConnect {
    /// `true` if this connects to a local resource.
    fn is_local(&self) -> bool;

    /// Establishes the transport and boxes it.
    fn get_boxed_transport<'a: 'b, 'b>(&'a self) -> Pbf<'b, BoxTransport, TransportError>;
}

impl<T> BoxTransportConnect for T
where
    T: TransportConnect,
{
    fn is_local(&self) -> bool {
        TransportConnect::is_local(self)
    }

    fn get_boxed_transport<'a: 'b, 'b>(&'a self) -> Pbf<'b, BoxTransport, TransportError> {
        Box::pin(async move { self.get_transport().await.map(Transport::boxed) })
    }
}
