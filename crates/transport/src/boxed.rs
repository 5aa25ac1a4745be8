use crate::{Transport, TransportError, TransportFut};
use brane_json_rpc::{RequestPacket, ResponsePacket};
use std::fmt::Debug;
use tower::Service;

/// A type-erased, `Clone`-able [`Transport`].
///
/// Lets `brane-rpc-client` and `brane-provider` hold a single concrete type
/// (`BoxTransport`) while the application picks HTTP, WebSocket, or a mock
/// transport underneath.
#[repr(transparent)]
pub struct BoxTransport {
    inner: Box<dyn CloneTransport + Send + Sync>,
}

impl BoxTransport {
    /// Boxes a concrete transport.
    pub fn new<T>(inner: T) -> Self
    where
        T: Transport + Clone + Send + Sync,
    {
        Self { inner: Box::new(inner) }
    }
}

impl Debug for BoxTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxTransport").finish()
    }
}

impl Clone for BoxTransport {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone_box() }
    }
}

trait CloneTransport: Transport {
    fn clone_box(&self) -> Box<dyn CloneTransport + Send + Sync>;
}

impl<T> CloneTransport for T
where
    T: Transport + Clone + Send + Sync,
{
    fn clone_box(&self) -> Box<dyn CloneTransport + Send + Sync> {
        Box::new(self.clone())
    }
}

impl Service<RequestPacket> for BoxTransport {
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        self.inner.call(req)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn __compile_check() {
        fn inner<T: CloneTransport>(_: Option<T>) {
            todo!()
        }
        fn inner_2<T: Transport>(_: Option<T>) {
            todo!()
        }
        inner::<BoxTransport>(None);
        inner_2::<BoxTransport>(None);
    }
}
