use crate::{ix::PubSubInstruction, managers::InFlight, sub::SubscriptionId};
use brane_json_rpc::{RequestPacket, Response, ResponsePacket, SerializedRequest};
use brane_transport::{TransportError, TransportErrorKind, TransportFut};
use futures_util::{future::try_join_all, FutureExt, TryFutureExt};
use serde_json::value::RawValue;
use std::{
    future::Future,
    task::{Context, Poll},
    time::Duration,
};
use tokio::sync::{broadcast, mpsc, watch};

/// A `PubSubFrontend` is the [`Transport`](brane_transport::Transport) the
/// rest of Brane talks to: a cheap, cloneable handle to a running pubsub
/// service task.
#[derive(Debug, Clone)]
pub struct PubSubFrontend {
    tx: mpsc::UnboundedSender<PubSubInstruction>,
    writable: watch::Receiver<bool>,
    default_timeout: Duration,
}

impl PubSubFrontend {
    /// Creates a new frontend.
    pub(crate) const fn new(
        tx: mpsc::UnboundedSender<PubSubInstruction>,
        writable: watch::Receiver<bool>,
        default_timeout: Duration,
    ) -> Self {
        Self { tx, writable, default_timeout }
    }

    /// Gets the subscription channel for a local id.
    pub fn get_subscription(
        &self,
        id: SubscriptionId,
    ) -> impl Future<Output = Result<broadcast::Receiver<Box<RawValue>>, TransportError>> + Send + 'static
    {
        let backend_tx = self.tx.clone();
        async move {
            let (tx, rx) = tokio::sync::oneshot::channel();
            backend_tx
                .send(PubSubInstruction::GetSub(id, tx))
                .map_err(|_| TransportErrorKind::backend_gone())?;
            rx.await.map_err(|_| TransportErrorKind::backend_gone())
        }
    }

    /// Unsubscribes from a subscription. Idempotent.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<(), TransportError> {
        self.tx.send(PubSubInstruction::Unsubscribe(id)).map_err(|_| TransportErrorKind::backend_gone())
    }

    /// Waits for the channel to become writable, per spec.md §4.9's
    /// backpressure rule: a high-water mark on the outbound buffer gates
    /// submissions until the service drains back below the low-water mark,
    /// or `timeout` elapses, whichever comes first.
    async fn wait_writable(writable: &mut watch::Receiver<bool>, timeout: Duration) -> Result<(), TransportError> {
        if *writable.borrow() {
            return Ok(());
        }
        tokio::time::timeout(timeout, async {
            loop {
                if *writable.borrow() {
                    return;
                }
                if writable.changed().await.is_err() {
                    return;
                }
            }
        })
        .await
        .map_err(|_| TransportErrorKind::backpressure())
    }

    /// Sends a single request.
    pub fn send(
        &self,
        req: SerializedRequest,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send + 'static {
        let tx = self.tx.clone();
        let mut writable = self.writable.clone();
        let timeout = self.default_timeout;
        async move {
            Self::wait_writable(&mut writable, timeout).await?;

            let deadline = tokio::time::Instant::now() + timeout;
            let (in_flight, rx) = InFlight::new(req, deadline);
            tx.send(PubSubInstruction::Request(in_flight)).map_err(|_| TransportErrorKind::backend_gone())?;
            rx.await.map_err(|_| TransportErrorKind::backend_gone())?
        }
    }

    /// Sends a packet of requests, splitting a batch into individual
    /// requests dispatched to the correlation table, then re-assembling
    /// the responses into a single packet once all have resolved.
    pub fn send_packet(&self, req: RequestPacket) -> TransportFut<'static> {
        match req {
            RequestPacket::Single(req) => self.send(req).map_ok(ResponsePacket::Single).boxed(),
            RequestPacket::Batch(reqs) => try_join_all(reqs.into_iter().map(|req| self.send(req)))
                .map_ok(ResponsePacket::Batch)
                .boxed(),
        }
    }
}

impl tower::Service<RequestPacket> for PubSubFrontend {
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        (&*self).poll_ready(cx)
    }

    #[inline]
    fn call(&mut self, req: RequestPacket) -> Self::Future {
        (&*self).call(req)
    }
}

impl tower::Service<RequestPacket> for &PubSubFrontend {
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    #[inline]
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        let result = if self.tx.is_closed() { Err(TransportErrorKind::backend_gone()) } else { Ok(()) };
        Poll::Ready(result)
    }

    #[inline]
    fn call(&mut self, req: RequestPacket) -> Self::Future {
        self.send_packet(req)
    }
}
