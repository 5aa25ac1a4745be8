use crate::sub::SubscriptionId;
use brane_json_rpc::{Response, ResponsePayload, SerializedRequest};
use brane_transport::{TransportError, TransportErrorKind};
use tokio::{sync::oneshot, time::Instant};

/// An in-flight JSON-RPC request: the request that was sent, a channel to
/// deliver the response on, and the deadline after which it's expired by
/// the service's sweep (spec.md §4.9's timing-wheel obligation).
pub(crate) struct InFlight {
    /// The request.
    pub(crate) request: SerializedRequest,

    /// The channel to send the response on.
    pub(crate) tx: oneshot::Sender<Result<Response, TransportError>>,

    /// When this request expires if no response arrives.
    pub(crate) deadline: Instant,
}

impl std::fmt::Debug for InFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channel_desc =
            if self.tx.is_closed() { "closed (cancelled)" } else { "ok" };
        f.debug_struct("InFlight")
            .field("req", &self.request)
            .field("tx", &channel_desc)
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl InFlight {
    /// Creates a new in-flight request with the given deadline.
    pub(crate) fn new(
        request: SerializedRequest,
        deadline: Instant,
    ) -> (Self, oneshot::Receiver<Result<Response, TransportError>>) {
        let (tx, rx) = oneshot::channel();
        (Self { request, tx, deadline }, rx)
    }

    /// Gets the method.
    pub(crate) const fn method(&self) -> &'static str {
        self.request.method()
    }

    /// Gets a reference to the serialized request, used to (re-)send it
    /// over the transport.
    pub(crate) const fn request(&self) -> &SerializedRequest {
        &self.request
    }

    /// `true` if the user side of this request's channel has been dropped
    /// (the caller cancelled, per spec.md §4.9's best-effort cancellation).
    pub(crate) fn is_cancelled(&self) -> bool {
        self.tx.is_closed()
    }

    /// Fails this request with a `Timeout` error, consuming it.
    pub(crate) fn expire(self) {
        let _ = self.tx.send(Err(TransportErrorKind::timeout()));
    }

    /// Fails this request with `err`, consuming it. Used when the
    /// connection drops while this request is pending (C13's
    /// `RECONNECTING` entry).
    pub(crate) fn fail(self, err: TransportError) {
        let _ = self.tx.send(Err(err));
    }

    /// Fulfills the request with a response, consuming it. If the request
    /// is a subscription and the response is not an error, the new local
    /// id and this in-flight request are returned so the caller can bind
    /// it to the server-assigned id.
    pub(crate) fn fulfill(self, resp: Response) -> Option<(SubscriptionId, Self)> {
        if self.method() == "eth_subscribe" {
            if let ResponsePayload::Success(val) = &resp.payload {
                let server_id: serde_json::Result<String> = serde_json::from_str(val.get());
                return match server_id {
                    Ok(raw) => Some((SubscriptionId::from_server_str(raw), self)),
                    Err(e) => {
                        let text = val.get().to_owned();
                        let _ = self.tx.send(Err(TransportError::deser_err(e, text)));
                        None
                    }
                };
            }
        }

        let _ = self.tx.send(Ok(resp));
        None
    }
}
