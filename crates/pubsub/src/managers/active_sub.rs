use crate::sub::SubscriptionId;
use brane_json_rpc::SerializedRequest;
use serde_json::value::RawValue;
use tokio::sync::broadcast;

/// An active subscription: the original `eth_subscribe` request (kept to
/// re-issue it after a reconnect) and the channel notifications are
/// broadcast on.
#[derive(Clone)]
pub(crate) struct ActiveSubscription {
    /// The subscription's local id.
    pub(crate) local_id: SubscriptionId,
    /// The serialized subscription request.
    pub(crate) request: SerializedRequest,
    /// The channel notifications are broadcast on.
    pub(crate) tx: broadcast::Sender<Box<RawValue>>,
}

impl std::fmt::Debug for ActiveSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channel_desc = format!("{} subscriber(s)", self.tx.receiver_count());
        f.debug_struct("ActiveSubscription")
            .field("local_id", &self.local_id)
            .field("req", &self.request)
            .field("tx", &channel_desc)
            .finish()
    }
}

impl ActiveSubscription {
    /// Creates a new active subscription from the request that created it.
    pub(crate) fn new(request: SerializedRequest) -> (Self, broadcast::Receiver<Box<RawValue>>) {
        let local_id = SubscriptionId::local_from_params(request.params());
        let (tx, rx) = broadcast::channel(16);
        (Self { request, local_id, tx }, rx)
    }

    /// Gets a reference to the serialized request, used to re-send it
    /// over the transport after a reconnect.
    pub(crate) const fn request(&self) -> &SerializedRequest {
        &self.request
    }

    /// Notifies the subscription channel of a new value, if any receiver
    /// exists; dropped otherwise.
    pub(crate) fn notify(&mut self, notification: Box<RawValue>) {
        if self.tx.receiver_count() > 0 {
            let _ = self.tx.send(notification);
        }
    }
}
