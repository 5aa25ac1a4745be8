use crate::{managers::InFlight, sub::SubscriptionId};
use serde_json::value::RawValue;
use std::fmt;
use tokio::sync::{broadcast, oneshot};

/// Instructions sent from the frontend to the running pubsub service.
pub(crate) enum PubSubInstruction {
    /// Send a request.
    Request(InFlight),
    /// Get the subscription channel for a local id.
    GetSub(SubscriptionId, oneshot::Sender<broadcast::Receiver<Box<RawValue>>>),
    /// Unsubscribe from a subscription. Idempotent: unsubscribing from an
    /// id that no longer exists is a no-op.
    Unsubscribe(SubscriptionId),
}

impl fmt::Debug for PubSubInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(req) => f.debug_tuple("Request").field(req).finish(),
            Self::GetSub(id, _) => f.debug_tuple("GetSub").field(id).finish(),
            Self::Unsubscribe(id) => f.debug_tuple("Unsubscribe").field(id).finish(),
        }
    }
}
