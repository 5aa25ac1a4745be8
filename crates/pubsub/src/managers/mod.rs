//! Correlation and subscription bookkeeping for the pubsub service loop
//! (spec.md §4.9): a request-id keyed table of pending requests, and a
//! local-id/server-id bimap of active subscriptions.

mod active_sub;
pub(crate) use active_sub::ActiveSubscription;

mod in_flight;
pub(crate) use in_flight::InFlight;

use crate::sub::SubscriptionId;
use bimap::BiMap;
use brane_json_rpc::{EthNotification, Id, Response};
use serde_json::value::RawValue;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// The correlation table: every outbound request, keyed by its request id,
/// with the oneshot resolver that completes it.
#[derive(Debug, Default)]
pub(crate) struct RequestManager {
    pending: HashMap<Id, InFlight>,
}

impl RequestManager {
    /// Inserts a newly-dispatched in-flight request.
    pub(crate) fn insert(&mut self, in_flight: InFlight) {
        self.pending.insert(in_flight.request().id().clone(), in_flight);
    }

    /// The number of pending requests.
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Iterates over the pending requests.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Id, &InFlight)> {
        self.pending.iter()
    }

    /// Matches an inbound response to its pending request, removing it from
    /// the table. Unmatched ids are dropped (and logged by the caller).
    ///
    /// If the matched request was an `eth_subscribe` call, returns the
    /// server-assigned subscription id alongside the in-flight request so
    /// the caller can bind it in the [`SubscriptionManager`].
    pub(crate) fn handle_response(&mut self, resp: Response) -> Option<(SubscriptionId, InFlight)> {
        let in_flight = self.pending.remove(&resp.id)?;
        in_flight.fulfill(resp)
    }

    /// Removes and fails every pending request whose deadline has elapsed,
    /// or whose caller has dropped the response channel (cancelled).
    /// Returns the number of requests expired (not cancelled) for metrics.
    pub(crate) fn sweep(&mut self, now: Instant) -> usize {
        let mut expired = 0;
        self.pending.retain(|_, in_flight| {
            if in_flight.is_cancelled() {
                return false;
            }
            if in_flight.deadline <= now {
                expired += 1;
                return false;
            }
            true
        });
        expired
    }

    /// Drains and fails every pending request with `err`, invoked when the
    /// connection drops (C13's `RECONNECTING` entry) or the service closes.
    pub(crate) fn fail_all(&mut self, err: impl Fn() -> brane_transport::TransportError) {
        for (_, in_flight) in self.pending.drain() {
            in_flight.fail(err());
        }
    }

    /// The serialized requests for every still-pending entry, used to
    /// re-issue them after a reconnect.
    pub(crate) fn pending_requests(&self) -> Vec<Box<RawValue>> {
        self.pending.values().map(|f| f.request().clone().take_request()).collect()
    }
}

/// The subscription table: active subscriptions keyed by local id, and a
/// bimap correlating local ids to server-assigned ids.
#[derive(Debug, Default)]
pub(crate) struct SubscriptionManager {
    subs: HashMap<SubscriptionId, ActiveSubscription>,
    aliases: BiMap<SubscriptionId, SubscriptionId>,
}

impl SubscriptionManager {
    /// The number of active subscriptions.
    pub(crate) fn len(&self) -> usize {
        self.subs.len()
    }

    /// Iterates over the active subscriptions.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&SubscriptionId, &ActiveSubscription)> {
        self.subs.iter()
    }

    /// Gets a fresh receiver for a subscription by its local id.
    pub(crate) fn get_rx(&self, local_id: &SubscriptionId) -> Option<broadcast::Receiver<Box<RawValue>>> {
        self.subs.get(local_id).map(|sub| sub.tx.subscribe())
    }

    /// Binds an `eth_subscribe` request to its server-assigned id, creating
    /// the subscription if this is the first time it's been seen, or
    /// re-binding (after a reconnect) if it already exists.
    pub(crate) fn upsert(
        &mut self,
        request: brane_json_rpc::SerializedRequest,
        server_id: SubscriptionId,
    ) -> SubscriptionId {
        let local_id = SubscriptionId::local_from_params(request.params());

        self.subs.entry(local_id.clone()).or_insert_with(|| ActiveSubscription::new(request).0);
        let _ = self.aliases.insert(local_id.clone(), server_id);
        local_id
    }

    /// Looks up the local id bound to a server-assigned id.
    pub(crate) fn local_id_for(&self, server_id: &SubscriptionId) -> Option<SubscriptionId> {
        self.aliases.get_by_right(server_id).cloned()
    }

    /// Removes a subscription by local id. Idempotent: removing an id that
    /// no longer exists is a no-op.
    pub(crate) fn remove_sub(&mut self, local_id: &SubscriptionId) {
        self.subs.remove(local_id);
        self.aliases.remove_by_left(local_id);
    }

    /// Drops every server-id binding (keeping the subscriptions
    /// themselves), ahead of re-issuing `eth_subscribe` calls on reconnect:
    /// the node hands out fresh server ids, so stale ones must not linger.
    pub(crate) fn drop_server_ids(&mut self) {
        self.aliases = BiMap::new();
    }

    /// Dispatches a notification to its subscription, if still active.
    /// Notifications for unknown server ids are dropped.
    pub(crate) fn notify(&mut self, notification: EthNotification) {
        let server_id = SubscriptionId::from_server_str(notification.subscription);
        let Some(local_id) = self.local_id_for(&server_id) else {
            tracing::debug!(%server_id, "notification for unknown subscription, dropping");
            return;
        };
        if let Some(sub) = self.subs.get_mut(&local_id) {
            sub.notify(notification.result);
        }
    }
}
