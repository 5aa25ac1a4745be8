use brane_primitives::{keccak256, Hash};
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use std::fmt;
use tokio::sync::broadcast;

/// A subscription id: the client-local id before `eth_subscribe` completes,
/// or the server-assigned id after, correlated 1:1 via
/// [`crate::managers::SubscriptionManager`].
///
/// Wraps the id's canonical string form rather than a fixed-width integer:
/// server-assigned ids are opaque JSON strings of whatever width the node
/// picks, not necessarily 32 bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Box<str>);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SubscriptionId").field(&self.0).finish()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl SubscriptionId {
    /// Derives a local id by hashing the subscription request's serialized
    /// params, so the same `eth_subscribe` call re-issued after a reconnect
    /// produces the same local id.
    pub fn local_from_params(params: &RawValue) -> Self {
        let hash: Hash = keccak256(params.get().as_bytes()).into();
        Self(hash.as_hex().into())
    }

    /// Wraps a server-assigned id string (the raw JSON string from an
    /// `eth_subscribe` response or an `eth_subscription` notification).
    pub fn from_server_str(s: impl Into<Box<str>>) -> Self {
        Self(s.into())
    }

    /// The id's canonical string form, as sent over the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A `RawSubscription` is a feed of notifications from the server,
/// identified by a local id.
///
/// This type is mostly a wrapper around [`broadcast::Receiver`], and
/// exposes the same methods.
#[derive(Debug)]
pub struct RawSubscription {
    /// The channel via which notifications are received.
    pub(crate) rx: broadcast::Receiver<Box<RawValue>>,
    /// The local id of the subscription.
    pub(crate) local_id: SubscriptionId,
}

impl RawSubscription {
    /// Gets the local id of the subscription.
    pub fn local_id(&self) -> &SubscriptionId {
        &self.local_id
    }

    /// Wrapper for [`blocking_recv`]. Blocks the current thread until a
    /// message is available.
    ///
    /// [`blocking_recv`]: broadcast::Receiver::blocking_recv
    pub fn blocking_recv(&mut self) -> Result<Box<RawValue>, broadcast::error::RecvError> {
        self.rx.blocking_recv()
    }

    /// `true` if there are currently no notifications to receive.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// The number of messages in the channel this receiver has yet to
    /// receive.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Awaits an item from the channel.
    pub async fn recv(&mut self) -> Result<Box<RawValue>, broadcast::error::RecvError> {
        self.rx.recv().await
    }

    /// Creates a new subscription starting from the current tail element.
    pub fn resubscribe(&self) -> Self {
        Self { rx: self.rx.resubscribe(), local_id: self.local_id.clone() }
    }

    /// `true` if the two subscriptions share the same broadcast channel.
    pub fn same_channel(&self, other: &Self) -> bool {
        self.rx.same_channel(&other.rx)
    }

    /// Attempts to receive a message from the channel without awaiting.
    pub fn try_recv(&mut self) -> Result<Box<RawValue>, broadcast::error::TryRecvError> {
        self.rx.try_recv()
    }
}

/// An item in a typed [`Subscription`]: either the expected type, or some
/// other serialized value that failed to deserialize as `T`.
#[derive(Debug)]
pub enum SubscriptionItem<T> {
    /// The expected item.
    Item(T),
    /// Some other value.
    Other(Box<RawValue>),
}

impl<T: DeserializeOwned> From<Box<RawValue>> for SubscriptionItem<T> {
    fn from(value: Box<RawValue>) -> Self {
        match serde_json::from_str(value.get()) {
            Ok(item) => Self::Item(item),
            Err(_) => Self::Other(value),
        }
    }
}

/// A feed of notifications from the server of a specific type `T`,
/// identified by a local id.
#[derive(Debug)]
pub struct Subscription<T> {
    pub(crate) inner: RawSubscription,
    _pd: std::marker::PhantomData<T>,
}

impl<T> From<RawSubscription> for Subscription<T> {
    fn from(inner: RawSubscription) -> Self {
        Self { inner, _pd: std::marker::PhantomData }
    }
}

impl<T> Subscription<T> {
    /// Gets the local id of the subscription.
    pub fn local_id(&self) -> &SubscriptionId {
        self.inner.local_id()
    }

    /// Gets a reference to the inner subscription.
    pub fn inner(&self) -> &RawSubscription {
        &self.inner
    }

    /// Gets a mutable reference to the inner subscription.
    pub fn inner_mut(&mut self) -> &mut RawSubscription {
        &mut self.inner
    }

    /// `true` if there are currently no notifications to receive.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The number of messages in the channel this receiver has yet to
    /// receive.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Creates a new raw subscription starting from the current tail
    /// element.
    pub fn resubscribe_inner(&self) -> RawSubscription {
        self.inner.resubscribe()
    }

    /// Creates a new `Subscription` starting from the current tail element.
    pub fn resubscribe(&self) -> Self {
        self.inner.resubscribe().into()
    }

    /// `true` if the two subscriptions share the same broadcast channel.
    pub fn same_channel<U>(&self, other: &Subscription<U>) -> bool {
        self.inner.same_channel(&other.inner)
    }
}

impl<T: DeserializeOwned> Subscription<T> {
    /// Wrapper for [`blocking_recv`]. Blocks the current thread until a
    /// message is available.
    ///
    /// [`blocking_recv`]: broadcast::Receiver::blocking_recv
    pub fn blocking_recv(&mut self) -> Result<SubscriptionItem<T>, broadcast::error::RecvError> {
        self.inner.blocking_recv().map(Into::into)
    }

    /// Awaits an item from the channel.
    pub async fn recv(&mut self) -> Result<SubscriptionItem<T>, broadcast::error::RecvError> {
        self.inner.recv().await.map(Into::into)
    }

    /// Attempts to receive a message from the channel without awaiting.
    pub fn try_recv(&mut self) -> Result<SubscriptionItem<T>, broadcast::error::TryRecvError> {
        self.inner.try_recv().map(Into::into)
    }
}
