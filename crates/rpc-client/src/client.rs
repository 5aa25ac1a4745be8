use crate::{BatchRequest, ClientBuilder, RpcCall};
use brane_json_rpc::{Id, Request, RpcParam, RpcReturn};
use brane_primitives::{ChainId, Wei};
use brane_transport::{BoxTransport, Transport, TransportConnect, TransportError, TransportErrorKind, TransportResult};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Weak,
};
use tokio::sync::OnceCell;
use tower::{layer::util::Identity, ServiceBuilder};

/// The shared state behind a cloned [`RpcClient`] handle.
///
/// Held behind an `Arc` so that [`WeakClient`] (used by [`crate::PollTask`])
/// can observe the client without keeping it alive.
#[derive(Debug)]
pub struct RpcClientInner<T> {
    /// The underlying transport.
    pub(crate) transport: T,
    /// `true` if the transport is believed to be local.
    is_local: AtomicBool,
    /// The next request ID to use.
    id: AtomicU64,
    /// Single-flight cache for `eth_chainId`, per spec.md §5's
    /// compare-and-set requirement: concurrent first callers share the
    /// result without issuing duplicate RPCs.
    chain_id: OnceCell<ChainId>,
}

/// A borrowed reference to a client's shared state.
pub type ClientRef<'a, T> = &'a RpcClientInner<T>;

/// A non-owning reference to a client's shared state, used by long-lived
/// tasks (the poller) that should not keep the client alive on their own.
pub type WeakClient<T> = Weak<RpcClientInner<T>>;

/// A JSON-RPC client.
///
/// This is a cheap, cloneable handle around a [`Transport`] and a request ID
/// counter. It is used to build [`RpcCall`] and [`BatchRequest`] objects.
///
/// ### Note
///
/// IDs are allocated sequentially, starting at 0. IDs are reserved via
/// [`RpcClient::next_id`]. Note that allocated IDs may not be used. There is
/// no guarantee that a prepared [`RpcCall`] will be sent, or that a sent call
/// will receive a response.
pub struct RpcClient<T> {
    pub(crate) inner: Arc<RpcClientInner<T>>,
}

impl<T> Clone for RpcClient<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for RpcClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RpcClient").field(&self.inner).finish()
    }
}

impl<T> std::ops::Deref for RpcClient<T> {
    type Target = RpcClientInner<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl RpcClient<Identity> {
    /// Create a new [`ClientBuilder`].
    pub fn builder() -> ClientBuilder<Identity> {
        ClientBuilder { builder: ServiceBuilder::new() }
    }
}

impl<T> RpcClient<T> {
    /// Create a new [`RpcClient`] with the given transport.
    pub fn new(t: T, is_local: bool) -> Self {
        let inner = RpcClientInner {
            transport: t,
            is_local: AtomicBool::new(is_local),
            id: AtomicU64::new(0),
            chain_id: OnceCell::new(),
        };
        Self { inner: Arc::new(inner) }
    }

    /// Connect to a transport via a [`TransportConnect`] implementor.
    pub async fn connect<C>(connect: C) -> Result<Self, TransportError>
    where
        T: Transport,
        C: TransportConnect<Transport = T>,
    {
        ClientBuilder::default().connect(connect).await
    }

    /// Downgrades this handle to a [`WeakClient`].
    pub fn downgrade(&self) -> WeakClient<T> {
        Arc::downgrade(&self.inner)
    }
}

impl<T> RpcClientInner<T> {
    /// Build a `Request` with the given method and params.
    ///
    /// This function reserves an ID for the request, however the request
    /// is not sent. To send a request, use [`RpcClient::prepare`] and await
    /// the returned [`RpcCall`].
    pub fn make_request<Params: RpcParam>(&self, method: &'static str, params: Params) -> Request<Params> {
        Request::new(method, self.next_id(), params)
    }

    /// `true` if the client believes the transport is local.
    ///
    /// This can be used to optimize remote API usage, or to change program
    /// behavior on local endpoints. When the client is instantiated by parsing
    /// a URL or other external input, this value is set on a best-efforts
    /// basis and may be incorrect.
    #[inline]
    pub fn is_local(&self) -> bool {
        self.is_local.load(Ordering::Relaxed)
    }

    /// Set the `is_local` flag.
    pub fn set_local(&self, is_local: bool) {
        self.is_local.store(is_local, Ordering::Relaxed);
    }

    /// Reserve a request ID value. This is used to generate request IDs.
    #[inline]
    fn increment_id(&self) -> u64 {
        self.id.fetch_add(1, Ordering::Relaxed)
    }

    /// Reserve a request ID.
    #[inline]
    pub fn next_id(&self) -> Id {
        Id::Number(self.increment_id())
    }
}

impl<T> RpcClient<T>
where
    T: Transport + Clone,
{
    /// Prepare an [`RpcCall`].
    ///
    /// This function reserves an ID for the request, however the request
    /// is not sent. To send a request, await the returned [`RpcCall`].
    ///
    /// ### Note:
    ///
    /// Serialization is done lazily. It will not be performed until the call
    /// is awaited. This means that if a serializer error occurs, it will not
    /// be caught until the call is awaited.
    pub fn prepare<Params: RpcParam, Resp: RpcReturn>(
        &self,
        method: &'static str,
        params: Params,
    ) -> RpcCall<T, Params, Resp> {
        let request = self.make_request(method, params);
        RpcCall::new(request, self.inner.transport.clone())
    }

    /// Returns the chain id, caching the result.
    ///
    /// Concurrent first callers share a single in-flight `eth_chainId`
    /// request instead of each issuing their own (spec.md §5's
    /// compare-and-set single-flight rule).
    pub async fn chain_id(&self) -> TransportResult<ChainId> {
        self.inner
            .chain_id
            .get_or_try_init(|| async {
                let value: Wei = self.prepare("eth_chainId", ()).await?;
                value.try_to_u128().and_then(|v| u64::try_from(v).ok()).ok_or_else(|| {
                    TransportErrorKind::custom_str("eth_chainId response does not fit in a u64")
                })
            })
            .await
            .copied()
    }

    /// Create a new [`BatchRequest`] builder.
    ///
    /// Unlike the teacher, which scopes batching to its HTTP transport,
    /// this is available for any transport: batching is a wire-level
    /// concept, and `brane-pubsub`'s frontend already knows how to split a
    /// batch packet into individually-dispatched requests.
    #[inline]
    pub fn new_batch(&self) -> BatchRequest<'_, T> {
        BatchRequest::new(&self.inner)
    }

    /// Type erase the service in the transport, allowing it to be used in a
    /// generic context.
    ///
    /// ## Note:
    ///
    /// This is for abstracting over `RpcClient<T>` for multiple `T` by
    /// erasing each type. E.g. if you have `RpcClient<HttpTransport>` and
    /// `RpcClient<PubSubFrontend>` you can put both into a
    /// `Vec<RpcClient<BoxTransport>>`.
    #[inline]
    pub fn boxed(self) -> RpcClient<BoxTransport> {
        let is_local = self.inner.is_local();
        let next_id = self.inner.id.load(Ordering::Relaxed);
        let boxed = RpcClient::new(self.inner.transport.clone().boxed(), is_local);
        boxed.inner.id.store(next_id, Ordering::Relaxed);
        boxed
    }
}

#[cfg(feature = "pubsub")]
mod pubsub_impl {
    use super::*;
    use brane_pubsub::{PubSubFrontend, SubscriptionId};
    use serde_json::value::RawValue;
    use tokio::sync::broadcast;

    impl RpcClient<PubSubFrontend> {
        /// Get a [`broadcast::Receiver`] for the given subscription ID.
        pub async fn get_watcher(
            &self,
            id: SubscriptionId,
        ) -> TransportResult<broadcast::Receiver<Box<RawValue>>> {
            self.inner.transport.get_subscription(id).await
        }
    }
}
