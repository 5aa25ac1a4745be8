//! [`RootProvider`]: the plain `Reader` handle over an RPC client.
//!
//! Grounded on the teacher's `provider/root.rs`, adapted to this
//! workspace's non-generic (no `Network` type parameter) facade and to
//! `brane-rpc-client`'s actual `RpcClient` API (`.downgrade()` and
//! `Deref`, rather than the teacher's `get_ref()`/`get_weak()`).

use crate::{heart::PendingTransactionBuilder, reader::Reader};
use brane_primitives::Hash;
use brane_rpc_client::RpcClient;
use brane_transport::{BoxTransport, BoxTransportConnect, Transport, TransportError};

/// A read-only handle over an RPC client: every `Reader` (C16) operation,
/// nothing else. [`SignerProvider`](crate::SignerProvider) wraps one to add
/// write operations.
///
/// Cheap to clone: [`RpcClient`] is itself a reference-counted handle, so
/// this type holds one directly rather than wrapping it in another `Arc`.
#[derive(Clone)]
pub struct RootProvider<T> {
    client: RpcClient<T>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for RootProvider<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootProvider").field("client", &self.client).finish()
    }
}

impl<T: Transport + Clone> RootProvider<T> {
    /// Wraps an already-connected RPC client.
    pub const fn new(client: RpcClient<T>) -> Self {
        Self { client }
    }

    /// The underlying RPC client.
    pub const fn client(&self) -> &RpcClient<T> {
        &self.client
    }

    /// Begins polling for `tx_hash`'s receipt.
    pub const fn watch_transaction(&self, tx_hash: Hash) -> PendingTransactionBuilder<'_, T> {
        PendingTransactionBuilder::new(self, tx_hash)
    }
}

impl<T: Transport + Clone> Reader<T> for RootProvider<T> {
    fn client(&self) -> &RpcClient<T> {
        self.client()
    }
}

#[cfg(feature = "reqwest")]
impl RootProvider<brane_transport_http::HttpTransport> {
    /// Connects a plain HTTP `RootProvider`.
    pub fn connect_http(url: url::Url) -> Self {
        Self::new(RpcClient::new(brane_transport_http::HttpTransport::new(url), false))
    }
}

impl RootProvider<BoxTransport> {
    /// Connects with any [`BoxTransportConnect`], boxing the resulting
    /// transport.
    pub async fn connect_boxed<C: BoxTransportConnect>(connect: C) -> Result<Self, TransportError> {
        let is_local = connect.is_local();
        let transport = connect.get_boxed_transport().await?;
        Ok(Self::new(RpcClient::new(transport, is_local)))
    }

    /// Connects via a connection string understood by
    /// `brane_rpc_client::BuiltInConnectionString`.
    pub async fn connect_builtin(s: &str) -> Result<Self, TransportError> {
        let transport = brane_rpc_client::BuiltInConnectionString::connect(s).await?;
        Ok(Self::new(RpcClient::new(transport, false)))
    }
}
