//! Fluent provider construction, in the style of the teacher's
//! `ProviderBuilder` but scoped to this crate's non-generic facade:
//! every `.connect_*` call produces a handle over a boxed, type-erased
//! transport, layered with retry and metrics reporting as configured.

use crate::{
    gas::{DefaultGasStrategy, GasStrategy},
    metrics::{Metrics, MetricsLayer},
    root::RootProvider,
    signer_provider::SignerProvider,
};
use brane_rpc_client::RpcClient;
use brane_signer::Signer;
use brane_transport::{
    BoxTransport, BoxTransportConnect, RetryBackoffLayer, RpcRetryConfig, Transport, TransportError,
};
use std::sync::Arc;
use tower::Layer;

/// Marker type for a [`ProviderBuilder`] with no signer configured: only
/// `Reader` construction (`.connect_*` returning a [`RootProvider`]) is
/// available.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSigner;

/// Builds a [`RootProvider`] (no signer set) or a [`SignerProvider`]
/// (after `.with_signer`), applying retry backoff and metrics reporting
/// to whatever transport it connects.
#[derive(Default)]
pub struct ProviderBuilder<S = NoSigner, G = DefaultGasStrategy> {
    signer: S,
    gas_strategy: G,
    retry: Option<RpcRetryConfig>,
    metrics: Option<Arc<dyn Metrics>>,
}

impl<S: std::fmt::Debug, G: std::fmt::Debug> std::fmt::Debug for ProviderBuilder<S, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderBuilder")
            .field("signer", &self.signer)
            .field("gas_strategy", &self.gas_strategy)
            .field("retry", &self.retry)
            .field("has_metrics", &self.metrics.is_some())
            .finish()
    }
}

impl ProviderBuilder<NoSigner, DefaultGasStrategy> {
    /// Starts an unconfigured builder: default gas strategy, no retry, no
    /// metrics, no signer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S, G> ProviderBuilder<S, G> {
    /// Wraps every connection in a retry-backoff layer per `config`.
    pub fn with_retry(mut self, config: RpcRetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Reports every request to `sink`.
    pub fn with_metrics(mut self, sink: impl Metrics + 'static) -> Self {
        self.metrics = Some(Arc::new(sink));
        self
    }

    /// Replaces the gas strategy used by the eventual [`SignerProvider`].
    pub fn with_gas_strategy<G2: GasStrategy>(self, gas_strategy: G2) -> ProviderBuilder<S, G2> {
        ProviderBuilder { signer: self.signer, gas_strategy, retry: self.retry, metrics: self.metrics }
    }

    /// Adds a signer, turning future `.connect_*` calls into
    /// [`SignerProvider`] construction instead of [`RootProvider`].
    pub fn with_signer<S2: Signer>(self, signer: S2) -> ProviderBuilder<S2, G> {
        ProviderBuilder { signer, gas_strategy: self.gas_strategy, retry: self.retry, metrics: self.metrics }
    }

    fn wrap_transport<T>(&self, transport: T) -> BoxTransport
    where
        T: Transport + Clone + Send + Sync + 'static,
    {
        match (self.retry, self.metrics.clone()) {
            (Some(retry), Some(metrics)) => {
                let retried = RetryBackoffLayer::new(retry).layer(transport);
                MetricsLayer::new(metrics).layer(retried).boxed()
            }
            (Some(retry), None) => RetryBackoffLayer::new(retry).layer(transport).boxed(),
            (None, Some(metrics)) => MetricsLayer::new(metrics).layer(transport).boxed(),
            (None, None) => transport.boxed(),
        }
    }
}

impl<G: GasStrategy> ProviderBuilder<NoSigner, G> {
    /// Connects over plain HTTP.
    #[cfg(feature = "reqwest")]
    pub fn connect_http(self, url: url::Url) -> RootProvider<BoxTransport> {
        let transport = self.wrap_transport(brane_transport_http::HttpTransport::new(url));
        RootProvider::new(RpcClient::new(transport, false))
    }

    /// Connects over a persistent WebSocket.
    #[cfg(feature = "ws")]
    pub async fn connect_ws(self, url: impl Into<String>) -> Result<RootProvider<BoxTransport>, TransportError> {
        let connect = brane_rpc_client::WsConnect::new(url);
        let is_local = connect.is_local();
        let transport = connect.get_boxed_transport().await?;
        let transport = self.wrap_transport(transport);
        Ok(RootProvider::new(RpcClient::new(transport, is_local)))
    }

    /// Connects via any [`BoxTransportConnect`] (a connection string, a
    /// custom `ipc`/`ws` dialer, ...).
    pub async fn connect_boxed<C: BoxTransportConnect>(self, connect: C) -> Result<RootProvider<BoxTransport>, TransportError> {
        let is_local = connect.is_local();
        let transport = connect.get_boxed_transport().await?;
        let transport = self.wrap_transport(transport);
        Ok(RootProvider::new(RpcClient::new(transport, is_local)))
    }
}

impl<S: Signer, G: GasStrategy> ProviderBuilder<S, G> {
    /// Connects over plain HTTP, producing a [`SignerProvider`].
    #[cfg(feature = "reqwest")]
    pub fn connect_http(self, url: url::Url) -> SignerProvider<BoxTransport, S, G> {
        let transport = self.wrap_transport(brane_transport_http::HttpTransport::new(url));
        let inner = RootProvider::new(RpcClient::new(transport, false));
        SignerProvider::with_gas_strategy(inner, self.signer, self.gas_strategy)
    }

    /// Connects over a persistent WebSocket, producing a
    /// [`SignerProvider`].
    #[cfg(feature = "ws")]
    pub async fn connect_ws(
        self,
        url: impl Into<String>,
    ) -> Result<SignerProvider<BoxTransport, S, G>, TransportError> {
        let connect = brane_rpc_client::WsConnect::new(url);
        let is_local = connect.is_local();
        let transport = connect.get_boxed_transport().await?;
        let transport = self.wrap_transport(transport);
        let inner = RootProvider::new(RpcClient::new(transport, is_local));
        Ok(SignerProvider::with_gas_strategy(inner, self.signer, self.gas_strategy))
    }

    /// Connects via any [`BoxTransportConnect`], producing a
    /// [`SignerProvider`].
    pub async fn connect_boxed<C: BoxTransportConnect>(
        self,
        connect: C,
    ) -> Result<SignerProvider<BoxTransport, S, G>, TransportError> {
        let is_local = connect.is_local();
        let transport = connect.get_boxed_transport().await?;
        let transport = self.wrap_transport(transport);
        let inner = RootProvider::new(RpcClient::new(transport, is_local));
        Ok(SignerProvider::with_gas_strategy(inner, self.signer, self.gas_strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_no_retry_and_no_metrics() {
        let builder = ProviderBuilder::new();
        assert!(builder.retry.is_none());
        assert!(builder.metrics.is_none());
    }

    #[test]
    fn with_retry_records_the_config() {
        let config = RpcRetryConfig::default();
        let builder = ProviderBuilder::new().with_retry(config);
        assert_eq!(builder.retry, Some(config));
    }
}
