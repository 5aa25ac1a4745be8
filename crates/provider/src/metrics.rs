//! The facade's metrics hook: a sink a caller can wire up to observe RPC
//! traffic without coupling this crate to any particular metrics backend.

use brane_json_rpc::{RequestPacket, ResponsePacket};
use brane_transport::{TransportError, TransportFut};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::{Duration, Instant},
};
use tower::{Layer, Service};

/// Observes provider-level events. Every method has an empty default
/// body, mirroring [`crate::gas::GasStrategy`]'s `fallback_policy`
/// precedent of "no-op unless a caller opts in" for hook-style traits.
pub trait Metrics: Send + Sync {
    /// Called right before an RPC request is sent.
    fn on_request_started(&self, _method: &str) {}

    /// Called when an RPC request completes successfully.
    fn on_request_completed(&self, _method: &str, _elapsed: Duration) {}

    /// Called when an RPC request fails.
    fn on_request_failed(&self, _method: &str, _error: &str) {}

    /// Called when a persistent transport's connection is lost.
    fn on_connection_lost(&self) {}

    /// Called when a subscription callback (e.g. block/log watcher)
    /// panics or returns an error.
    fn on_subscription_callback_error(&self, _sub_id: &str, _error: &str) {}
}

/// A [`Metrics`] implementation that discards every event. The default
/// for a provider built without `.with_metrics(..)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {}

/// A [`tower::Layer`] reporting every request a transport handles to a
/// [`Metrics`] sink. Mirrors `brane_transport::RetryBackoffLayer`'s shape
/// (a `tower::Layer` wrapping a `tower::Service`), but reports around the
/// inner call rather than changing its outcome.
#[derive(Clone)]
pub struct MetricsLayer {
    sink: Arc<dyn Metrics>,
}

impl MetricsLayer {
    /// Wraps `sink` in a layer.
    pub fn new(sink: Arc<dyn Metrics>) -> Self {
        Self { sink }
    }
}

impl std::fmt::Debug for MetricsLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsLayer").finish_non_exhaustive()
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner, sink: self.sink.clone() }
    }
}

/// A [`tower::Service`] reporting request start/success/failure to a
/// [`Metrics`] sink around an inner transport.
#[derive(Clone)]
pub struct MetricsService<S> {
    inner: S,
    sink: Arc<dyn Metrics>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for MetricsService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsService").field("inner", &self.inner).finish_non_exhaustive()
    }
}

impl<S> Service<RequestPacket> for MetricsService<S>
where
    S: brane_transport::Transport + Clone + 'static,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        let methods: Vec<String> = req.method_names().map(str::to_owned).collect();
        let sink = self.sink.clone();
        let mut inner = self.inner.clone();
        for method in &methods {
            sink.on_request_started(method);
        }

        Box::pin(async move {
            let start = Instant::now();
            let result = inner.call(req).await;
            let elapsed = start.elapsed();
            match &result {
                Ok(_) => {
                    for method in &methods {
                        sink.on_request_completed(method, elapsed);
                    }
                }
                Err(err) => {
                    let message = err.to_string();
                    for method in &methods {
                        sink.on_request_failed(method, &message);
                    }
                }
            }
            result
        }) as Pin<Box<dyn Future<Output = Result<ResponsePacket, TransportError>> + Send>>
    }
}

#[cfg(test)]
mod metrics_layer_tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingMetrics {
        started: AtomicUsize,
    }

    impl Metrics for CountingMetrics {
        fn on_request_started(&self, _method: &str) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn layer_wraps_without_altering_service_type_bounds() {
        let sink: Arc<dyn Metrics> = Arc::new(CountingMetrics::default());
        let _layer = MetricsLayer::new(sink);
    }
}
