//! Retry policy (C14): classify transient vs. terminal faults, apply
//! jittered exponential backoff, and give up with `RetryExhausted` after a
//! bounded number of attempts.
//!
//! Shaped after the teacher's `layers::retry::RetryBackoffLayer` /
//! `RateLimitRetryPolicy` (a `tower::Layer` wrapping a `tower::Service`,
//! with a `RetryPolicy` trait distinguishing transient from terminal
//! faults), but the backoff schedule and classification here are spec.md
//! §4.10's generic `RpcRetryConfig`, not the teacher's provider-specific
//! "compute units per second" rate-limit scheme.

use crate::{
    error::is_transient_rpc_error, Transport, TransportError, TransportErrorKind, TransportFut,
};
use brane_json_rpc::{RequestPacket, ResponsePacket, RpcError};
use std::{
    future::Future,
    pin::Pin,
    sync::atomic::{AtomicU64, Ordering},
    task::{Context, Poll},
    time::Duration,
};
use tower::{Layer, Service};

/// Tunable parameters for the retry policy, per spec.md §4.10.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RpcRetryConfig {
    /// Base delay for the first retry.
    pub base: Duration,
    /// Upper bound on any single backoff delay.
    pub cap: Duration,
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Additive jitter, as a percentage of the computed delay (10-25 per
    /// spec.md §4.10).
    pub jitter_pct: f64,
}

impl Default for RpcRetryConfig {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(100),
            cap: Duration::from_secs(30),
            max_attempts: 5,
            jitter_pct: 20.0,
        }
    }
}

impl RpcRetryConfig {
    /// The backoff delay for `attempt` (1-indexed), `min(base * 2^(attempt-1), cap)`
    /// plus additive jitter in `[0, jitter_pct%]` of the computed delay.
    ///
    /// `jitter_seed` selects the jitter deterministically (e.g. derived
    /// from an atomic counter), so this function has no hidden randomness
    /// of its own.
    pub fn backoff_for(&self, attempt: u32, jitter_seed: u64) -> Duration {
        let exp = attempt.saturating_sub(1).min(32);
        let scaled = self.base.saturating_mul(1u32.checked_shl(exp).unwrap_or(u32::MAX));
        let delay = scaled.min(self.cap);

        // Deterministic pseudo-jitter: no RNG dependency, matches the
        // teacher's preference for explicit, testable tunables.
        let unit = (jitter_seed % 1000) as f64 / 1000.0;
        let jitter_frac = unit * (self.jitter_pct / 100.0);
        delay.mul_f64(1.0 + jitter_frac)
    }
}

/// Final failure after the policy's attempts are exhausted.
#[derive(Debug, thiserror::Error)]
#[error("retry exhausted after {attempts} attempt(s): {last_cause}")]
pub struct RetryExhausted {
    /// Number of attempts made, including the first.
    pub attempts: u32,
    /// The error from the final attempt.
    pub last_cause: TransportError,
}

/// Classifies faults as transient (worth retrying) or terminal, mirroring
/// the teacher's `RetryPolicy` trait shape.
pub trait RetryPolicy: Send + Sync + std::fmt::Debug + 'static {
    /// `true` if `err` is worth another attempt.
    fn should_retry(&self, err: &TransportError) -> bool;
}

/// The default classifier from spec.md §4.10: transport-level connect/read
/// faults and HTTP 5xx are transient; HTTP 4xx (other than rate-limiting)
/// and JSON-RPC "invalid params"/"method not found"/"execution reverted"
/// families are terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRetryPolicy;

impl RetryPolicy for DefaultRetryPolicy {
    fn should_retry(&self, err: &TransportError) -> bool {
        match err {
            RpcError::Transport(kind) => kind.is_transient(),
            RpcError::ErrorResp(payload) => is_transient_rpc_error(payload),
            RpcError::NullResp | RpcError::DeserError { .. } => false,
            _ => false,
        }
    }
}

/// A [`tower::Layer`] applying [`RpcRetryConfig`] and a [`RetryPolicy`] to
/// an inner transport.
#[derive(Debug, Clone)]
pub struct RetryBackoffLayer<P = DefaultRetryPolicy> {
    config: RpcRetryConfig,
    policy: P,
}

impl RetryBackoffLayer<DefaultRetryPolicy> {
    /// Creates a layer using the [`DefaultRetryPolicy`].
    pub fn new(config: RpcRetryConfig) -> Self {
        Self { config, policy: DefaultRetryPolicy }
    }
}

impl<P> RetryBackoffLayer<P> {
    /// Creates a layer with a custom [`RetryPolicy`].
    pub fn with_policy(config: RpcRetryConfig, policy: P) -> Self {
        Self { config, policy }
    }
}

impl<S, P: Clone> Layer<S> for RetryBackoffLayer<P> {
    type Service = RetryBackoffService<S, P>;

    fn layer(&self, inner: S) -> Self::Service {
        RetryBackoffService {
            inner,
            config: self.config,
            policy: self.policy.clone(),
            seed: std::sync::Arc::new(AtomicU64::new(0)),
        }
    }
}

/// A [`tower::Service`] retrying failed calls per [`RpcRetryConfig`].
#[derive(Debug, Clone)]
pub struct RetryBackoffService<S, P = DefaultRetryPolicy> {
    inner: S,
    config: RpcRetryConfig,
    policy: P,
    seed: std::sync::Arc<AtomicU64>,
}

impl<S, P> Service<RequestPacket> for RetryBackoffService<S, P>
where
    S: Transport + Clone + 'static,
    P: RetryPolicy + Clone + 'static,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        let mut inner = self.inner.clone();
        let config = self.config;
        let policy = self.policy.clone();
        let seed = self.seed.clone();

        Box::pin(async move {
            let mut attempt = 1u32;
            loop {
                match inner.call(req.clone()).await {
                    Ok(resp) => return Ok(resp),
                    Err(err) => {
                        if attempt >= config.max_attempts || !policy.should_retry(&err) {
                            return Err(TransportErrorKind::custom(RetryExhausted {
                                attempts: attempt,
                                last_cause: err,
                            }));
                        }

                        let jitter_seed = seed.fetch_add(1, Ordering::Relaxed);
                        let delay = config.backoff_for(attempt, jitter_seed);
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                }
            }
        }) as Pin<Box<dyn Future<Output = Result<ResponsePacket, TransportError>> + Send>>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn backoff_grows_and_caps() {
        let cfg = RpcRetryConfig {
            base: Duration::from_millis(100),
            cap: Duration::from_secs(1),
            max_attempts: 5,
            jitter_pct: 0.0,
        };
        assert_eq!(cfg.backoff_for(1, 0), Duration::from_millis(100));
        assert_eq!(cfg.backoff_for(2, 0), Duration::from_millis(200));
        assert_eq!(cfg.backoff_for(3, 0), Duration::from_millis(400));
        // 100ms * 2^9 = 51200ms, well past the 1s cap.
        assert_eq!(cfg.backoff_for(10, 0), Duration::from_secs(1));
    }

    #[test]
    fn jitter_is_additive_and_bounded() {
        let cfg = RpcRetryConfig {
            base: Duration::from_millis(100),
            cap: Duration::from_secs(10),
            max_attempts: 5,
            jitter_pct: 25.0,
        };
        let base = cfg.backoff_for(1, 0);
        let jittered = cfg.backoff_for(1, 999);
        assert!(jittered >= base);
        assert!(jittered <= base.mul_f64(1.25) + Duration::from_millis(1));
    }

    #[test]
    fn default_policy_retries_connection_lost_not_deser_error() {
        let policy = DefaultRetryPolicy;
        let lost: TransportError = TransportErrorKind::connection_lost();
        assert!(policy.should_retry(&lost));

        let deser: TransportError = RpcError::DeserError {
            err: serde_json::from_str::<()>("not json").unwrap_err(),
            text: "not json".into(),
        };
        assert!(!policy.should_retry(&deser));
    }

    #[tokio::test]
    async fn retry_exhausted_reports_attempts_and_cause() {
        use brane_json_rpc::{RequestPacket, ResponsePacket};
        use std::sync::atomic::AtomicUsize;

        #[derive(Clone)]
        struct AlwaysFails(std::sync::Arc<AtomicUsize>);

        impl Service<RequestPacket> for AlwaysFails {
            type Response = ResponsePacket;
            type Error = TransportError;
            type Future = TransportFut<'static>;

            fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
                Poll::Ready(Ok(()))
            }

            fn call(&mut self, _req: RequestPacket) -> Self::Future {
                self.0.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Err(TransportErrorKind::connection_lost()) })
            }
        }

        let calls = std::sync::Arc::new(AtomicUsize::new(0));
        let layer = RetryBackoffLayer::new(RpcRetryConfig {
            base: Duration::from_millis(1),
            cap: Duration::from_millis(5),
            max_attempts: 3,
            jitter_pct: 0.0,
        });
        let mut service = layer.layer(AlwaysFails(calls.clone()));

        let req: RequestPacket =
            brane_json_rpc::Request::new("eth_chainId", brane_json_rpc::Id::Number(1), ())
                .serialize()
                .unwrap()
                .into();
        let err = service.call(req).await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_matches!(err, RpcError::Transport(TransportErrorKind::Custom(_)));
    }
}
