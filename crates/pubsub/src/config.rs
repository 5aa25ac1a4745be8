use brane_transport::RpcRetryConfig;
use std::{sync::Arc, time::Duration};

use crate::sub::SubscriptionId;

/// A callback invited after a successful reconnect, given the local ids of
/// every subscription the facade should re-issue `eth_subscribe` for.
pub type OnReconnect = Arc<dyn Fn(&[SubscriptionId]) + Send + Sync>;

/// Tunables for a [`crate::PubSubService`]'s state machine, per spec.md
/// §4.9 and its `SPEC_FULL.md` §4.9 supplement.
#[derive(Clone)]
pub struct PersistentTransportConfig {
    /// Backoff schedule for `RECONNECTING`, reusing C14's `RpcRetryConfig`
    /// shape rather than a separate reconnect schedule.
    pub retry: RpcRetryConfig,

    /// `true` to fail new submissions immediately while `RECONNECTING`.
    /// Default `false`: submissions queue with a deadline (their own
    /// request timeout), which is the resolved default per
    /// `SPEC_FULL.md` §4.9.
    pub fail_fast_on_reconnect: bool,

    /// High-water mark on outstanding (in-flight) requests: at or above
    /// this count the channel is no longer writable.
    pub backpressure_high_water: usize,

    /// Low-water mark: once outstanding requests drop to or below this
    /// count, the channel becomes writable again.
    pub backpressure_low_water: usize,

    /// How long a submission waits for the channel to become writable
    /// before failing with `Backpressure`.
    pub backpressure_timeout: Duration,

    /// Default deadline for a submission that does not specify its own.
    pub default_request_timeout: Duration,

    /// How often the service sweeps the correlation table for expired or
    /// cancelled entries.
    pub sweep_interval: Duration,

    /// Invited after a successful reconnect with the local ids of every
    /// active subscription.
    pub on_reconnect: Option<OnReconnect>,
}

impl std::fmt::Debug for PersistentTransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentTransportConfig")
            .field("retry", &self.retry)
            .field("fail_fast_on_reconnect", &self.fail_fast_on_reconnect)
            .field("backpressure_high_water", &self.backpressure_high_water)
            .field("backpressure_low_water", &self.backpressure_low_water)
            .field("backpressure_timeout", &self.backpressure_timeout)
            .field("default_request_timeout", &self.default_request_timeout)
            .field("sweep_interval", &self.sweep_interval)
            .field("on_reconnect", &self.on_reconnect.as_ref().map(|_| "Fn(..)"))
            .finish()
    }
}

impl Default for PersistentTransportConfig {
    fn default() -> Self {
        Self {
            retry: RpcRetryConfig::default(),
            fail_fast_on_reconnect: false,
            backpressure_high_water: 1024,
            backpressure_low_water: 768,
            backpressure_timeout: Duration::from_secs(10),
            default_request_timeout: Duration::from_secs(30),
            sweep_interval: Duration::from_millis(250),
            on_reconnect: None,
        }
    }
}

impl PersistentTransportConfig {
    /// Sets the reconnect backoff schedule.
    pub fn with_retry(mut self, retry: RpcRetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fails new submissions immediately while reconnecting, instead of
    /// queuing them with a deadline.
    pub fn with_fail_fast_on_reconnect(mut self, fail_fast: bool) -> Self {
        self.fail_fast_on_reconnect = fail_fast;
        self
    }

    /// Sets the high/low water marks gating the channel's writable state.
    pub fn with_backpressure_marks(mut self, high: usize, low: usize) -> Self {
        self.backpressure_high_water = high;
        self.backpressure_low_water = low;
        self
    }

    /// Registers a subscription-recovery hook, invited after every
    /// successful reconnect.
    pub fn with_on_reconnect(mut self, hook: OnReconnect) -> Self {
        self.on_reconnect = Some(hook);
        self
    }
}
