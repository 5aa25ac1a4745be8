//! Polling for a mined transaction receipt.
//!
//! Grounded on the teacher's `heart.rs` pending-transaction builder, but
//! without its block-watch heartbeat machinery: this crate has no block
//! subscription to piggy-back on, so confirmation is a direct
//! `eth_getTransactionReceipt` poll loop.

use crate::{root::RootProvider, types::TransactionReceipt, Error, Result};
use brane_primitives::Hash;
use brane_transport::Transport;
use std::time::Duration;

/// The default interval between `eth_getTransactionReceipt` polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The default timeout for [`PendingTransactionBuilder::watch`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Polls for the receipt of a submitted transaction.
///
/// Returned by `send_transaction_and_wait`-style methods; `.watch()`
/// drives the poll loop to completion.
#[must_use = "this type does nothing unless you call `watch`"]
#[derive(Debug)]
pub struct PendingTransactionBuilder<'a, T> {
    provider: &'a RootProvider<T>,
    tx_hash: Hash,
    poll_interval: Duration,
    timeout: Duration,
}

impl<'a, T: Transport + Clone> PendingTransactionBuilder<'a, T> {
    /// Creates a new builder polling for `tx_hash`'s receipt with default
    /// interval and timeout.
    pub const fn new(provider: &'a RootProvider<T>, tx_hash: Hash) -> Self {
        Self { provider, tx_hash, poll_interval: DEFAULT_POLL_INTERVAL, timeout: DEFAULT_TIMEOUT }
    }

    /// The transaction hash being watched.
    pub const fn tx_hash(&self) -> Hash {
        self.tx_hash
    }

    /// Sets the interval between polls.
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum time to wait before giving up.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Polls until a receipt is available or `timeout` elapses.
    pub async fn watch(self) -> Result<TransactionReceipt> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(self.tx_hash).await? {
                return Ok(receipt);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(Error::TransactionTimeout { tx_hash: self.tx_hash });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
