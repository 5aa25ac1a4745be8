//! The `Tester` extension: drives an Anvil-style local development node
//! (snapshotting, state injection, impersonation, mining and time
//! control) on top of any `Reader`.
//!
//! Grounded on the teacher's `ext/anvil.rs` RPC surface, reshaped from a
//! blanket extension trait into an explicit wrapper type: `Tester` is a
//! distinct capability layered over `Reader`/`Signer` (per C16), not
//! something every provider gets for free.

use crate::reader::Reader;
use brane_primitives::{Address, Bytes, Hash, Wei};
use brane_rpc_client::RpcClient;
use brane_transport::Transport;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wraps a `Reader`- or `Signer`-capable provider with Anvil's
/// development-node JSON-RPC methods.
#[derive(Debug)]
pub struct TesterProvider<P> {
    inner: P,
}

impl<P> TesterProvider<P> {
    /// Wraps `inner`, adding the `Tester` capability on top of whatever
    /// `inner` already provides.
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Unwraps back to the inner provider.
    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<T: Transport + Clone, P: Reader<T>> Reader<T> for TesterProvider<P> {
    fn client(&self) -> &RpcClient<T> {
        self.inner.client()
    }
}

/// The state snapshot produced by `anvil_dumpState` / consumed by
/// `anvil_loadState`: an opaque, node-defined hex blob.
pub type StateDump = Bytes;

/// Parameters for [`TesterProvider::reset`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResetConfig {
    /// Forks from this URL instead of resetting to a fresh local chain.
    #[serde(rename = "jsonRpcUrl", default, skip_serializing_if = "Option::is_none")]
    pub fork_url: Option<String>,
    /// Forks at this block number; `None` means the fork's latest block.
    #[serde(rename = "blockNumber", default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl<T, P> TesterProvider<P>
where
    T: Transport + Clone,
    P: Reader<T>,
{
    /// `evm_snapshot`: records the current state, returning an id usable
    /// with [`Self::revert`]. Returned as a [`Wei`]-typed hex quantity,
    /// matching the node's wire representation (not a 32-byte hash,
    /// despite the name).
    pub async fn snapshot(&self) -> crate::Result<Wei> {
        Ok(self.inner.client().prepare("evm_snapshot", ()).await?)
    }

    /// `evm_revert`: restores the state captured by `snapshot_id`,
    /// returning `false` if it no longer exists.
    pub async fn revert(&self, snapshot_id: Wei) -> crate::Result<bool> {
        Ok(self.inner.client().prepare("evm_revert", (snapshot_id,)).await?)
    }

    /// `anvil_setBalance`.
    pub async fn set_balance(&self, address: Address, balance: Wei) -> crate::Result<()> {
        Ok(self.inner.client().prepare("anvil_setBalance", (address, balance)).await?)
    }

    /// `anvil_setNonce`.
    pub async fn set_nonce(&self, address: Address, nonce: u64) -> crate::Result<()> {
        Ok(self.inner.client().prepare("anvil_setNonce", (address, nonce)).await?)
    }

    /// `anvil_setCode`.
    pub async fn set_code(&self, address: Address, code: Bytes) -> crate::Result<()> {
        Ok(self.inner.client().prepare("anvil_setCode", (address, code)).await?)
    }

    /// `anvil_setStorageAt`.
    pub async fn set_storage_at(&self, address: Address, slot: Hash, value: Hash) -> crate::Result<()> {
        Ok(self.inner.client().prepare("anvil_setStorageAt", (address, slot, value)).await?)
    }

    /// `anvil_impersonateAccount`: begins a scoped impersonation session.
    /// Call [`ImpersonationGuard::stop`] when done, or let it drop — a
    /// dropped guard logs a warning rather than silently leaving the
    /// account impersonated, since stopping requires an RPC round trip
    /// `Drop` cannot perform.
    pub async fn impersonate(&self, address: Address) -> crate::Result<ImpersonationGuard<'_, T, P>> {
        self.inner.client().prepare("anvil_impersonateAccount", (address,)).await?;
        Ok(ImpersonationGuard { tester: self, address, stopped: false, _transport: std::marker::PhantomData })
    }

    /// `evm_increaseTime`: advances the next block's timestamp by
    /// `seconds`.
    pub async fn increase_time(&self, seconds: u64) -> crate::Result<()> {
        Ok(self.inner.client().prepare("evm_increaseTime", (seconds,)).await?)
    }

    /// `evm_setNextBlockTimestamp`.
    pub async fn set_next_block_timestamp(&self, timestamp: u64) -> crate::Result<()> {
        Ok(self.inner.client().prepare("evm_setNextBlockTimestamp", (timestamp,)).await?)
    }

    /// `anvil_mine`: mines `count` blocks, `interval` seconds apart.
    pub async fn mine(&self, count: u64, interval: Option<Duration>) -> crate::Result<()> {
        let interval_secs = interval.map(|d| d.as_secs());
        Ok(self.inner.client().prepare("anvil_mine", (count, interval_secs)).await?)
    }

    /// `evm_setAutomine`.
    pub async fn set_automine(&self, enabled: bool) -> crate::Result<()> {
        Ok(self.inner.client().prepare("evm_setAutomine", (enabled,)).await?)
    }

    /// `anvil_dumpState`.
    pub async fn dump_state(&self) -> crate::Result<StateDump> {
        Ok(self.inner.client().prepare("anvil_dumpState", ()).await?)
    }

    /// `anvil_loadState`.
    pub async fn load_state(&self, state: &StateDump) -> crate::Result<bool> {
        Ok(self.inner.client().prepare("anvil_loadState", (state.clone(),)).await?)
    }

    /// `anvil_reset`: resets the chain, optionally re-forking from
    /// `config.fork_url` at `config.block_number`.
    pub async fn reset(&self, config: ResetConfig) -> crate::Result<()> {
        Ok(self.inner.client().prepare("anvil_reset", (config,)).await?)
    }
}

/// Ends an [`TesterProvider::impersonate`] session when dropped or, more
/// precisely, when [`Self::stop`] is awaited on it.
#[must_use = "dropping this without calling `.stop()` leaves the account impersonated until the session ends"]
#[derive(Debug)]
pub struct ImpersonationGuard<'a, T, P> {
    tester: &'a TesterProvider<P>,
    address: Address,
    stopped: bool,
    _transport: std::marker::PhantomData<T>,
}

impl<'a, T, P> ImpersonationGuard<'a, T, P>
where
    T: Transport + Clone,
    P: Reader<T>,
{
    /// Stops impersonating the account.
    pub async fn stop(mut self) -> crate::Result<()> {
        self.tester.inner.client().prepare("anvil_stopImpersonatingAccount", (self.address,)).await?;
        self.stopped = true;
        Ok(())
    }
}

impl<'a, T, P> Drop for ImpersonationGuard<'a, T, P> {
    fn drop(&mut self) {
        if !self.stopped {
            tracing::warn!(address = %self.address, "impersonation guard dropped without calling stop()");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_config_omits_unset_fields() {
        let config = ResetConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.as_object().unwrap().is_empty());
    }
}
