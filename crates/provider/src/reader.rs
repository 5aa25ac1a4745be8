//! The `Reader` capability: every read-only RPC a client handle exposes,
//! regardless of whether it can also sign.
//!
//! `Reader` is implemented directly on [`RootProvider`](crate::RootProvider)
//! and, by delegation, on anything built on top of one
//! ([`SignerProvider`](crate::SignerProvider), [`TesterProvider`](crate::TesterProvider)) —
//! the "Reader ⊂ Signer" relationship the client facade (C16) calls for.

use crate::types::{AccessListResult, BlockHeader, BlockId, Filter, Log, TransactionReceipt, TransactionRequest};
use brane_primitives::{Address, ChainId, Hash, Wei};
use brane_rpc_client::RpcClient;
use brane_transport::Transport;

/// Read-only access to a JSON-RPC endpoint.
#[async_trait::async_trait]
pub trait Reader<T: Transport + Clone>: Send + Sync {
    /// The underlying RPC client.
    fn client(&self) -> &RpcClient<T>;

    /// `eth_chainId`.
    async fn chain_id(&self) -> crate::Result<ChainId> {
        Ok(self.client().chain_id().await?)
    }

    /// `eth_getBalance`.
    async fn get_balance(&self, address: Address, block: BlockId) -> crate::Result<Wei> {
        Ok(self.client().prepare("eth_getBalance", (address, block)).await?)
    }

    /// `eth_getTransactionCount`: the sender's next nonce.
    async fn get_transaction_count(&self, address: Address, block: BlockId) -> crate::Result<u64> {
        let count: brane_primitives::Wei =
            self.client().prepare("eth_getTransactionCount", (address, block)).await?;
        count.try_to_u128().and_then(|v| u64::try_from(v).ok()).ok_or_else(|| {
            crate::Error::NullResponse("eth_getTransactionCount returned a value out of u64 range")
        })
    }

    /// `eth_getBlockByNumber`/`eth_getBlockByHash`, dispatching on `block`.
    async fn get_block(&self, block: BlockId, full_transactions: bool) -> crate::Result<Option<BlockHeader>> {
        match block {
            BlockId::Hash(hash) => self.get_block_by_hash(hash, full_transactions).await,
            BlockId::Tag(tag) => self.get_block_by_number(tag, full_transactions).await,
        }
    }

    /// `eth_getBlockByNumber`.
    async fn get_block_by_number(
        &self,
        tag: crate::types::BlockTag,
        full_transactions: bool,
    ) -> crate::Result<Option<BlockHeader>> {
        Ok(self.client().prepare("eth_getBlockByNumber", (tag, full_transactions)).await?)
    }

    /// `eth_getBlockByHash`.
    async fn get_block_by_hash(&self, hash: Hash, full_transactions: bool) -> crate::Result<Option<BlockHeader>> {
        Ok(self.client().prepare("eth_getBlockByHash", (hash, full_transactions)).await?)
    }

    /// The latest block's header; used by the gas strategy to read the
    /// current base fee.
    async fn get_latest_header(&self) -> crate::Result<Option<BlockHeader>> {
        self.get_block_by_number(crate::types::BlockTag::Latest, false).await
    }

    /// `eth_getTransactionReceipt`.
    async fn get_transaction_receipt(&self, tx_hash: Hash) -> crate::Result<Option<TransactionReceipt>> {
        Ok(self.client().prepare("eth_getTransactionReceipt", (tx_hash,)).await?)
    }

    /// `eth_call`.
    async fn call(&self, tx: &TransactionRequest, block: BlockId) -> crate::Result<brane_primitives::Bytes> {
        Ok(self.client().prepare("eth_call", (tx.clone(), block)).await?)
    }

    /// `eth_estimateGas`.
    async fn estimate_gas(&self, tx: &TransactionRequest, block: BlockId) -> crate::Result<u64> {
        Ok(self.client().prepare("eth_estimateGas", (tx.clone(), block)).await?)
    }

    /// `eth_getLogs`.
    async fn get_logs(&self, filter: &Filter) -> crate::Result<Vec<Log>> {
        Ok(self.client().prepare("eth_getLogs", (filter.clone(),)).await?)
    }

    /// `eth_createAccessList`.
    async fn create_access_list(
        &self,
        tx: &TransactionRequest,
        block: BlockId,
    ) -> crate::Result<AccessListResult> {
        Ok(self.client().prepare("eth_createAccessList", (tx.clone(), block)).await?)
    }

    /// `eth_gasPrice`: the node's current legacy gas price suggestion.
    async fn gas_price(&self) -> crate::Result<u128> {
        let price: Wei = self.client().prepare("eth_gasPrice", ()).await?;
        price
            .try_to_u128()
            .ok_or_else(|| crate::Error::NullResponse("eth_gasPrice returned a value out of u128 range"))
    }

    /// `eth_sendRawTransaction`: submit a raw signed envelope.
    async fn send_raw_transaction(&self, raw: &[u8]) -> crate::Result<Hash> {
        let encoded = brane_primitives::Bytes::new(raw.to_vec()).to_string();
        Ok(self.client().prepare("eth_sendRawTransaction", (encoded,)).await?)
    }

    /// Starts a [`MulticallBuilder`](crate::MulticallBuilder) batch
    /// against the default Multicall3 deployment:
    /// `provider.multicall().add(call1).add(call2).aggregate().await`.
    fn multicall(&self) -> crate::multicall::MulticallBuilder<'_, T, Self>
    where
        Self: Sized + Sync,
    {
        crate::multicall::MulticallBuilder::new(self)
    }
}
