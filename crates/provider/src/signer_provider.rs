//! The `Signer` capability: every `Reader` operation plus the ability to
//! build, sign and submit transactions.

use crate::{
    gas::{DefaultGasStrategy, FeeValues, GasStrategy},
    heart::PendingTransactionBuilder,
    reader::Reader,
    root::RootProvider,
    types::{BlockId, BlockTag, TransactionRequest},
    Error, Result,
};
use brane_consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use brane_eips::eip2930::AccessList as ConsensusAccessList;
use brane_primitives::{ChainId, Hash};
use brane_rlp::Encodable;
use brane_rpc_client::RpcClient;
use brane_signer::Signer;
use brane_transport::Transport;

/// A [`Reader`] plus a [`Signer`]: can submit transactions on the
/// signer's behalf.
///
/// `Signer` is a strict extension of `Reader` — every method `Reader`
/// provides is still available, by delegating to the wrapped
/// [`RootProvider`].
pub struct SignerProvider<T, S, G = DefaultGasStrategy> {
    inner: RootProvider<T>,
    signer: S,
    gas_strategy: G,
}

impl<T: std::fmt::Debug, S: std::fmt::Debug, G: std::fmt::Debug> std::fmt::Debug for SignerProvider<T, S, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerProvider")
            .field("inner", &self.inner)
            .field("signer", &self.signer)
            .field("gas_strategy", &self.gas_strategy)
            .finish()
    }
}

impl<T, S, G> Clone for SignerProvider<T, S, G>
where
    T: Transport + Clone,
    S: Clone,
    G: Clone,
{
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), signer: self.signer.clone(), gas_strategy: self.gas_strategy.clone() }
    }
}

impl<T: Transport + Clone, S: Signer> SignerProvider<T, S, DefaultGasStrategy> {
    /// Wraps a [`RootProvider`] and a [`Signer`] with the default gas
    /// strategy.
    pub fn new(inner: RootProvider<T>, signer: S) -> Self {
        Self { inner, signer, gas_strategy: DefaultGasStrategy::default() }
    }
}

impl<T: Transport + Clone, S: Signer, G: GasStrategy> SignerProvider<T, S, G> {
    /// Wraps a [`RootProvider`] and a [`Signer`] with an explicit gas
    /// strategy.
    pub fn with_gas_strategy(inner: RootProvider<T>, signer: S, gas_strategy: G) -> Self {
        Self { inner, signer, gas_strategy }
    }

    /// The wrapped signer.
    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Builds, signs and submits `tx`, filling any unset fields:
    ///
    /// 1. `nonce` via `eth_getTransactionCount(from, pending)`, `gas` via
    ///    `eth_estimateGas`, fees via the configured [`GasStrategy`], and
    ///    `chainId` from the signer (or fetched and cached on first use).
    /// 2. Builds the unsigned legacy or EIP-1559 transaction variant
    ///    (EIP-2930/4844/7702 are not constructed by this facade).
    /// 3. Asks the signer for a signature over
    ///    `SignableTransaction::signature_hash`.
    /// 4. Produces the raw [EIP-2718] envelope via `encode_envelope`.
    /// 5. Submits it with `eth_sendRawTransaction`.
    ///
    /// Returns the transaction hash; call
    /// [`PendingTransactionBuilder::watch`] on
    /// [`Self::send_transaction_and_wait`] to poll for a receipt.
    ///
    /// [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718
    pub async fn send_transaction(&self, tx: TransactionRequest) -> Result<Hash> {
        let envelope = self.fill_and_sign(tx).await?;
        let mut raw = Vec::with_capacity(envelope.tx_hash().as_bytes().len());
        envelope.encode_envelope(&mut raw);
        Ok(self.inner.send_raw_transaction(&raw).await?)
    }

    /// Like [`Self::send_transaction`], but returns a
    /// [`PendingTransactionBuilder`] that polls `eth_getTransactionReceipt`
    /// until the transaction is mined or the wait times out.
    pub async fn send_transaction_and_wait(&self, tx: TransactionRequest) -> Result<PendingTransactionBuilder<'_, T>> {
        let tx_hash = self.send_transaction(tx).await?;
        Ok(self.inner.watch_transaction(tx_hash))
    }

    async fn fill_and_sign(&self, mut tx: TransactionRequest) -> Result<TxEnvelope> {
        let from = tx.from.or_else(|| Some(self.signer.address())).ok_or(Error::NullResponse("from"))?;
        tx.from = Some(from);

        let chain_id = match tx.chain_id.or_else(|| self.signer.chain_id()) {
            Some(id) => id,
            None => self.inner.chain_id().await?,
        };

        if tx.nonce.is_none() {
            tx.nonce = Some(self.inner.get_transaction_count(from, BlockId::Tag(BlockTag::Pending)).await?);
        }

        if tx.gas.is_none() {
            tx.gas = Some(self.inner.estimate_gas(&tx, BlockId::default()).await?);
        }

        let skip_header = tx.gas_price.is_some()
            || (tx.max_fee_per_gas.is_some() && tx.max_priority_fee_per_gas.is_some());
        let latest_header = if skip_header { None } else { self.inner.get_latest_header().await? };

        let meta = match self.gas_strategy.plan(&tx, latest_header.as_ref())? {
            crate::gas::FeePlan::Resolved(meta) => meta,
            plan @ crate::gas::FeePlan::NeedsLegacyGasPrice { .. } => {
                plan.resolve_legacy(self.inner.gas_price().await?)
            }
        };

        let envelope = self.build_envelope(&tx, chain_id, meta.fees)?;
        let digest = envelope_signature_hash(&envelope);
        let signature = self.signer.sign_hash(digest).await?;
        Ok(attach_signature(envelope, signature))
    }

    fn build_envelope(&self, tx: &TransactionRequest, chain_id: ChainId, fees: FeeValues) -> Result<UnsignedEnvelope> {
        let access_list: ConsensusAccessList =
            tx.access_list.clone().map(Into::into).unwrap_or_else(ConsensusAccessList::empty);
        let nonce = tx.nonce.expect("filled above");
        let gas_limit = tx.gas.expect("filled above");
        let value = tx.value.clone().unwrap_or_else(brane_primitives::Wei::zero);
        let input = tx.input.clone().unwrap_or_default();
        let to: brane_consensus::TxKind = tx.to.into();

        Ok(match fees {
            FeeValues::Legacy { gas_price } => UnsignedEnvelope::Legacy(TxLegacy {
                chain_id: Some(chain_id),
                nonce,
                gas_price,
                gas_limit,
                to,
                value,
                input,
            }),
            FeeValues::Eip1559 { max_fee_per_gas, max_priority_fee_per_gas } => {
                UnsignedEnvelope::Eip1559(TxEip1559 {
                    chain_id,
                    nonce,
                    max_priority_fee_per_gas,
                    max_fee_per_gas,
                    gas_limit,
                    to,
                    value,
                    access_list,
                    input,
                })
            }
        })
    }
}

/// The unsigned transaction variants this facade can build. Kept private:
/// callers interact with [`TransactionRequest`]; this only exists to
/// carry a not-yet-signed value between [`SignableTransaction::signature_hash`]
/// and [`SignableTransaction::into_signed`].
enum UnsignedEnvelope {
    Legacy(TxLegacy),
    Eip1559(TxEip1559),
}

fn envelope_signature_hash(envelope: &UnsignedEnvelope) -> Hash {
    match envelope {
        UnsignedEnvelope::Legacy(tx) => tx.signature_hash(),
        UnsignedEnvelope::Eip1559(tx) => tx.signature_hash(),
    }
}

fn attach_signature(envelope: UnsignedEnvelope, signature: brane_signer::Signature) -> TxEnvelope {
    match envelope {
        UnsignedEnvelope::Legacy(tx) => tx.into_signed(signature).into(),
        UnsignedEnvelope::Eip1559(tx) => tx.into_signed(signature).into(),
    }
}

impl<T: Transport + Clone, S: Signer, G: GasStrategy> Reader<T> for SignerProvider<T, S, G> {
    fn client(&self) -> &RpcClient<T> {
        self.inner.client()
    }
}
