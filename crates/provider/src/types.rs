//! Wire-shaped supplementary types the read/write surface (C16) needs
//! that no lower crate defines: block tags and headers, logs and the
//! `eth_getLogs`/`eth_subscribe("logs", ...)` filter object, receipts,
//! the `eth_createAccessList` result, and a fillable transaction request.
//!
//! `brane-consensus` only models concrete, fully-specified transaction
//! variants (`TxLegacy`, `TxEip1559`, ...); a JSON-RPC caller needs an
//! all-optional builder it fills in before choosing a variant, which is
//! [`TransactionRequest`] here.

use brane_eips::eip2930::{AccessList as ConsensusAccessList, AccessListItem as ConsensusAccessListItem};
use brane_primitives::{Address, Bytes, ChainId, Hash, Wei};
use serde::{Deserialize, Serialize};

/// A block reference as accepted by `eth_*` methods that take a block
/// parameter: a historical marker, or an explicit number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockTag {
    /// The most recent block the node has.
    #[default]
    Latest,
    /// The next block to be produced.
    Pending,
    /// The genesis block.
    Earliest,
    /// The most recent block the node considers safe from reorg.
    Safe,
    /// The most recent finalized block.
    Finalized,
    /// An explicit block number.
    Number(u64),
}

impl Serialize for BlockTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Latest => serializer.serialize_str("latest"),
            Self::Pending => serializer.serialize_str("pending"),
            Self::Earliest => serializer.serialize_str("earliest"),
            Self::Safe => serializer.serialize_str("safe"),
            Self::Finalized => serializer.serialize_str("finalized"),
            Self::Number(n) => serializer.serialize_str(&format!("0x{n:x}")),
        }
    }
}

impl<'de> Deserialize<'de> for BlockTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for BlockTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(Self::Latest),
            "pending" => Ok(Self::Pending),
            "earliest" => Ok(Self::Earliest),
            "safe" => Ok(Self::Safe),
            "finalized" => Ok(Self::Finalized),
            hex => {
                let n = hex.strip_prefix("0x").unwrap_or(hex);
                u64::from_str_radix(n, 16)
                    .map(Self::Number)
                    .map_err(|_| format!("invalid block tag: {s}"))
            }
        }
    }
}

impl From<u64> for BlockTag {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

/// A block reference: either a [`BlockTag`] or a specific hash.
///
/// Mirrors the `eth_*` JSON-RPC convention where a block parameter is
/// either the bare tag/number form or `{"blockHash": "0x.."}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockId {
    /// A tag or block number.
    Tag(BlockTag),
    /// An exact block hash.
    Hash(Hash),
}

impl Default for BlockId {
    fn default() -> Self {
        Self::Tag(BlockTag::Latest)
    }
}

impl Serialize for BlockId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Tag(tag) => tag.serialize(serializer),
            Self::Hash(hash) => {
                #[derive(Serialize)]
                struct ByHash {
                    #[serde(rename = "blockHash")]
                    block_hash: Hash,
                }
                ByHash { block_hash: *hash }.serialize(serializer)
            }
        }
    }
}

impl From<BlockTag> for BlockId {
    fn from(tag: BlockTag) -> Self {
        Self::Tag(tag)
    }
}

impl From<u64> for BlockId {
    fn from(n: u64) -> Self {
        Self::Tag(BlockTag::Number(n))
    }
}

impl From<Hash> for BlockId {
    fn from(hash: Hash) -> Self {
        Self::Hash(hash)
    }
}

/// One entry of a [`TransactionRequest`] or [`TxEnvelope`](brane_consensus::TxEnvelope)
/// access list, in its JSON-RPC wire shape.
///
/// Kept distinct from [`brane_eips::eip2930::AccessListItem`]: that type
/// is RLP-only and carries no `serde` support, since the consensus layer
/// never needs to round-trip it through JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListItem {
    /// The account address.
    pub address: Address,
    /// Storage slots pre-warmed for this account.
    #[serde(rename = "storageKeys")]
    pub storage_keys: Vec<Hash>,
}

/// A transaction's EIP-2930 access list, in its JSON-RPC wire shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessList(pub Vec<AccessListItem>);

impl From<AccessList> for ConsensusAccessList {
    fn from(list: AccessList) -> Self {
        ConsensusAccessList(
            list.0
                .into_iter()
                .map(|item| ConsensusAccessListItem { address: item.address, storage_keys: item.storage_keys })
                .collect(),
        )
    }
}

impl From<&ConsensusAccessList> for AccessList {
    fn from(list: &ConsensusAccessList) -> Self {
        Self(
            list.0
                .iter()
                .map(|item| AccessListItem { address: item.address, storage_keys: item.storage_keys.clone() })
                .collect(),
        )
    }
}

/// The header fields of a block, as returned by `eth_getBlockBy*`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// The block number.
    #[serde(with = "u64_hex")]
    pub number: u64,
    /// The block hash.
    pub hash: Hash,
    /// The parent block's hash.
    #[serde(rename = "parentHash")]
    pub parent_hash: Hash,
    /// The block's Unix timestamp, in seconds.
    #[serde(with = "u64_hex")]
    pub timestamp: u64,
    /// The EIP-1559 base fee per gas, if the block post-dates the London
    /// fork.
    #[serde(rename = "baseFeePerGas", default, skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<u128>,
    /// The block's gas limit.
    #[serde(rename = "gasLimit", with = "u64_hex")]
    pub gas_limit: u64,
    /// Gas actually consumed by the block's transactions.
    #[serde(rename = "gasUsed", with = "u64_hex")]
    pub gas_used: u64,
}

/// An Ethereum event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// The emitting contract's address.
    pub address: Address,
    /// Indexed topics; at most four entries, `topics[0]` is the event
    /// signature hash for non-anonymous events.
    pub topics: Vec<Hash>,
    /// The non-indexed event data.
    pub data: Bytes,
    /// The block the log was emitted in, if known (absent for pending
    /// logs).
    #[serde(rename = "blockHash", default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<Hash>,
    /// The block number, if known.
    #[serde(rename = "blockNumber", default, with = "opt_u64_hex")]
    pub block_number: Option<u64>,
    /// The emitting transaction's hash, if known.
    #[serde(rename = "transactionHash", default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<Hash>,
    /// The log's index within the block, if known.
    #[serde(rename = "logIndex", default, with = "opt_u64_hex")]
    pub log_index: Option<u64>,
    /// `true` if this log was removed due to a chain reorg.
    #[serde(default)]
    pub removed: bool,
}

/// A fluent builder for the `eth_getLogs` / `eth_subscribe("logs", ...)`
/// filter object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "fromBlock", default, skip_serializing_if = "Option::is_none")]
    from_block: Option<BlockTag>,
    #[serde(rename = "toBlock", default, skip_serializing_if = "Option::is_none")]
    to_block: Option<BlockTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<FilterAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    topics: Option<[Option<FilterTopic>; 4]>,
    #[serde(rename = "blockHash", default, skip_serializing_if = "Option::is_none")]
    block_hash: Option<Hash>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum FilterAddress {
    One(Address),
    Many(Vec<Address>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum FilterTopic {
    One(Hash),
    Many(Vec<Hash>),
}

impl Filter {
    /// Creates an empty filter matching every log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the filter to the given contract address.
    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(FilterAddress::One(address));
        self
    }

    /// Restricts the filter to any of the given contract addresses.
    pub fn addresses(mut self, addresses: Vec<Address>) -> Self {
        self.address = Some(FilterAddress::Many(addresses));
        self
    }

    /// Sets the inclusive lower block bound.
    pub fn from_block(mut self, block: impl Into<BlockTag>) -> Self {
        self.from_block = Some(block.into());
        self
    }

    /// Sets the inclusive upper block bound.
    pub fn to_block(mut self, block: impl Into<BlockTag>) -> Self {
        self.to_block = Some(block.into());
        self
    }

    /// Restricts the filter to a single block by hash; mutually exclusive
    /// with `from_block`/`to_block`.
    pub fn at_block_hash(mut self, hash: Hash) -> Self {
        self.block_hash = Some(hash);
        self
    }

    fn set_topic(mut self, index: usize, topic: FilterTopic) -> Self {
        let mut topics = self.topics.take().unwrap_or_default();
        topics[index] = Some(topic);
        self.topics = Some(topics);
        self
    }

    /// Sets `topics[0]`, usually the event signature hash.
    pub fn topic0(self, topic: Hash) -> Self {
        self.set_topic(0, FilterTopic::One(topic))
    }

    /// Sets `topics[1]`.
    pub fn topic1(self, topic: Hash) -> Self {
        self.set_topic(1, FilterTopic::One(topic))
    }

    /// Sets `topics[2]`.
    pub fn topic2(self, topic: Hash) -> Self {
        self.set_topic(2, FilterTopic::One(topic))
    }

    /// Sets `topics[3]`.
    pub fn topic3(self, topic: Hash) -> Self {
        self.set_topic(3, FilterTopic::One(topic))
    }

    /// Matches any of `topics` at `topics[0]`.
    pub fn topic0_many(self, topics: Vec<Hash>) -> Self {
        self.set_topic(0, FilterTopic::Many(topics))
    }
}

/// The result of `eth_getTransactionReceipt`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// The transaction's hash.
    #[serde(rename = "transactionHash")]
    pub transaction_hash: Hash,
    /// The transaction's index within its block.
    #[serde(rename = "transactionIndex", with = "u64_hex")]
    pub transaction_index: u64,
    /// The block the transaction was included in.
    #[serde(rename = "blockHash")]
    pub block_hash: Hash,
    /// The block number.
    #[serde(rename = "blockNumber", with = "u64_hex")]
    pub block_number: u64,
    /// The sender.
    pub from: Address,
    /// The receiver, or `None` for a contract creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// The address of the contract created, for a creation transaction.
    #[serde(rename = "contractAddress", default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
    /// Gas actually used.
    #[serde(rename = "gasUsed", with = "u64_hex")]
    pub gas_used: u64,
    /// The price actually paid per unit of gas.
    #[serde(rename = "effectiveGasPrice")]
    pub effective_gas_price: u128,
    /// `1` for success, `0` for a reverted transaction.
    #[serde(with = "u64_hex")]
    pub status: u64,
    /// Logs emitted by the transaction.
    pub logs: Vec<Log>,
    /// The [EIP-2718] type byte of the transaction.
    ///
    /// [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718
    #[serde(rename = "type", with = "u64_hex")]
    pub transaction_type: u64,
}

impl TransactionReceipt {
    /// `true` if [`Self::status`] reports success.
    pub const fn succeeded(&self) -> bool {
        self.status == 1
    }
}

/// The result of `eth_createAccessList`: the access list the node
/// computed plus the gas it estimates the transaction would use with it
/// applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListResult {
    /// The computed access list.
    #[serde(rename = "accessList")]
    pub access_list: AccessList,
    /// Gas used by the transaction with `access_list` applied.
    #[serde(rename = "gasUsed", with = "u64_hex")]
    pub gas_used: u64,
}

/// A transaction request: every field a caller or a [`GasStrategy`](crate::GasStrategy)
/// might fill in before the provider builds and signs a concrete
/// transaction variant.
///
/// Every field is optional; [`RootProvider::send_transaction`](crate::SignerProvider::send_transaction)
/// fills what's missing via read calls, per the 6-step orchestration
/// described on that method.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// The sender. Required to fill `nonce` and sign the transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// The receiver, or `None` for a contract creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Value transferred, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Wei>,
    /// Call or init-code data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Bytes>,
    /// The sender's transaction count at submission time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// The replay-protection chain id.
    #[serde(rename = "chainId", default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    /// The gas limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    /// Legacy/EIP-2930 flat gas price.
    #[serde(rename = "gasPrice", default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
    /// EIP-1559 priority fee.
    #[serde(rename = "maxPriorityFeePerGas", default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<u128>,
    /// EIP-1559 fee cap.
    #[serde(rename = "maxFeePerGas", default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<u128>,
    /// The EIP-2930 access list; also used to force legacy gas pricing
    /// when set without `gas_price`.
    #[serde(rename = "accessList", default, skip_serializing_if = "Option::is_none")]
    pub access_list: Option<AccessList>,
}

impl TransactionRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the receiver.
    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    /// Sets the sender.
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the value transferred.
    pub fn value(mut self, value: Wei) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the call or init-code data.
    pub fn input(mut self, input: Bytes) -> Self {
        self.input = Some(input);
        self
    }

    /// `true` if the request should be priced as a legacy/EIP-2930
    /// transaction rather than EIP-1559: a flat `gas_price` was set, or
    /// an access list was set without EIP-1559 fee fields.
    pub fn wants_legacy_pricing(&self) -> bool {
        self.gas_price.is_some()
            || (self.access_list.is_some()
                && self.max_fee_per_gas.is_none()
                && self.max_priority_fee_per_gas.is_none())
    }
}

mod u64_hex {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        format!("0x{value:x}").serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom)
    }
}

mod opt_u64_hex {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => format!("0x{v:x}").serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        s.map(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_tag_round_trips_through_str() {
        for tag in [BlockTag::Latest, BlockTag::Pending, BlockTag::Earliest, BlockTag::Number(42)] {
            let s = serde_json::to_string(&tag).unwrap();
            let parsed: BlockTag = serde_json::from_str(&s).unwrap();
            assert_eq!(parsed, tag);
        }
    }

    #[test]
    fn filter_builder_sets_fields() {
        let addr = Address::ZERO;
        let topic = Hash::ZERO;
        let filter = Filter::new().address(addr).topic0(topic).from_block(BlockTag::Earliest);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["fromBlock"], "earliest");
        assert!(json["topics"].is_array());
    }

    #[test]
    fn transaction_request_wants_legacy_pricing_with_gas_price() {
        let tx = TransactionRequest::new().to(Address::ZERO);
        assert!(!tx.wants_legacy_pricing());
        let tx = TransactionRequest { gas_price: Some(1), ..tx };
        assert!(tx.wants_legacy_pricing());
    }
}
