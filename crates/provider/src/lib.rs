#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

//! Client facade (C16) and gas strategy (C15) over a `brane-rpc-client`
//! connection: a capability hierarchy of `Reader`, `Signer` and `Tester`,
//! a fillable [`TransactionRequest`](types::TransactionRequest), the
//! fee-model heuristic that decides legacy vs. EIP-1559 pricing, and a
//! builder-object multicall batcher.
//!
//! This crate does not speak to a network by itself; it drives a
//! `brane-rpc-client::RpcClient<T>` for any transport `T`.

#[macro_use]
extern crate tracing;

mod error;
pub use error::{Error, Result};

pub mod types;
pub use types::{
    AccessListResult, BlockHeader, BlockId, BlockTag, Filter, Log, TransactionReceipt,
    TransactionRequest,
};

mod gas;
pub use gas::{
    DefaultGasStrategy, FallbackPolicy, FallbackReason, FeePlan, FeeProvenance, FeeValues,
    GasEstimateMetadata, GasStrategy,
};

mod metrics;
pub use metrics::{Metrics, MetricsLayer, NoopMetrics};

mod heart;
pub use heart::PendingTransactionBuilder;

mod root;
pub use root::RootProvider;

mod reader;
pub use reader::Reader;

mod signer_provider;
pub use signer_provider::SignerProvider;

mod tester;
pub use tester::{ImpersonationGuard, ResetConfig, StateDump, TesterProvider};

mod multicall;
pub use multicall::{Call3, MulticallBuilder, MulticallResult, MULTICALL3_ADDRESS};

mod builder;
pub use builder::{NoSigner, ProviderBuilder};

#[cfg(feature = "ws")]
pub use brane_rpc_client::WsConnect;
