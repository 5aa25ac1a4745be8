//! Gas strategy (C15): decide legacy `gasPrice` vs. EIP-1559
//! `(maxPriorityFeePerGas, maxFeePerGas)` pricing for a [`TransactionRequest`],
//! and document which values came from the caller, which were computed,
//! and whether a fallback fired.

use crate::types::{BlockHeader, TransactionRequest};

/// What happens when EIP-1559 pricing is requested (explicitly, or by
/// default because the caller set neither `gas_price` nor an access
/// list) but the latest block reports no base fee.
///
/// The default is [`Self::FallbackWarn`]: EIP-1559 is the common case on
/// any post-London chain, so a missing base fee is far more often "this
/// chain predates London" than an error worth surfacing as one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Return [`crate::Error::NoBaseFee`] instead of a fee estimate.
    Throw,
    /// Fall back to legacy `gasPrice` pricing and log a `tracing::warn!`.
    #[default]
    FallbackWarn,
    /// Fall back to legacy `gasPrice` pricing silently.
    FallbackSilent,
}

/// Why a [`GasStrategy`] fell back from the fee model it was asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    /// EIP-1559 pricing was wanted but the latest block reported no base
    /// fee.
    NoBaseFee,
}

/// The fee values a strategy decided on, tagged by pricing model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeValues {
    /// A flat `gasPrice`.
    Legacy {
        /// The price per unit of gas, in wei.
        gas_price: u128,
    },
    /// EIP-1559 fee cap and priority fee.
    Eip1559 {
        /// The absolute maximum the sender will pay per unit of gas.
        max_fee_per_gas: u128,
        /// The tip offered to the block proposer.
        max_priority_fee_per_gas: u128,
    },
}

impl FeeValues {
    /// `true` if this is the EIP-1559 variant.
    pub const fn is_eip1559(&self) -> bool {
        matches!(self, Self::Eip1559 { .. })
    }
}

/// Which of a [`FeeValues`]'s fields came from the caller's request
/// rather than being computed by the strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeProvenance {
    /// `gas_price` (legacy) or both EIP-1559 fields were caller-provided.
    pub caller_provided: bool,
}

/// The decision a [`GasStrategy`] made, plus enough context to explain it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasEstimateMetadata {
    /// The fee values to use.
    pub fees: FeeValues,
    /// Whether `fees` came from the caller or was computed.
    pub provenance: FeeProvenance,
    /// Set when the strategy fell back from the model it was first asked
    /// to use.
    pub fallback: Option<FallbackReason>,
}

/// What a [`GasStrategy`] needs before it can finish deciding. Fee
/// estimation is synchronous everywhere except legacy `gasPrice`, which
/// only the RPC endpoint (`eth_gasPrice`) can supply — so a plan either
/// resolves outright or asks its caller for that one value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeePlan {
    /// The strategy has everything it needs.
    Resolved(GasEstimateMetadata),
    /// The caller must fetch `eth_gasPrice` and finish the plan with
    /// [`FeePlan::resolve_legacy`].
    NeedsLegacyGasPrice {
        /// Set if this legacy request is itself a fallback from EIP-1559.
        fallback: Option<FallbackReason>,
    },
}

impl FeePlan {
    /// Finishes a [`FeePlan::NeedsLegacyGasPrice`] plan with a fetched
    /// `gas_price`. A no-op if this plan was already [`Self::Resolved`].
    pub fn resolve_legacy(self, gas_price: u128) -> GasEstimateMetadata {
        match self {
            Self::Resolved(meta) => meta,
            Self::NeedsLegacyGasPrice { fallback } => {
                GasEstimateMetadata { fees: FeeValues::Legacy { gas_price }, provenance: FeeProvenance::default(), fallback }
            }
        }
    }
}

/// Decides a transaction's fee model.
///
/// The default heuristic: if the caller's request already forces legacy
/// pricing (see [`TransactionRequest::wants_legacy_pricing`]), honor
/// that; otherwise prefer EIP-1559 when the latest block reports a base
/// fee, falling back to legacy per [`FallbackPolicy`] when it doesn't.
/// The EIP-1559 priority fee itself is a fixed 1.5 gwei tip with the fee
/// cap set to `2 * base_fee + priority_fee`, a standard headroom
/// heuristic that tolerates two consecutive full blocks before the
/// transaction becomes underpriced.
pub trait GasStrategy: Send + Sync {
    /// The configured fallback policy.
    fn fallback_policy(&self) -> FallbackPolicy;

    /// The priority fee (in wei) to offer when pricing an EIP-1559
    /// transaction whose fees weren't set by the caller.
    fn default_priority_fee(&self) -> u128 {
        1_500_000_000
    }

    /// Plans fee values for `tx`, given the latest block header (used to
    /// detect EIP-1559 support). `latest_header` may be `None` when the
    /// caller's request already fully specifies its fee fields.
    fn plan(&self, tx: &TransactionRequest, latest_header: Option<&BlockHeader>) -> crate::Result<FeePlan> {
        if let (Some(max_fee_per_gas), Some(max_priority_fee_per_gas)) =
            (tx.max_fee_per_gas, tx.max_priority_fee_per_gas)
        {
            return Ok(FeePlan::Resolved(GasEstimateMetadata {
                fees: FeeValues::Eip1559 { max_fee_per_gas, max_priority_fee_per_gas },
                provenance: FeeProvenance { caller_provided: true },
                fallback: None,
            }));
        }

        if let Some(gas_price) = tx.gas_price {
            return Ok(FeePlan::Resolved(GasEstimateMetadata {
                fees: FeeValues::Legacy { gas_price },
                provenance: FeeProvenance { caller_provided: true },
                fallback: None,
            }));
        }

        if tx.wants_legacy_pricing() {
            return Ok(FeePlan::NeedsLegacyGasPrice { fallback: None });
        }

        match latest_header.and_then(|h| h.base_fee_per_gas) {
            Some(base_fee) => {
                let max_priority_fee_per_gas = self.default_priority_fee();
                let max_fee_per_gas = base_fee.saturating_mul(2).saturating_add(max_priority_fee_per_gas);
                Ok(FeePlan::Resolved(GasEstimateMetadata {
                    fees: FeeValues::Eip1559 { max_fee_per_gas, max_priority_fee_per_gas },
                    provenance: FeeProvenance::default(),
                    fallback: None,
                }))
            }
            None => match self.fallback_policy() {
                FallbackPolicy::Throw => Err(crate::Error::NoBaseFee),
                FallbackPolicy::FallbackWarn => {
                    warn!("no base fee on latest block, falling back to legacy gas pricing");
                    Ok(FeePlan::NeedsLegacyGasPrice { fallback: Some(FallbackReason::NoBaseFee) })
                }
                FallbackPolicy::FallbackSilent => {
                    Ok(FeePlan::NeedsLegacyGasPrice { fallback: Some(FallbackReason::NoBaseFee) })
                }
            },
        }
    }
}

/// The default [`GasStrategy`]: prefer EIP-1559, fall back to legacy with
/// a warning when the chain doesn't support it.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultGasStrategy {
    policy: FallbackPolicy,
}

impl DefaultGasStrategy {
    /// Creates a strategy with the given fallback policy.
    pub const fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }
}

impl GasStrategy for DefaultGasStrategy {
    fn fallback_policy(&self) -> FallbackPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(base_fee: Option<u128>) -> BlockHeader {
        BlockHeader {
            number: 1,
            hash: brane_primitives::Hash::ZERO,
            parent_hash: brane_primitives::Hash::ZERO,
            timestamp: 0,
            base_fee_per_gas: base_fee,
            gas_limit: 30_000_000,
            gas_used: 0,
        }
    }

    #[test]
    fn prefers_eip1559_when_base_fee_present() {
        let strategy = DefaultGasStrategy::default();
        let tx = TransactionRequest::new();
        let plan = strategy.plan(&tx, Some(&header(Some(10)))).unwrap();
        let FeePlan::Resolved(meta) = plan else { panic!("expected a resolved plan") };
        assert!(meta.fees.is_eip1559());
        assert!(meta.fallback.is_none());
    }

    #[test]
    fn falls_back_to_legacy_and_warns_by_default() {
        let strategy = DefaultGasStrategy::default();
        assert_eq!(strategy.fallback_policy(), FallbackPolicy::FallbackWarn);
        let tx = TransactionRequest::new();
        let plan = strategy.plan(&tx, Some(&header(None))).unwrap();
        assert_eq!(plan, FeePlan::NeedsLegacyGasPrice { fallback: Some(FallbackReason::NoBaseFee) });
        let meta = plan.resolve_legacy(42);
        assert_eq!(meta.fees, FeeValues::Legacy { gas_price: 42 });
        assert_eq!(meta.fallback, Some(FallbackReason::NoBaseFee));
    }

    #[test]
    fn throw_policy_errors_on_missing_base_fee() {
        let strategy = DefaultGasStrategy::new(FallbackPolicy::Throw);
        let tx = TransactionRequest::new();
        let err = strategy.plan(&tx, Some(&header(None))).unwrap_err();
        assert!(matches!(err, crate::Error::NoBaseFee));
    }

    #[test]
    fn caller_provided_fees_are_honored_without_a_header() {
        let strategy = DefaultGasStrategy::default();
        let tx = TransactionRequest { max_fee_per_gas: Some(5), max_priority_fee_per_gas: Some(1), ..Default::default() };
        let plan = strategy.plan(&tx, None).unwrap();
        let FeePlan::Resolved(meta) = plan else { panic!("expected a resolved plan") };
        assert!(meta.provenance.caller_provided);
    }
}
