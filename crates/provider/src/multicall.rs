//! Batched `eth_call`s against the [Multicall3] contract.
//!
//! Grounded on the teacher's `provider/multicall` builder, but every call
//! here is an opaque `(target, calldata)` pair encoded and decoded with
//! `brane_dyn_abi`'s runtime-typed [`AbiType`]/[`AbiValue`] directly,
//! rather than the teacher's tuple-typed, `sol!`-macro-generated
//! bindings: this workspace has no typed-contract-binding crate to thread
//! per-call result types through the batch, so decoding each
//! [`MulticallResult::return_data`] against its own schema is left to the
//! caller.
//!
//! [Multicall3]: https://github.com/mds1/multicall

use crate::{reader::Reader, types::{BlockId, TransactionRequest}};
use brane_dyn_abi::{encode_function_call, selector, AbiType, AbiValue};
use brane_primitives::{Address, Bytes};
use brane_transport::Transport;

/// The canonical Multicall3 deployment address, identical across 270+
/// chains.
pub const MULTICALL3_ADDRESS: Address = Address::new([
    0xca, 0x11, 0xbd, 0xe0, 0x59, 0x77, 0xb3, 0x63, 0x11, 0x67, 0x02, 0x88, 0x62, 0xbe, 0x2a, 0x17,
    0x39, 0x76, 0xca, 0x11,
]);

/// One call within a [`MulticallBuilder`] batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call3 {
    /// The contract to call.
    pub target: Address,
    /// If `false`, a revert in this call aborts the whole batch instead of
    /// being reported in its [`MulticallResult`].
    pub allow_failure: bool,
    /// The already ABI-encoded call data (selector plus arguments).
    pub call_data: Bytes,
}

impl Call3 {
    /// A call that tolerates failure, reporting it in its result.
    pub fn new(target: Address, call_data: Bytes) -> Self {
        Self { target, allow_failure: true, call_data }
    }

    /// Marks this call as required: its failure reverts the whole batch.
    pub fn require_success(mut self) -> Self {
        self.allow_failure = false;
        self
    }
}

/// One call's outcome from `aggregate3`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MulticallResult {
    /// `false` if this call reverted (only possible when its [`Call3`] set
    /// `allow_failure`).
    pub success: bool,
    /// The raw return data; empty when `success` is `false`.
    pub return_data: Bytes,
}

/// Collects calls into a single `eth_call` against the Multicall3
/// contract.
///
/// No thread-local recording state is involved: every call a batch will
/// make is an explicit [`Call3`] passed to [`Self::add`].
#[must_use = "a multicall does nothing until `.aggregate()` is awaited"]
#[derive(Debug)]
pub struct MulticallBuilder<'p, T, P> {
    provider: &'p P,
    address: Address,
    block: BlockId,
    calls: Vec<Call3>,
    _transport: std::marker::PhantomData<T>,
}

impl<'p, T, P> MulticallBuilder<'p, T, P>
where
    T: Transport + Clone,
    P: Reader<T> + Sync,
{
    /// Starts an empty batch against the default [`MULTICALL3_ADDRESS`],
    /// evaluated at the latest block.
    pub fn new(provider: &'p P) -> Self {
        Self {
            provider,
            address: MULTICALL3_ADDRESS,
            block: BlockId::default(),
            calls: Vec::new(),
            _transport: std::marker::PhantomData,
        }
    }

    /// Overrides the Multicall3 contract address.
    pub fn address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Evaluates the batch against `block` instead of the latest one.
    pub fn block(mut self, block: BlockId) -> Self {
        self.block = block;
        self
    }

    /// Appends a call to the batch.
    pub fn add(mut self, call: Call3) -> Self {
        self.calls.push(call);
        self
    }

    /// Sends the batch as a single `eth_call` to the contract's
    /// `aggregate3` function, returning one [`MulticallResult`] per call,
    /// in the order they were added.
    pub async fn aggregate(&self) -> crate::Result<Vec<MulticallResult>> {
        let call_schema = AbiType::Tuple(vec![AbiType::Address, AbiType::Bool, AbiType::Bytes]);
        let calls = AbiValue::Array(
            self.calls
                .iter()
                .map(|call| {
                    AbiValue::Tuple(vec![
                        AbiValue::Address(call.target.clone()),
                        AbiValue::Bool(call.allow_failure),
                        AbiValue::Bytes(call.call_data.as_slice().to_vec()),
                    ])
                })
                .collect(),
        );

        let sel = selector("aggregate3", &[AbiType::Array(Box::new(call_schema))]);
        let call_data = encode_function_call(sel, &[calls])?;

        let tx = TransactionRequest {
            to: Some(self.address.clone()),
            input: Some(Bytes::new(call_data)),
            ..TransactionRequest::default()
        };
        let raw_result = self.provider.call(&tx, self.block).await?;

        let result_schema = AbiType::Array(Box::new(AbiType::Tuple(vec![AbiType::Bool, AbiType::Bytes])));
        let decoded = brane_dyn_abi::decode(&[result_schema], raw_result.as_slice())?;

        let AbiValue::Array(entries) = decoded.into_iter().next().expect("one return value") else {
            return Err(crate::Error::Unsupported("aggregate3 did not return an array"));
        };

        entries
            .into_iter()
            .map(|entry| {
                let AbiValue::Tuple(mut fields) = entry else {
                    return Err(crate::Error::Unsupported("aggregate3 result entry was not a tuple"));
                };
                let return_data = fields.pop();
                let success = fields.pop();
                match (success, return_data) {
                    (Some(AbiValue::Bool(success)), Some(AbiValue::Bytes(return_data))) => {
                        Ok(MulticallResult { success, return_data: Bytes::new(return_data) })
                    }
                    _ => Err(crate::Error::Unsupported("aggregate3 result entry had an unexpected shape")),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call3_require_success_clears_allow_failure() {
        let call = Call3::new(Address::ZERO, Bytes::empty()).require_success();
        assert!(!call.allow_failure);
    }
}
