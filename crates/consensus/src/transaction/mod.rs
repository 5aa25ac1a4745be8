//! The five Ethereum transaction variants and the trait that lets them
//! all be signed and RLP-encoded uniformly.

mod eip1559;
pub use eip1559::TxEip1559;

mod eip2930;
pub use eip2930::TxEip2930;

mod eip4844;
pub use eip4844::{TxEip4844, TxEip4844Fields, TxEip4844Variant, TxEip4844WithSidecar};

mod eip7702;
pub use eip7702::TxEip7702;

mod legacy;
pub use legacy::TxLegacy;

mod envelope;
pub use envelope::TxEnvelope;

use crate::Signed;
use brane_eips::{eip2930::AccessList, eip7702::SignedAuthorization};
use brane_primitives::{keccak256, ChainId, Hash, Wei};
use brane_signer::Signature;

use crate::tx_kind::TxKind;

/// A transaction that can be RLP-encoded into the preimage its sender
/// signs, and bundled with the resulting signature into a [`Signed`].
pub trait SignableTransaction: Sized {
    /// Appends the RLP encoding of the signing preimage to `out`
    /// (including the leading type byte for typed transactions).
    fn encode_for_signing(&self, out: &mut Vec<u8>);

    /// The length, in bytes, [`Self::encode_for_signing`] would write.
    fn payload_len_for_signature(&self) -> usize;

    /// The `keccak256` of [`Self::encode_for_signing`]'s output.
    fn signature_hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(self.payload_len_for_signature());
        self.encode_for_signing(&mut buf);
        Hash::new(keccak256(&buf))
    }

    /// Attaches `signature`, producing the signed envelope and sealing its
    /// hash.
    fn into_signed(self, signature: Signature) -> Signed<Self>;
}

/// Read-only access to the fields shared, in some form, by every
/// transaction variant.
pub trait Transaction {
    /// The replay-protection chain id, if the variant carries one
    /// (legacy transactions may predate [EIP-155] and have none).
    ///
    /// [EIP-155]: https://eips.ethereum.org/EIPS/eip-155
    fn chain_id(&self) -> Option<ChainId>;
    /// The sender's transaction count at submission time.
    fn nonce(&self) -> u64;
    /// The gas limit.
    fn gas_limit(&self) -> u64;
    /// `to`: the call target, or `Create` for contract creation.
    fn kind(&self) -> TxKind;
    /// The value transferred.
    fn value(&self) -> &Wei;
    /// The call or init-code data.
    fn input(&self) -> &[u8];
    /// The EIP-2930 access list, for variants that carry one.
    fn access_list(&self) -> Option<&AccessList>;
    /// The EIP-4844 blob versioned hashes, for blob transactions.
    fn blob_versioned_hashes(&self) -> Option<&[Hash]>;
    /// The EIP-7702 authorization list, for set-code transactions.
    fn authorization_list(&self) -> Option<&[SignedAuthorization]>;
    /// `true` if the variant prices gas with `(maxFeePerGas,
    /// maxPriorityFeePerGas)` rather than a flat `gasPrice`.
    fn is_dynamic_fee(&self) -> bool;
}
