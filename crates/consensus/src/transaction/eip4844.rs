use crate::error::TransactionError;
use crate::signed::Signed;
use crate::transaction::{SignableTransaction, Transaction};
use crate::tx_kind::TxKind;
use crate::tx_type::TxType;
use brane_eips::eip2930::AccessList;
use brane_eips::eip4844::{
    BlobTransactionSidecar, MAX_BLOBS_PER_TRANSACTION, MIN_BLOBS_PER_TRANSACTION,
};
use brane_eips::eip7702::SignedAuthorization;
use brane_primitives::{keccak256, Address, Bytes, ChainId, Hash, Wei};
use brane_rlp::{Decodable, Encodable, Error as RlpError, Header};
use brane_signer::Signature;

/// An [EIP-4844] blob transaction. Contract creation is forbidden, so `to`
/// is a bare [`Address`] rather than a [`TxKind`].
///
/// [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxEip4844 {
    /// Chain this transaction is valid on.
    pub chain_id: ChainId,
    /// The sender's transaction count at submission time.
    pub nonce: u64,
    /// Tip paid to the block proposer, in wei per unit of gas.
    pub max_priority_fee_per_gas: u128,
    /// The most this transaction will pay per unit of gas, tip included.
    pub max_fee_per_gas: u128,
    /// Maximum gas the transaction may consume.
    pub gas_limit: u64,
    /// Call target. Blob transactions cannot create contracts.
    pub to: Address,
    /// Value transferred, in wei.
    pub value: Wei,
    /// Accounts and storage slots pre-warmed for this transaction.
    pub access_list: AccessList,
    /// Call data.
    pub input: Bytes,
    /// The most this transaction will pay per unit of blob gas.
    pub max_fee_per_blob_gas: u128,
    /// Versioned hashes of the blob commitments this transaction
    /// references. Must contain between [`MIN_BLOBS_PER_TRANSACTION`] and
    /// [`MAX_BLOBS_PER_TRANSACTION`] entries.
    pub blob_versioned_hashes: Vec<Hash>,
}

impl TxEip4844 {
    /// Builds a transaction, rejecting a `to` of `Create` and a blob count
    /// outside `[1, 6]`.
    pub fn new(
        to: TxKind,
        blob_versioned_hashes: Vec<Hash>,
        fields: TxEip4844Fields,
    ) -> Result<Self, TransactionError> {
        let to = to.to().copied().ok_or(TransactionError::Eip4844ContractCreation)?;
        if !(MIN_BLOBS_PER_TRANSACTION..=MAX_BLOBS_PER_TRANSACTION)
            .contains(&blob_versioned_hashes.len())
        {
            return Err(TransactionError::InvalidBlobCount(blob_versioned_hashes.len()));
        }
        Ok(Self {
            chain_id: fields.chain_id,
            nonce: fields.nonce,
            max_priority_fee_per_gas: fields.max_priority_fee_per_gas,
            max_fee_per_gas: fields.max_fee_per_gas,
            gas_limit: fields.gas_limit,
            to,
            value: fields.value,
            access_list: fields.access_list,
            input: fields.input,
            max_fee_per_blob_gas: fields.max_fee_per_blob_gas,
            blob_versioned_hashes,
        })
    }

    /// Checks the `[1, 6]` blob-count invariant on an already-built value
    /// (e.g. one decoded off the wire).
    pub fn validate_blob_count(&self) -> Result<(), TransactionError> {
        if (MIN_BLOBS_PER_TRANSACTION..=MAX_BLOBS_PER_TRANSACTION)
            .contains(&self.blob_versioned_hashes.len())
        {
            Ok(())
        } else {
            Err(TransactionError::InvalidBlobCount(self.blob_versioned_hashes.len()))
        }
    }

    fn fields_len(&self) -> usize {
        self.chain_id.length()
            + self.nonce.length()
            + self.max_priority_fee_per_gas.length()
            + self.max_fee_per_gas.length()
            + self.gas_limit.length()
            + self.to.length()
            + self.value.length()
            + self.input.length()
            + self.access_list.length()
            + self.max_fee_per_blob_gas.length()
            + self.blob_versioned_hashes.length()
    }

    fn encode_fields(&self, out: &mut Vec<u8>) {
        self.chain_id.encode(out);
        self.nonce.encode(out);
        self.max_priority_fee_per_gas.encode(out);
        self.max_fee_per_gas.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
        self.access_list.encode(out);
        self.max_fee_per_blob_gas.encode(out);
        self.blob_versioned_hashes.encode(out);
    }

    fn decode_fields(buf: &mut &[u8]) -> Result<Self, RlpError> {
        Ok(Self {
            chain_id: ChainId::decode(buf)?,
            nonce: u64::decode(buf)?,
            max_priority_fee_per_gas: u128::decode(buf)?,
            max_fee_per_gas: u128::decode(buf)?,
            gas_limit: u64::decode(buf)?,
            to: Address::decode(buf)?,
            value: Wei::decode(buf)?,
            input: Bytes::decode(buf)?,
            access_list: AccessList::decode(buf)?,
            max_fee_per_blob_gas: u128::decode(buf)?,
            blob_versioned_hashes: Vec::decode(buf)?,
        })
    }

    fn signature_fields_len(&self, signature: &Signature) -> usize {
        y_parity(signature).length() + signature.r().length() + signature.s().length()
    }

    fn encode_signature_fields(&self, signature: &Signature, out: &mut Vec<u8>) {
        y_parity(signature).encode(out);
        signature.r().encode(out);
        signature.s().encode(out);
    }

    /// Encodes the canonical signed envelope: `0x03 ‖ rlp([fields..., yParity, r, s])`.
    /// Does not include the blob sidecar; see [`Signed::encode_network_wrapper`]
    /// for the broadcast form that does.
    pub fn encode_signed(&self, signature: &Signature, out: &mut Vec<u8>) {
        out.push(TxType::Eip4844 as u8);
        let payload_length = self.fields_len() + self.signature_fields_len(signature);
        Header { list: true, payload_length }.encode(out);
        self.encode_fields(out);
        self.encode_signature_fields(signature, out);
    }

    /// The byte length [`Self::encode_signed`] would write.
    pub fn encoded_len_with_signature(&self, signature: &Signature) -> usize {
        let payload_length = self.fields_len() + self.signature_fields_len(signature);
        1 + Header { list: true, payload_length }.length() + payload_length
    }

    /// Decodes the RLP list body of a signed canonical envelope (the
    /// caller has already consumed the leading `0x03` type byte).
    pub fn decode_signed_fields(buf: &mut &[u8]) -> Result<Signed<Self>, RlpError> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(RlpError::UnexpectedString);
        }
        let before = buf.len();
        let tx = Self::decode_fields(buf)?;
        let y_parity = u8::decode(buf)?;
        let r = Hash::decode(buf)?;
        let s = Hash::decode(buf)?;
        let consumed = before - buf.len();
        if consumed != header.payload_length {
            return Err(RlpError::ListLengthMismatch {
                declared_end: header.payload_length,
                actual_end: consumed,
            });
        }
        let signature = Signature::from_scalars(r, s, y_parity as u64)
            .map_err(|_| RlpError::UnexpectedLength { expected: 32, actual: 32 })?;
        let hash = tx.tx_hash(&signature);
        Ok(Signed::new_unchecked(tx, signature, hash))
    }

    fn tx_hash(&self, signature: &Signature) -> Hash {
        let mut buf = Vec::with_capacity(self.encoded_len_with_signature(signature));
        self.encode_signed(signature, &mut buf);
        Hash::new(keccak256(&buf))
    }
}

/// The non-`to`/non-blob-hash fields needed to build a [`TxEip4844`]
/// through [`TxEip4844::new`].
pub struct TxEip4844Fields {
    /// Chain this transaction is valid on.
    pub chain_id: ChainId,
    /// The sender's transaction count at submission time.
    pub nonce: u64,
    /// Tip paid to the block proposer, in wei per unit of gas.
    pub max_priority_fee_per_gas: u128,
    /// The most this transaction will pay per unit of gas, tip included.
    pub max_fee_per_gas: u128,
    /// Maximum gas the transaction may consume.
    pub gas_limit: u64,
    /// Value transferred, in wei.
    pub value: Wei,
    /// Accounts and storage slots pre-warmed for this transaction.
    pub access_list: AccessList,
    /// Call data.
    pub input: Bytes,
    /// The most this transaction will pay per unit of blob gas.
    pub max_fee_per_blob_gas: u128,
}

fn y_parity(signature: &Signature) -> u8 {
    signature.recid().to_byte()
}

impl SignableTransaction for TxEip4844 {
    fn encode_for_signing(&self, out: &mut Vec<u8>) {
        out.push(TxType::Eip4844 as u8);
        let payload_length = self.fields_len();
        Header { list: true, payload_length }.encode(out);
        self.encode_fields(out);
    }

    fn payload_len_for_signature(&self) -> usize {
        let payload_length = self.fields_len();
        1 + Header { list: true, payload_length }.length() + payload_length
    }

    fn into_signed(self, signature: Signature) -> Signed<Self> {
        let hash = self.tx_hash(&signature);
        Signed::new_unchecked(self, signature, hash)
    }
}

impl Transaction for TxEip4844 {
    fn chain_id(&self) -> Option<ChainId> {
        Some(self.chain_id)
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    fn kind(&self) -> TxKind {
        TxKind::Call(self.to)
    }

    fn value(&self) -> &Wei {
        &self.value
    }

    fn input(&self) -> &[u8] {
        self.input.as_slice()
    }

    fn access_list(&self) -> Option<&AccessList> {
        Some(&self.access_list)
    }

    fn blob_versioned_hashes(&self) -> Option<&[Hash]> {
        Some(&self.blob_versioned_hashes)
    }

    fn authorization_list(&self) -> Option<&[SignedAuthorization]> {
        None
    }

    fn is_dynamic_fee(&self) -> bool {
        true
    }
}

/// A [`TxEip4844`] paired with the blob sidecar it will broadcast with.
/// The sidecar is not part of the signed envelope or its hash; it rides
/// alongside on the network only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxEip4844WithSidecar {
    /// The transaction proper.
    pub tx: TxEip4844,
    /// The blobs, commitments, and proofs it references.
    pub sidecar: BlobTransactionSidecar,
}

impl SignableTransaction for TxEip4844WithSidecar {
    fn encode_for_signing(&self, out: &mut Vec<u8>) {
        self.tx.encode_for_signing(out);
    }

    fn payload_len_for_signature(&self) -> usize {
        self.tx.payload_len_for_signature()
    }

    fn into_signed(self, signature: Signature) -> Signed<Self> {
        let hash = self.tx.tx_hash(&signature);
        Signed::new_unchecked(self, signature, hash)
    }
}

impl Transaction for TxEip4844WithSidecar {
    fn chain_id(&self) -> Option<ChainId> {
        self.tx.chain_id()
    }

    fn nonce(&self) -> u64 {
        self.tx.nonce()
    }

    fn gas_limit(&self) -> u64 {
        self.tx.gas_limit()
    }

    fn kind(&self) -> TxKind {
        self.tx.kind()
    }

    fn value(&self) -> &Wei {
        self.tx.value()
    }

    fn input(&self) -> &[u8] {
        self.tx.input()
    }

    fn access_list(&self) -> Option<&AccessList> {
        self.tx.access_list()
    }

    fn blob_versioned_hashes(&self) -> Option<&[Hash]> {
        self.tx.blob_versioned_hashes()
    }

    fn authorization_list(&self) -> Option<&[SignedAuthorization]> {
        None
    }

    fn is_dynamic_fee(&self) -> bool {
        true
    }
}

/// Either form a blob transaction may take once built: the bare
/// transaction, or one already paired with its sidecar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxEip4844Variant {
    /// A blob transaction without its sidecar attached.
    TxEip4844(TxEip4844),
    /// A blob transaction together with the sidecar it broadcasts with.
    TxEip4844WithSidecar(TxEip4844WithSidecar),
}

impl TxEip4844Variant {
    /// The inner transaction, regardless of whether a sidecar is attached.
    pub fn tx(&self) -> &TxEip4844 {
        match self {
            Self::TxEip4844(tx) => tx,
            Self::TxEip4844WithSidecar(with_sidecar) => &with_sidecar.tx,
        }
    }

    /// The sidecar, if one is attached.
    pub fn sidecar(&self) -> Option<&BlobTransactionSidecar> {
        match self {
            Self::TxEip4844(_) => None,
            Self::TxEip4844WithSidecar(with_sidecar) => Some(&with_sidecar.sidecar),
        }
    }
}

impl From<TxEip4844> for TxEip4844Variant {
    fn from(tx: TxEip4844) -> Self {
        Self::TxEip4844(tx)
    }
}

impl From<TxEip4844WithSidecar> for TxEip4844Variant {
    fn from(tx: TxEip4844WithSidecar) -> Self {
        Self::TxEip4844WithSidecar(tx)
    }
}

impl SignableTransaction for TxEip4844Variant {
    fn encode_for_signing(&self, out: &mut Vec<u8>) {
        self.tx().encode_for_signing(out);
    }

    fn payload_len_for_signature(&self) -> usize {
        self.tx().payload_len_for_signature()
    }

    fn into_signed(self, signature: Signature) -> Signed<Self> {
        let hash = self.tx().tx_hash(&signature);
        Signed::new_unchecked(self, signature, hash)
    }
}

impl Transaction for TxEip4844Variant {
    fn chain_id(&self) -> Option<ChainId> {
        self.tx().chain_id()
    }

    fn nonce(&self) -> u64 {
        self.tx().nonce()
    }

    fn gas_limit(&self) -> u64 {
        self.tx().gas_limit()
    }

    fn kind(&self) -> TxKind {
        self.tx().kind()
    }

    fn value(&self) -> &Wei {
        self.tx().value()
    }

    fn input(&self) -> &[u8] {
        self.tx().input()
    }

    fn access_list(&self) -> Option<&AccessList> {
        self.tx().access_list()
    }

    fn blob_versioned_hashes(&self) -> Option<&[Hash]> {
        self.tx().blob_versioned_hashes()
    }

    fn authorization_list(&self) -> Option<&[SignedAuthorization]> {
        None
    }

    fn is_dynamic_fee(&self) -> bool {
        true
    }
}

impl Signed<TxEip4844> {
    /// Encodes the network broadcast wrapper: `0x03 ‖ rlp([[tx_fields...,
    /// sig], blobs, commitments, proofs])`. Distinct from the canonical
    /// envelope [`TxEip4844::encode_signed`] produces, which carries no
    /// sidecar.
    pub fn encode_network_wrapper(&self, sidecar: &BlobTransactionSidecar, out: &mut Vec<u8>) {
        let tx = self.tx();
        let inner_payload_length = tx.fields_len() + tx.signature_fields_len(self.signature());
        let inner_len = Header { list: true, payload_length: inner_payload_length }.length()
            + inner_payload_length;
        let payload_length = inner_len + sidecar.length();

        out.push(TxType::Eip4844 as u8);
        Header { list: true, payload_length }.encode(out);
        Header { list: true, payload_length: inner_payload_length }.encode(out);
        tx.encode_fields(out);
        tx.encode_signature_fields(self.signature(), out);
        sidecar.encode(out);
    }

    /// Decodes a network broadcast wrapper produced by
    /// [`Self::encode_network_wrapper`] (the caller has already consumed
    /// the leading `0x03` type byte).
    pub fn decode_network_wrapper(buf: &mut &[u8]) -> Result<(Self, BlobTransactionSidecar), RlpError> {
        let outer = Header::decode(buf)?;
        if !outer.list {
            return Err(RlpError::UnexpectedString);
        }
        let before = buf.len();
        let signed = TxEip4844::decode_signed_fields(buf)?;
        let sidecar = BlobTransactionSidecar::decode(buf)?;
        let consumed = before - buf.len();
        if consumed != outer.payload_length {
            return Err(RlpError::ListLengthMismatch {
                declared_end: outer.payload_length,
                actual_end: consumed,
            });
        }
        Ok((signed, sidecar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brane_eips::eip4844::{Blob, Bytes48, BYTES_PER_BLOB, BYTES_PER_COMMITMENT, BYTES_PER_PROOF};

    fn sample() -> TxEip4844 {
        TxEip4844 {
            chain_id: 1,
            nonce: 2,
            max_priority_fee_per_gas: 1_000_000_000,
            max_fee_per_gas: 50_000_000_000,
            gas_limit: 21_000,
            to: Address::ZERO,
            value: Wei::zero(),
            access_list: AccessList::empty(),
            input: Bytes::empty(),
            max_fee_per_blob_gas: 1,
            blob_versioned_hashes: vec![Hash::ZERO],
        }
    }

    #[test]
    fn new_rejects_contract_creation() {
        let err = TxEip4844::new(
            TxKind::Create,
            vec![Hash::ZERO],
            TxEip4844Fields {
                chain_id: 1,
                nonce: 0,
                max_priority_fee_per_gas: 0,
                max_fee_per_gas: 0,
                gas_limit: 21_000,
                value: Wei::zero(),
                access_list: AccessList::empty(),
                input: Bytes::empty(),
                max_fee_per_blob_gas: 1,
            },
        )
        .unwrap_err();
        assert!(matches!(err, TransactionError::Eip4844ContractCreation));
    }

    #[test]
    fn new_rejects_too_many_blobs() {
        let err = TxEip4844::new(
            TxKind::Call(Address::ZERO),
            vec![Hash::ZERO; 7],
            TxEip4844Fields {
                chain_id: 1,
                nonce: 0,
                max_priority_fee_per_gas: 0,
                max_fee_per_gas: 0,
                gas_limit: 21_000,
                value: Wei::zero(),
                access_list: AccessList::empty(),
                input: Bytes::empty(),
                max_fee_per_blob_gas: 1,
            },
        )
        .unwrap_err();
        assert!(matches!(err, TransactionError::InvalidBlobCount(7)));
    }

    #[test]
    fn signed_envelope_round_trips() {
        let tx = sample();
        let sig = Signature::from_scalars(Hash::new([3u8; 32]), Hash::new([4u8; 32]), 0).unwrap();
        let mut out = Vec::new();
        tx.encode_signed(&sig, &mut out);
        assert_eq!(out[0], 0x03);
        let mut rest = &out[1..];
        let signed = TxEip4844::decode_signed_fields(&mut rest).unwrap();
        assert_eq!(signed.tx(), &tx);
    }

    #[test]
    fn network_wrapper_round_trips_and_carries_sidecar() {
        let tx = sample();
        let sig = Signature::from_scalars(Hash::new([3u8; 32]), Hash::new([4u8; 32]), 1).unwrap();
        let signed = tx.clone().into_signed(sig);
        let sidecar = BlobTransactionSidecar::new(
            vec![Blob::new([0x11u8; BYTES_PER_BLOB])],
            vec![Bytes48::new([0x22u8; BYTES_PER_COMMITMENT])],
            vec![Bytes48::new([0x33u8; BYTES_PER_PROOF])],
        );
        let mut out = Vec::new();
        signed.encode_network_wrapper(&sidecar, &mut out);
        assert_eq!(out[0], 0x03);
        let mut rest = &out[1..];
        let (decoded_signed, decoded_sidecar) = Signed::<TxEip4844>::decode_network_wrapper(&mut rest).unwrap();
        assert_eq!(decoded_signed.tx(), &tx);
        assert_eq!(decoded_sidecar, sidecar);
    }
}
