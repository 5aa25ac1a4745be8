use crate::signed::Signed;
use crate::transaction::{SignableTransaction, Transaction};
use crate::tx_kind::TxKind;
use crate::tx_type::TxType;
use brane_eips::eip2930::AccessList;
use brane_eips::eip7702::SignedAuthorization;
use brane_primitives::{keccak256, Bytes, ChainId, Hash, Wei};
use brane_rlp::{Decodable, Encodable, Error as RlpError, Header};
use brane_signer::Signature;

/// An [EIP-1559] transaction: gas priced with a base-fee-indexed tip and
/// cap instead of a flat `gasPrice`.
///
/// [EIP-1559]: https://eips.ethereum.org/EIPS/eip-1559
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxEip1559 {
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
    /// Call target, or `Create` for contract creation.
    pub to: TxKind,
    /// Value transferred, in wei.
    pub value: Wei,
    /// Accounts and storage slots pre-warmed for this transaction.
    pub access_list: AccessList,
    /// Call or init-code data.
    pub input: Bytes,
}

impl TxEip1559 {
    /// The gas price this transaction actually pays once `base_fee` is
    /// known: `min(maxFeePerGas, baseFee + maxPriorityFeePerGas)`.
    pub fn effective_gas_price(&self, base_fee: Option<u128>) -> u128 {
        match base_fee {
            None => self.max_fee_per_gas,
            Some(base_fee) => {
                let tip = self.max_fee_per_gas.saturating_sub(base_fee).min(self.max_priority_fee_per_gas);
                base_fee.saturating_add(tip)
            }
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
    }

    fn decode_fields(buf: &mut &[u8]) -> Result<Self, RlpError> {
        Ok(Self {
            chain_id: ChainId::decode(buf)?,
            nonce: u64::decode(buf)?,
            max_priority_fee_per_gas: u128::decode(buf)?,
            max_fee_per_gas: u128::decode(buf)?,
            gas_limit: u64::decode(buf)?,
            to: TxKind::decode(buf)?,
            value: Wei::decode(buf)?,
            input: Bytes::decode(buf)?,
            access_list: AccessList::decode(buf)?,
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

    /// Encodes the full typed envelope: `0x02 ‖ rlp([fields..., yParity, r, s])`.
    pub fn encode_signed(&self, signature: &Signature, out: &mut Vec<u8>) {
        out.push(TxType::Eip1559 as u8);
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

    /// Decodes the RLP list body of a signed envelope (the caller has
    /// already consumed the leading `0x02` type byte).
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

fn y_parity(signature: &Signature) -> u8 {
    signature.recid().to_byte()
}

impl SignableTransaction for TxEip1559 {
    fn encode_for_signing(&self, out: &mut Vec<u8>) {
        out.push(TxType::Eip1559 as u8);
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

impl Transaction for TxEip1559 {
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
        self.to
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
        None
    }

    fn authorization_list(&self) -> Option<&[SignedAuthorization]> {
        None
    }

    fn is_dynamic_fee(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TxEip1559 {
        TxEip1559 {
            chain_id: 1,
            nonce: 2,
            max_priority_fee_per_gas: 1_000_000_000,
            max_fee_per_gas: 50_000_000_000,
            gas_limit: 21_000,
            to: TxKind::Call(brane_primitives::Address::ZERO),
            value: Wei::zero(),
            access_list: AccessList::empty(),
            input: Bytes::empty(),
        }
    }

    #[test]
    fn effective_gas_price_is_capped_by_max_fee() {
        let tx = sample();
        assert_eq!(tx.effective_gas_price(Some(60_000_000_000)), 50_000_000_000);
    }

    #[test]
    fn effective_gas_price_adds_tip_to_base_fee() {
        let tx = sample();
        assert_eq!(tx.effective_gas_price(Some(10_000_000_000)), 11_000_000_000);
    }

    #[test]
    fn signed_envelope_round_trips() {
        let tx = sample();
        let sig = Signature::from_scalars(Hash::new([3u8; 32]), Hash::new([4u8; 32]), 0).unwrap();
        let mut out = Vec::new();
        tx.encode_signed(&sig, &mut out);
        assert_eq!(out[0], 0x02);
        let mut rest = &out[1..];
        let signed = TxEip1559::decode_signed_fields(&mut rest).unwrap();
        assert_eq!(signed.tx(), &tx);
    }
}
