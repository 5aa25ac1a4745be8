use crate::signed::Signed;
use crate::transaction::{SignableTransaction, Transaction};
use crate::tx_kind::TxKind;
use brane_eips::eip2930::AccessList;
use brane_eips::eip7702::SignedAuthorization;
use brane_primitives::{keccak256, Bytes, ChainId, Hash, Wei};
use brane_rlp::{Decodable, Encodable, Error as RlpError, Header};
use brane_signer::{normalize_v, to_eip155_v, Signature};

/// A pre-[EIP-2718] transaction: no leading type byte, no access list.
///
/// [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxLegacy {
    /// Replay-protection chain id. `None` for transactions signed before
    /// [EIP-155](https://eips.ethereum.org/EIPS/eip-155).
    pub chain_id: Option<ChainId>,
    /// The sender's transaction count at submission time.
    pub nonce: u64,
    /// Price paid per unit of gas, in wei.
    pub gas_price: u128,
    /// Maximum gas the transaction may consume.
    pub gas_limit: u64,
    /// Call target, or `Create` for contract creation.
    pub to: TxKind,
    /// Value transferred, in wei.
    pub value: Wei,
    /// Call or init-code data.
    pub input: Bytes,
}

impl TxLegacy {
    fn fields_len(&self) -> usize {
        self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + self.to.length()
            + self.value.length()
            + self.input.length()
    }

    fn encode_fields(&self, out: &mut Vec<u8>) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
    }

    /// The three extra fields [EIP-155] appends to the signing preimage:
    /// `chainId, 0, 0`.
    ///
    /// [EIP-155]: https://eips.ethereum.org/EIPS/eip-155
    fn eip155_fields_len(&self) -> usize {
        match self.chain_id {
            Some(chain_id) => chain_id.length() + 1 + 1,
            None => 0,
        }
    }

    fn encode_eip155_fields(&self, out: &mut Vec<u8>) {
        if let Some(chain_id) = self.chain_id {
            chain_id.encode(out);
            0u8.encode(out);
            0u8.encode(out);
        }
    }

    fn decode_fields(buf: &mut &[u8]) -> Result<Self, RlpError> {
        Ok(Self {
            chain_id: None,
            nonce: u64::decode(buf)?,
            gas_price: u128::decode(buf)?,
            gas_limit: u64::decode(buf)?,
            to: TxKind::decode(buf)?,
            value: Wei::decode(buf)?,
            input: Bytes::decode(buf)?,
        })
    }

    /// Encodes the full signed envelope (a legacy transaction is its own
    /// envelope; there is no leading type byte).
    pub fn encode_signed(&self, signature: &Signature, out: &mut Vec<u8>) {
        let payload_length = self.fields_len() + self.signature_fields_len(signature);
        Header { list: true, payload_length }.encode(out);
        self.encode_fields(out);
        self.encode_signature_fields(signature, out);
    }

    /// The byte length [`Self::encode_signed`] would write, including the
    /// list header.
    pub fn encoded_len_with_signature(&self, signature: &Signature) -> usize {
        let payload_length = self.fields_len() + self.signature_fields_len(signature);
        Header { list: true, payload_length }.length() + payload_length
    }

    fn signature_fields_len(&self, signature: &Signature) -> usize {
        let v = self.signed_v(signature);
        v.length() + signature.r().length() + signature.s().length()
    }

    fn encode_signature_fields(&self, signature: &Signature, out: &mut Vec<u8>) {
        self.signed_v(signature).encode(out);
        signature.r().encode(out);
        signature.s().encode(out);
    }

    /// The `v` value a signed legacy transaction carries: raw Electrum
    /// form if there is no chain id, EIP-155-encoded otherwise.
    fn signed_v(&self, signature: &Signature) -> u64 {
        match self.chain_id {
            Some(chain_id) => to_eip155_v(signature.recid().to_byte(), chain_id),
            None => signature.v() as u64,
        }
    }

    /// Decodes a complete signed envelope, recovering `chain_id` from the
    /// signature's `v` per [EIP-155] when present.
    ///
    /// [EIP-155]: https://eips.ethereum.org/EIPS/eip-155
    pub fn decode_signed(buf: &mut &[u8]) -> Result<Signed<Self>, RlpError> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(RlpError::UnexpectedString);
        }
        let before = buf.len();
        let mut tx = Self::decode_fields(buf)?;
        let v = u64::decode(buf)?;
        let r = Hash::decode(buf)?;
        let s = Hash::decode(buf)?;
        let consumed = before - buf.len();
        if consumed != header.payload_length {
            return Err(RlpError::ListLengthMismatch {
                declared_end: header.payload_length,
                actual_end: consumed,
            });
        }
        tx.chain_id = extract_chain_id(v);
        let signature = Signature::from_scalars(r, s, v)
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

/// Recovers the [EIP-155] chain id embedded in a legacy `v`, or `None` for
/// the pre-155 raw `27`/`28` form.
///
/// [EIP-155]: https://eips.ethereum.org/EIPS/eip-155
fn extract_chain_id(v: u64) -> Option<ChainId> {
    match v {
        27 | 28 => None,
        v if v >= 35 => Some((v - 35) / 2),
        _ => None,
    }
}

impl SignableTransaction for TxLegacy {
    fn encode_for_signing(&self, out: &mut Vec<u8>) {
        let payload_length = self.fields_len() + self.eip155_fields_len();
        Header { list: true, payload_length }.encode(out);
        self.encode_fields(out);
        self.encode_eip155_fields(out);
    }

    fn payload_len_for_signature(&self) -> usize {
        let payload_length = self.fields_len() + self.eip155_fields_len();
        Header { list: true, payload_length }.length() + payload_length
    }

    fn into_signed(self, signature: Signature) -> Signed<Self> {
        let hash = self.tx_hash(&signature);
        Signed::new_unchecked(self, signature, hash)
    }
}

impl Transaction for TxLegacy {
    fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
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
        None
    }

    fn blob_versioned_hashes(&self) -> Option<&[Hash]> {
        None
    }

    fn authorization_list(&self) -> Option<&[SignedAuthorization]> {
        None
    }

    fn is_dynamic_fee(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TxLegacy {
        TxLegacy {
            chain_id: Some(1),
            nonce: 9,
            gas_price: 20_000_000_000,
            gas_limit: 21_000,
            to: TxKind::Call("0x3535353535353535353535353535353535353535".parse().unwrap()),
            value: Wei::from_u64(1_000_000_000_000_000_000),
            input: Bytes::empty(),
        }
    }

    #[test]
    fn eip155_signing_preimage_matches_known_vector() {
        // From the EIP-155 spec itself.
        let tx = sample();
        let mut buf = Vec::new();
        tx.encode_for_signing(&mut buf);
        assert_eq!(
            hex::encode(&buf),
            "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080"
        );
    }

    #[test]
    fn pre_155_v_round_trips_without_chain_id() {
        let mut tx = sample();
        tx.chain_id = None;
        let sig = Signature::from_scalars(Hash::new([1u8; 32]), Hash::new([2u8; 32]), 27).unwrap();
        let mut out = Vec::new();
        tx.encode_signed(&sig, &mut out);
        let signed = TxLegacy::decode_signed(&mut &out[..]).unwrap();
        assert_eq!(signed.tx().chain_id, None);
        assert_eq!(signed.signature(), &sig);
    }

    #[test]
    fn eip155_v_round_trips_chain_id() {
        let tx = sample();
        let sig = Signature::from_scalars(Hash::new([1u8; 32]), Hash::new([2u8; 32]), 27).unwrap();
        let mut out = Vec::new();
        tx.encode_signed(&sig, &mut out);
        let signed = TxLegacy::decode_signed(&mut &out[..]).unwrap();
        assert_eq!(signed.tx().chain_id, Some(1));
        assert_eq!(normalize_v(signed.signature().v() as u64), sig.recid());
    }
}
