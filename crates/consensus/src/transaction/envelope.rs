use crate::signed::Signed;
use crate::transaction::{SignableTransaction, Transaction};
use crate::tx_kind::TxKind;
use crate::tx_type::TxType;
use crate::{TxEip1559, TxEip2930, TxEip4844, TxEip4844Variant, TxEip7702, TxLegacy};
use brane_eips::eip2930::AccessList;
use brane_eips::eip7702::SignedAuthorization;
use brane_primitives::{Address, ChainId, Hash, Wei};
use brane_rlp::{Decodable, Encodable, Error as RlpError};
use brane_signer::Signature;

/// The signed, type-tagged envelope of any Ethereum transaction variant.
///
/// [EIP-2718] gives every typed transaction a leading type byte on the
/// wire; a legacy transaction has none, which is how a decoder tells the
/// two apart (a legacy transaction's first RLP byte is always `>= 0xc0`,
/// a list header, while a type byte is always `< 0x80`).
///
/// [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxEnvelope {
    /// A pre-EIP-2718 transaction.
    Legacy(Signed<TxLegacy>),
    /// An EIP-2930 access-list transaction.
    Eip2930(Signed<TxEip2930>),
    /// An EIP-1559 dynamic-fee transaction.
    Eip1559(Signed<TxEip1559>),
    /// An EIP-4844 blob transaction.
    Eip4844(Signed<TxEip4844Variant>),
    /// An EIP-7702 set-code transaction.
    Eip7702(Signed<TxEip7702>),
}

impl TxEnvelope {
    /// The [EIP-2718] type byte this envelope carries.
    ///
    /// [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718
    pub fn tx_type(&self) -> TxType {
        match self {
            Self::Legacy(_) => TxType::Legacy,
            Self::Eip2930(_) => TxType::Eip2930,
            Self::Eip1559(_) => TxType::Eip1559,
            Self::Eip4844(_) => TxType::Eip4844,
            Self::Eip7702(_) => TxType::Eip7702,
        }
    }

    /// The envelope hash: `keccak256` of the full signed encoding.
    pub fn tx_hash(&self) -> &Hash {
        match self {
            Self::Legacy(signed) => signed.hash(),
            Self::Eip2930(signed) => signed.hash(),
            Self::Eip1559(signed) => signed.hash(),
            Self::Eip4844(signed) => signed.hash(),
            Self::Eip7702(signed) => signed.hash(),
        }
    }

    /// The signature over this transaction.
    pub fn signature(&self) -> &Signature {
        match self {
            Self::Legacy(signed) => signed.signature(),
            Self::Eip2930(signed) => signed.signature(),
            Self::Eip1559(signed) => signed.signature(),
            Self::Eip4844(signed) => signed.signature(),
            Self::Eip7702(signed) => signed.signature(),
        }
    }

    /// The hash that was signed to produce [`Self::signature`].
    pub fn signature_hash(&self) -> Hash {
        match self {
            Self::Legacy(signed) => signed.signature_hash(),
            Self::Eip2930(signed) => signed.signature_hash(),
            Self::Eip1559(signed) => signed.signature_hash(),
            Self::Eip4844(signed) => signed.signature_hash(),
            Self::Eip7702(signed) => signed.signature_hash(),
        }
    }

    /// Recovers the sender's address from the signature and signing hash.
    pub fn recover_signer(&self) -> Result<Address, k256::ecdsa::Error> {
        match self {
            Self::Legacy(signed) => signed.recover_signer(),
            Self::Eip2930(signed) => signed.recover_signer(),
            Self::Eip1559(signed) => signed.recover_signer(),
            Self::Eip4844(signed) => signed.recover_signer(),
            Self::Eip7702(signed) => signed.recover_signer(),
        }
    }

    /// Encodes the full [EIP-2718] envelope (type byte, if any, followed
    /// by the RLP-encoded signed fields).
    ///
    /// [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718
    pub fn encode_envelope(&self, out: &mut Vec<u8>) {
        match self {
            Self::Legacy(signed) => signed.tx().encode_signed(signed.signature(), out),
            Self::Eip2930(signed) => signed.tx().encode_signed(signed.signature(), out),
            Self::Eip1559(signed) => signed.tx().encode_signed(signed.signature(), out),
            Self::Eip4844(signed) => match signed.tx() {
                TxEip4844Variant::TxEip4844(tx) => tx.encode_signed(signed.signature(), out),
                TxEip4844Variant::TxEip4844WithSidecar(with_sidecar) => {
                    with_sidecar.tx.encode_signed(signed.signature(), out)
                }
            },
            Self::Eip7702(signed) => signed.tx().encode_signed(signed.signature(), out),
        }
    }

    /// Decodes a full [EIP-2718] envelope, dispatching on the leading
    /// byte.
    ///
    /// [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718
    pub fn decode_envelope(buf: &mut &[u8]) -> Result<Self, RlpError> {
        let first = *buf.first().ok_or(RlpError::InvalidEncoding)?;
        if first >= 0xc0 {
            return Ok(Self::Legacy(TxLegacy::decode_signed(buf)?));
        }
        let ty = TxType::try_from(first).map_err(|_| RlpError::InvalidEncoding)?;
        *buf = &buf[1..];
        Ok(match ty {
            TxType::Legacy => return Err(RlpError::InvalidEncoding),
            TxType::Eip2930 => Self::Eip2930(TxEip2930::decode_signed_fields(buf)?),
            TxType::Eip1559 => Self::Eip1559(TxEip1559::decode_signed_fields(buf)?),
            TxType::Eip4844 => {
                let signed = TxEip4844::decode_signed_fields(buf)?;
                let (tx, signature, hash) = signed.into_parts();
                Self::Eip4844(Signed::new_unchecked(TxEip4844Variant::TxEip4844(tx), signature, hash))
            }
            TxType::Eip7702 => Self::Eip7702(TxEip7702::decode_signed_fields(buf)?),
        })
    }
}

impl From<Signed<TxLegacy>> for TxEnvelope {
    fn from(signed: Signed<TxLegacy>) -> Self {
        Self::Legacy(signed)
    }
}

impl From<Signed<TxEip2930>> for TxEnvelope {
    fn from(signed: Signed<TxEip2930>) -> Self {
        Self::Eip2930(signed)
    }
}

impl From<Signed<TxEip1559>> for TxEnvelope {
    fn from(signed: Signed<TxEip1559>) -> Self {
        Self::Eip1559(signed)
    }
}

impl From<Signed<TxEip4844Variant>> for TxEnvelope {
    fn from(signed: Signed<TxEip4844Variant>) -> Self {
        Self::Eip4844(signed)
    }
}

impl From<Signed<TxEip7702>> for TxEnvelope {
    fn from(signed: Signed<TxEip7702>) -> Self {
        Self::Eip7702(signed)
    }
}

impl Transaction for TxEnvelope {
    fn chain_id(&self) -> Option<ChainId> {
        match self {
            Self::Legacy(signed) => signed.tx().chain_id(),
            Self::Eip2930(signed) => signed.tx().chain_id(),
            Self::Eip1559(signed) => signed.tx().chain_id(),
            Self::Eip4844(signed) => signed.tx().chain_id(),
            Self::Eip7702(signed) => signed.tx().chain_id(),
        }
    }

    fn nonce(&self) -> u64 {
        match self {
            Self::Legacy(signed) => signed.tx().nonce(),
            Self::Eip2930(signed) => signed.tx().nonce(),
            Self::Eip1559(signed) => signed.tx().nonce(),
            Self::Eip4844(signed) => signed.tx().nonce(),
            Self::Eip7702(signed) => signed.tx().nonce(),
        }
    }

    fn gas_limit(&self) -> u64 {
        match self {
            Self::Legacy(signed) => signed.tx().gas_limit(),
            Self::Eip2930(signed) => signed.tx().gas_limit(),
            Self::Eip1559(signed) => signed.tx().gas_limit(),
            Self::Eip4844(signed) => signed.tx().gas_limit(),
            Self::Eip7702(signed) => signed.tx().gas_limit(),
        }
    }

    fn kind(&self) -> TxKind {
        match self {
            Self::Legacy(signed) => signed.tx().kind(),
            Self::Eip2930(signed) => signed.tx().kind(),
            Self::Eip1559(signed) => signed.tx().kind(),
            Self::Eip4844(signed) => signed.tx().kind(),
            Self::Eip7702(signed) => signed.tx().kind(),
        }
    }

    fn value(&self) -> &Wei {
        match self {
            Self::Legacy(signed) => signed.tx().value(),
            Self::Eip2930(signed) => signed.tx().value(),
            Self::Eip1559(signed) => signed.tx().value(),
            Self::Eip4844(signed) => signed.tx().value(),
            Self::Eip7702(signed) => signed.tx().value(),
        }
    }

    fn input(&self) -> &[u8] {
        match self {
            Self::Legacy(signed) => signed.tx().input(),
            Self::Eip2930(signed) => signed.tx().input(),
            Self::Eip1559(signed) => signed.tx().input(),
            Self::Eip4844(signed) => signed.tx().input(),
            Self::Eip7702(signed) => signed.tx().input(),
        }
    }

    fn access_list(&self) -> Option<&AccessList> {
        match self {
            Self::Legacy(signed) => signed.tx().access_list(),
            Self::Eip2930(signed) => signed.tx().access_list(),
            Self::Eip1559(signed) => signed.tx().access_list(),
            Self::Eip4844(signed) => signed.tx().access_list(),
            Self::Eip7702(signed) => signed.tx().access_list(),
        }
    }

    fn blob_versioned_hashes(&self) -> Option<&[Hash]> {
        match self {
            Self::Eip4844(signed) => signed.tx().blob_versioned_hashes(),
            _ => None,
        }
    }

    fn authorization_list(&self) -> Option<&[SignedAuthorization]> {
        match self {
            Self::Eip7702(signed) => signed.tx().authorization_list(),
            _ => None,
        }
    }

    fn is_dynamic_fee(&self) -> bool {
        match self {
            Self::Legacy(_) | Self::Eip2930(_) => false,
            Self::Eip1559(_) | Self::Eip4844(_) | Self::Eip7702(_) => true,
        }
    }
}

impl Encodable for TxEnvelope {
    fn encode(&self, out: &mut Vec<u8>) {
        self.encode_envelope(out);
    }

    fn length(&self) -> usize {
        match self {
            Self::Legacy(signed) => signed.tx().encoded_len_with_signature(signed.signature()),
            Self::Eip2930(signed) => signed.tx().encoded_len_with_signature(signed.signature()),
            Self::Eip1559(signed) => signed.tx().encoded_len_with_signature(signed.signature()),
            Self::Eip4844(signed) => match signed.tx() {
                TxEip4844Variant::TxEip4844(tx) => tx.encoded_len_with_signature(signed.signature()),
                TxEip4844Variant::TxEip4844WithSidecar(with_sidecar) => {
                    with_sidecar.tx.encoded_len_with_signature(signed.signature())
                }
            },
            Self::Eip7702(signed) => signed.tx().encoded_len_with_signature(signed.signature()),
        }
    }
}

impl Decodable for TxEnvelope {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        Self::decode_envelope(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brane_primitives::keccak256;

    fn legacy_envelope() -> TxEnvelope {
        let tx = TxLegacy {
            chain_id: Some(1),
            nonce: 0,
            gas_price: 1,
            gas_limit: 21_000,
            to: TxKind::Call(Address::ZERO),
            value: Wei::zero(),
            input: brane_primitives::Bytes::empty(),
        };
        let sig = Signature::from_scalars(Hash::new([1u8; 32]), Hash::new([2u8; 32]), 27).unwrap();
        TxEnvelope::Legacy(tx.into_signed(sig))
    }

    #[test]
    fn legacy_envelope_has_no_type_byte_prefix() {
        let envelope = legacy_envelope();
        let mut out = Vec::new();
        envelope.encode_envelope(&mut out);
        assert!(out[0] >= 0xc0);
        assert_eq!(envelope.tx_type(), TxType::Legacy);
    }

    #[test]
    fn envelope_round_trips_through_decode() {
        let envelope = legacy_envelope();
        let mut out = Vec::new();
        envelope.encode_envelope(&mut out);
        let decoded = TxEnvelope::decode_envelope(&mut &out[..]).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn eip2930_envelope_round_trips_through_decode() {
        let tx = TxEip2930 {
            chain_id: 1,
            nonce: 0,
            gas_price: 1,
            gas_limit: 21_000,
            to: TxKind::Call(Address::ZERO),
            value: Wei::zero(),
            access_list: AccessList::empty(),
            input: brane_primitives::Bytes::empty(),
        };
        let sig = Signature::from_scalars(Hash::new([1u8; 32]), Hash::new([2u8; 32]), 0).unwrap();
        let envelope: TxEnvelope = tx.into_signed(sig).into();
        let mut out = Vec::new();
        envelope.encode_envelope(&mut out);
        assert_eq!(out[0], 0x01);
        let decoded = TxEnvelope::decode_envelope(&mut &out[..]).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn tx_hash_is_keccak_of_envelope_encoding() {
        let envelope = legacy_envelope();
        let mut out = Vec::new();
        envelope.encode_envelope(&mut out);
        assert_eq!(envelope.tx_hash().as_bytes(), &keccak256(&out));
    }
}
