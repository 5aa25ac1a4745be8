use brane_primitives::{keccak256, Address, ChainId, Hash};
use brane_rlp::{Decodable, Encodable, Error as RlpError, Header};
use brane_signer::Signature;

use super::constants::MAGIC;

/// An unsigned EIP-7702 authorization tuple: a delegation from `address`'s
/// code to the authority that signs it, valid on `chain_id` (or any chain
/// if `chain_id` is zero) starting at `nonce`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authorization {
    /// Chain this authorization is valid on; `0` means any chain.
    pub chain_id: ChainId,
    /// The address whose code the authority delegates to.
    pub address: Address,
    /// The authority's nonce at the time of signing.
    pub nonce: u64,
}

impl Authorization {
    /// The `keccak256(MAGIC || rlp([chain_id, address, nonce]))` preimage
    /// an authority signs to produce a [`SignedAuthorization`].
    pub fn signature_hash(&self) -> Hash {
        let mut buf = vec![MAGIC];
        self.encode(&mut buf);
        Hash::new(keccak256(&buf))
    }

    /// Attaches a signature produced over [`Self::signature_hash`].
    pub fn into_signed(self, signature: Signature) -> SignedAuthorization {
        SignedAuthorization {
            inner: self,
            signature,
        }
    }
}

impl Encodable for Authorization {
    fn encode(&self, out: &mut Vec<u8>) {
        let payload_length =
            self.chain_id.length() + self.address.length() + self.nonce.length();
        Header {
            list: true,
            payload_length,
        }
        .encode(out);
        self.chain_id.encode(out);
        self.address.encode(out);
        self.nonce.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length =
            self.chain_id.length() + self.address.length() + self.nonce.length();
        Header {
            list: true,
            payload_length,
        }
        .length()
            + payload_length
    }
}

impl Decodable for Authorization {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(RlpError::UnexpectedString);
        }
        let before = buf.len();
        let item = Self {
            chain_id: ChainId::decode(buf)?,
            address: Address::decode(buf)?,
            nonce: u64::decode(buf)?,
        };
        let consumed = before - buf.len();
        if consumed != header.payload_length {
            return Err(RlpError::ListLengthMismatch {
                declared_end: header.payload_length,
                actual_end: consumed,
            });
        }
        Ok(item)
    }
}

/// A signed EIP-7702 authorization, as carried in a transaction's
/// authorization list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedAuthorization {
    inner: Authorization,
    signature: Signature,
}

impl SignedAuthorization {
    /// The chain id this authorization is scoped to (`0` for any chain).
    pub fn chain_id(&self) -> ChainId {
        self.inner.chain_id
    }

    /// The address whose code is being delegated to.
    pub fn address(&self) -> &Address {
        &self.inner.address
    }

    /// The authority's nonce at the time of signing.
    pub fn nonce(&self) -> u64 {
        self.inner.nonce
    }

    /// The attached signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Recovers the authority address from the signature and the
    /// unsigned tuple's hash. Callers must additionally check that the
    /// recovered authority has no code and that its nonce matches
    /// [`Self::nonce`].
    pub fn recover_authority(&self) -> Result<Address, k256::ecdsa::Error> {
        self.signature
            .recover_address_from_prehash(&self.inner.signature_hash())
    }
}

impl Encodable for SignedAuthorization {
    fn encode(&self, out: &mut Vec<u8>) {
        let payload_length = self.inner.chain_id.length()
            + self.inner.address.length()
            + self.inner.nonce.length()
            + y_parity(&self.signature).length()
            + self.signature.r().length()
            + self.signature.s().length();
        Header {
            list: true,
            payload_length,
        }
        .encode(out);
        self.inner.chain_id.encode(out);
        self.inner.address.encode(out);
        self.inner.nonce.encode(out);
        y_parity(&self.signature).encode(out);
        self.signature.r().encode(out);
        self.signature.s().encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.inner.chain_id.length()
            + self.inner.address.length()
            + self.inner.nonce.length()
            + y_parity(&self.signature).length()
            + self.signature.r().length()
            + self.signature.s().length();
        Header {
            list: true,
            payload_length,
        }
        .length()
            + payload_length
    }
}

impl Decodable for SignedAuthorization {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(RlpError::UnexpectedString);
        }
        let before = buf.len();
        let chain_id = ChainId::decode(buf)?;
        let address = Address::decode(buf)?;
        let nonce = u64::decode(buf)?;
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
        Ok(Self {
            inner: Authorization {
                chain_id,
                address,
                nonce,
            },
            signature,
        })
    }
}

/// The EIP-7702 wire form stores `yParity` (`0`/`1`), not the Electrum
/// `v`; [`Signature::v`] always returns Electrum form, so the bare
/// recovery id is read back out here instead.
fn y_parity(signature: &Signature) -> u8 {
    signature.recid().to_byte()
}

/// A transaction's authorization list: one tuple per account delegating
/// its code.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationList(pub Vec<SignedAuthorization>);

impl Encodable for AuthorizationList {
    fn encode(&self, out: &mut Vec<u8>) {
        self.0.encode(out);
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for AuthorizationList {
    fn decode(buf: &mut &[u8]) -> Result<Self, RlpError> {
        Ok(Self(Vec::decode(buf)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brane_signer::Signer;
    use brane_signer_local::PrivateKeySigner;

    fn signer() -> PrivateKeySigner {
        PrivateKeySigner::random()
    }

    #[tokio::test]
    async fn signed_authorization_recovers_signer_address() {
        let signer = signer();
        let auth = Authorization {
            chain_id: 1,
            address: Address::ZERO,
            nonce: 0,
        };
        let signature = signer.sign_hash(auth.signature_hash()).await.unwrap();
        let signed = auth.into_signed(signature);
        assert_eq!(signed.recover_authority().unwrap(), signer.address());
    }

    #[test]
    fn authorization_round_trips_through_rlp() {
        let auth = Authorization {
            chain_id: 5,
            address: Address::ZERO,
            nonce: 7,
        };
        let bytes = brane_rlp::encode(&auth);
        let decoded: Authorization = brane_rlp::decode(&bytes).unwrap();
        assert_eq!(auth, decoded);
    }

    #[tokio::test]
    async fn signed_authorization_round_trips_through_rlp() {
        let signer = signer();
        let auth = Authorization {
            chain_id: 1,
            address: Address::ZERO,
            nonce: 3,
        };
        let signature = signer.sign_hash(auth.signature_hash()).await.unwrap();
        let signed = auth.into_signed(signature);

        let bytes = brane_rlp::encode(&signed);
        let decoded: SignedAuthorization = brane_rlp::decode(&bytes).unwrap();
        assert_eq!(signed, decoded);
    }
}
