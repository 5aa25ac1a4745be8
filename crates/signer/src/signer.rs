use crate::{
    signature::eip191_hash_message, Error, Result, Signature, UnsupportedSignerOperation,
};
use async_trait::async_trait;
use auto_impl::auto_impl;
use brane_primitives::{Address, ChainId, Hash};

/// Asynchronous Ethereum signer.
///
/// Implementations need only provide [`sign_hash`](Signer::sign_hash);
/// [`sign_message`](Signer::sign_message) is derived from it. A signer
/// unable to expose raw hash signing (a remote HSM gating on a
/// higher-level operation, say) should return
/// [`Error::UnsupportedOperation`] and implement the higher-level methods
/// directly instead.
///
/// A signer carries an optional [`ChainId`] used for
/// [EIP-155](https://eips.ethereum.org/EIPS/eip-155) replay protection:
/// when set, `brane-consensus`'s transaction signing helpers apply it to
/// the resulting signature.
#[async_trait]
#[auto_impl(&mut, Box)]
pub trait Signer: Send + Sync {
    /// Signs the given 32-byte hash directly.
    async fn sign_hash(&self, hash: Hash) -> Result<Signature>;

    /// Signs `message` after prefixing and hashing it per
    /// [EIP-191](https://eips.ethereum.org/EIPS/eip-191).
    async fn sign_message(&self, message: &[u8]) -> Result<Signature> {
        self.sign_hash(eip191_hash_message(message)).await
    }

    /// The signer's address.
    fn address(&self) -> Address;

    /// The signer's configured chain id, if any.
    fn chain_id(&self) -> Option<ChainId>;

    /// Sets the signer's chain id.
    fn set_chain_id(&mut self, chain_id: Option<ChainId>);

    /// Sets the chain id and returns `self`, for fluent construction.
    #[auto_impl(keep_default_for(&mut, Box))]
    fn with_chain_id(mut self, chain_id: Option<ChainId>) -> Self
    where
        Self: Sized,
    {
        self.set_chain_id(chain_id);
        self
    }
}

/// A [`Signer`] that cannot sign anything; used to exercise the
/// default-method fallbacks in tests, and as a placeholder before a real
/// signer is wired up.
#[derive(Debug, Default)]
pub struct UnimplementedSigner {
    chain_id: Option<ChainId>,
}

#[async_trait]
impl Signer for UnimplementedSigner {
    async fn sign_hash(&self, _hash: Hash) -> Result<Signature> {
        Err(Error::UnsupportedOperation(UnsupportedSignerOperation::SignHash))
    }

    fn address(&self) -> Address {
        Address::ZERO
    }

    fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    fn set_chain_id(&mut self, chain_id: Option<ChainId>) {
        self.chain_id = chain_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct _ObjectSafe(Box<dyn Signer>);

    #[tokio::test]
    async fn unimplemented_signer_reports_unsupported() {
        let signer = UnimplementedSigner::default();
        assert_matches!(
            signer.sign_hash(Hash::ZERO).await,
            Err(Error::UnsupportedOperation(UnsupportedSignerOperation::SignHash))
        );
        assert_matches!(
            signer.sign_message(b"hello").await,
            Err(Error::UnsupportedOperation(UnsupportedSignerOperation::SignHash))
        );
    }

    #[test]
    fn with_chain_id_is_fluent() {
        let signer = UnimplementedSigner::default().with_chain_id(Some(1));
        assert_eq!(signer.chain_id(), Some(1));
    }
}
