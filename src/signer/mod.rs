//! Transaction and message signers.
//!
//! A [`Signer`] only has to provide a public key and a way to sign a hash.
//! The transaction entry points compute their hash synchronously from the
//! version tag on the details record, then await the signing step, so a
//! remote or hardware key can suspend without blocking hashing.

use async_trait::async_trait;
use tracing::debug;

use crate::calldata::Call;
use crate::error::Result;
use crate::felt::FieldElement;
use crate::signature::Signature;
use crate::snip12::TypedData;

pub mod details;
pub mod eth;
pub mod stark;
pub mod timeout;

pub use details::{
    validate_fee_settings, DeclareSignerDetails, DeployAccountSignerDetails,
    InvocationsSignerDetails,
};
pub use eth::EthSigner;
pub use stark::StarkSigner;
pub use timeout::TimeoutSigner;

#[async_trait]
pub trait Signer: Send + Sync {
    /// The public key as a `0x` hex string.
    async fn get_public_key(&self) -> Result<String>;

    /// Sign a precomputed hash. Never retried by callers in this crate.
    async fn sign_hash(&self, hash: &FieldElement) -> Result<Signature>;

    async fn sign_transaction(
        &self,
        calls: &[Call],
        details: &InvocationsSignerDetails,
    ) -> Result<Signature> {
        let hash = details.transaction_hash(calls)?;
        debug!("Signing invoke {} ({} calls)", hash, calls.len());
        self.sign_hash(&hash).await
    }

    async fn sign_declare_transaction(&self, details: &DeclareSignerDetails) -> Result<Signature> {
        let hash = details.transaction_hash()?;
        debug!("Signing declare {}", hash);
        self.sign_hash(&hash).await
    }

    async fn sign_deploy_account_transaction(
        &self,
        details: &DeployAccountSignerDetails,
    ) -> Result<Signature> {
        let hash = details.transaction_hash()?;
        debug!("Signing deploy_account {}", hash);
        self.sign_hash(&hash).await
    }

    async fn sign_message(
        &self,
        typed_data: &TypedData,
        account_address: &FieldElement,
    ) -> Result<Signature> {
        let hash = typed_data.message_hash(account_address)?;
        debug!("Signing typed data {} for {}", hash, account_address);
        self.sign_hash(&hash).await
    }
}

#[async_trait]
impl<S: Signer + ?Sized> Signer for Box<S> {
    async fn get_public_key(&self) -> Result<String> {
        (**self).get_public_key().await
    }

    async fn sign_hash(&self, hash: &FieldElement) -> Result<Signature> {
        (**self).sign_hash(hash).await
    }

    async fn sign_transaction(
        &self,
        calls: &[Call],
        details: &InvocationsSignerDetails,
    ) -> Result<Signature> {
        (**self).sign_transaction(calls, details).await
    }

    async fn sign_declare_transaction(&self, details: &DeclareSignerDetails) -> Result<Signature> {
        (**self).sign_declare_transaction(details).await
    }

    async fn sign_deploy_account_transaction(
        &self,
        details: &DeployAccountSignerDetails,
    ) -> Result<Signature> {
        (**self).sign_deploy_account_transaction(details).await
    }

    async fn sign_message(
        &self,
        typed_data: &TypedData,
        account_address: &FieldElement,
    ) -> Result<Signature> {
        (**self).sign_message(typed_data, account_address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TxError;
    use crate::felt::StarknetChainId;
    use crate::transaction::{
        DataAvailabilityMode, FeeSettings, ResourceBounds, ResourceBoundsMapping,
        TransactionVersion, V3FeeFields,
    };
    use std::sync::Mutex;

    /// Records every hash it is asked to sign.
    #[derive(Default)]
    struct RecordingSigner {
        seen: Mutex<Vec<FieldElement>>,
    }

    #[async_trait]
    impl Signer for RecordingSigner {
        async fn get_public_key(&self) -> Result<String> {
            Ok("0x1".to_string())
        }

        async fn sign_hash(&self, hash: &FieldElement) -> Result<Signature> {
            self.seen.lock().unwrap().push(*hash);
            Ok(Signature::Stark { r: *hash, s: FieldElement::ZERO })
        }
    }

    fn invoke_details(version: TransactionVersion, fee: FeeSettings) -> InvocationsSignerDetails {
        InvocationsSignerDetails {
            wallet_address: FieldElement::from(0x1234u64),
            nonce: FieldElement::from(3u64),
            chain_id: StarknetChainId::SN_SEPOLIA,
            version,
            cairo_version: Default::default(),
            fee,
        }
    }

    fn v3_fee(l1_amount: u64) -> FeeSettings {
        FeeSettings::V3(V3FeeFields {
            resource_bounds: ResourceBoundsMapping {
                l1_gas: ResourceBounds {
                    max_amount: FieldElement::from(l1_amount),
                    max_price_per_unit: FieldElement::from(100u64),
                },
                l2_gas: ResourceBounds {
                    max_amount: FieldElement::ZERO,
                    max_price_per_unit: FieldElement::ZERO,
                },
            },
            nonce_data_availability_mode: Some(DataAvailabilityMode::L1),
            fee_data_availability_mode: Some(DataAvailabilityMode::L1),
            ..V3FeeFields::default()
        })
    }

    fn calls() -> Vec<Call> {
        vec![Call::new(FieldElement::from(0x49u64), "transfer", vec![FieldElement::ONE, FieldElement::TWO]).unwrap()]
    }

    #[tokio::test]
    async fn test_sign_transaction_signs_the_invoke_hash() {
        let signer = RecordingSigner::default();
        let details = invoke_details(TransactionVersion::V1, FeeSettings::legacy(FieldElement::from(10u64)));

        let signature = signer.sign_transaction(&calls(), &details).await.unwrap();
        let expected = details.transaction_hash(&calls()).unwrap();
        assert_eq!(signature.to_felts()[0], expected);
        assert_eq!(signer.seen.lock().unwrap().as_slice(), &[expected]);
    }

    #[tokio::test]
    async fn test_version_tag_selects_layout() {
        let signer = RecordingSigner::default();
        let v1 = invoke_details(TransactionVersion::V1, FeeSettings::legacy(FieldElement::from(10u64)));
        let v3_a = invoke_details(TransactionVersion::V3, v3_fee(1));
        let v3_b = invoke_details(TransactionVersion::V3, v3_fee(2));

        let h1 = signer.sign_transaction(&calls(), &v1).await.unwrap();
        let h3a = signer.sign_transaction(&calls(), &v3_a).await.unwrap();
        let h3b = signer.sign_transaction(&calls(), &v3_b).await.unwrap();

        // resource bounds move a V3 hash, and V1 shares neither
        assert_ne!(h3a, h3b);
        assert_ne!(h1, h3a);
    }

    #[tokio::test]
    async fn test_inconsistent_details_never_reach_the_key() {
        let signer = RecordingSigner::default();
        let mismatched = invoke_details(TransactionVersion::V1, v3_fee(1));

        let result = signer.sign_transaction(&calls(), &mismatched).await;
        assert!(matches!(result, Err(TxError::InvalidDetails(_))));
        assert!(signer.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_boxed_signer_delegates() {
        let boxed: Box<dyn Signer> = Box::new(RecordingSigner::default());
        let key = tokio_test::block_on(boxed.get_public_key()).unwrap();
        assert_eq!(key, "0x1");

        let sig = tokio_test::block_on(boxed.sign_hash(&FieldElement::TWO)).unwrap();
        assert_eq!(sig.to_felts(), vec![FieldElement::TWO, FieldElement::ZERO]);
    }
}
