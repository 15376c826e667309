use std::fmt;

use async_trait::async_trait;

use super::Signer;
use crate::curve::StarkCurve;
use crate::error::{Result, TxError};
use crate::felt::FieldElement;
use crate::signature::Signature;

/// Signs with a private key on the chain's own curve.
#[derive(Clone)]
pub struct StarkSigner {
    private_key: FieldElement,
    public_key: FieldElement,
}

impl StarkSigner {
    pub fn new(private_key: FieldElement) -> Result<Self> {
        let public_key = StarkCurve.derive_public_key(&private_key)?;
        Ok(StarkSigner {
            private_key,
            public_key,
        })
    }

    pub fn from_hex(private_key: &str) -> Result<Self> {
        let key = FieldElement::from_hex(private_key)
            .map_err(|_| TxError::InvalidKey("private key is not valid hex".to_string()))?;
        Self::new(key)
    }

    pub fn public_key(&self) -> FieldElement {
        self.public_key
    }
}

impl fmt::Debug for StarkSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StarkSigner")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Signer for StarkSigner {
    async fn get_public_key(&self) -> Result<String> {
        Ok(self.public_key.to_hex())
    }

    async fn sign_hash(&self, hash: &FieldElement) -> Result<Signature> {
        let signature = StarkCurve.sign(hash, &self.private_key)?;
        Ok(signature.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::StarkSignature;
    use crate::snip12::{StarknetDomain, TypedData, TypedDataField};
    use serde_json::json;
    use std::collections::BTreeMap;

    const KEY: &str = "0x4a724706e80e5ea88b9ee60a7ede83cbc2de27da0659bc4fa7ea5ff5d2e30b7";

    fn verify(signer: &StarkSigner, hash: &FieldElement, signature: &Signature) -> bool {
        let Signature::Stark { r, s } = signature else {
            return false;
        };
        StarkCurve.verify(hash, &StarkSignature { r: *r, s: *s }, &signer.public_key())
    }

    #[tokio::test]
    async fn test_sign_hash_verifies() {
        let signer = StarkSigner::from_hex(KEY).unwrap();
        let hash = FieldElement::from_hex("0x6fea80189363a1ad6b9b6e9e4b0a11f1b5d7c9e6f5ba7f3a1e36e4ea1f3cf").unwrap();

        let signature = signer.sign_hash(&hash).await.unwrap();
        assert_eq!(signature.to_felts().len(), 2);
        assert!(verify(&signer, &hash, &signature));
        assert!(!verify(&signer, &(hash + FieldElement::ONE), &signature));
    }

    #[tokio::test]
    async fn test_public_key_matches_reference() {
        let signer = StarkSigner::from_hex(KEY).unwrap();
        let expected = starknet_crypto::get_public_key(FieldElement::from_hex(KEY).unwrap().as_felt());
        assert_eq!(signer.get_public_key().await.unwrap(), FieldElement::from(expected).to_hex());
    }

    #[tokio::test]
    async fn test_sign_message_signs_typed_data_hash() {
        let signer = StarkSigner::from_hex(KEY).unwrap();
        let domain = StarknetDomain::active("Dapp", "1", "SN_SEPOLIA");
        let types = BTreeMap::from([(
            "Greeting".to_string(),
            vec![TypedDataField::new("text", "shortstring")],
        )]);
        let message = json!({"text": "gm"}).as_object().cloned().unwrap();
        let typed_data = TypedData::new(&domain, types, "Greeting", message);
        let account = FieldElement::from(0x777u64);

        let signature = signer.sign_message(&typed_data, &account).await.unwrap();
        let hash = typed_data.message_hash(&account).unwrap();
        assert!(verify(&signer, &hash, &signature));
    }

    #[test]
    fn test_rejects_zero_key_and_redacts_debug() {
        assert!(matches!(StarkSigner::from_hex("0x0"), Err(TxError::InvalidKey(_))));
        assert!(StarkSigner::from_hex("not hex").is_err());

        let signer = StarkSigner::from_hex(KEY).unwrap();
        let debug = format!("{:?}", signer);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("4a724706e80e5ea88b9ee60a7ede83cbc2de27da0659bc4fa7ea5ff5d2e30b7"));
    }
}
