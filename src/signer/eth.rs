use std::fmt;

use async_trait::async_trait;
use num_bigint::BigUint;

use super::Signer;
use crate::curve::secp256k1::encode_uncompressed;
use crate::curve::{AffinePoint, Secp256k1Curve};
use crate::error::{Result, TxError};
use crate::felt::FieldElement;
use crate::signature::{Secp256k1Signature, Signature};

/// Signs with a secp256k1 key for Ethereum-style account contracts.
///
/// Signatures come out as `[r.low, r.high, s.low, s.high, recovery]`.
#[derive(Clone)]
pub struct EthSigner {
    private_key: BigUint,
    public_key: AffinePoint,
}

impl EthSigner {
    pub fn new(private_key: BigUint) -> Result<Self> {
        let public_key = Secp256k1Curve.derive_public_key(&private_key)?;
        Ok(EthSigner {
            private_key,
            public_key,
        })
    }

    /// Parse a 32-byte hex key, with or without `0x`.
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let digits = private_key
            .strip_prefix("0x")
            .or_else(|| private_key.strip_prefix("0X"))
            .unwrap_or(private_key);
        if digits.is_empty() || digits.len() > 64 {
            return Err(TxError::InvalidKey(format!(
                "expected up to 64 hex digits, got {}",
                digits.len()
            )));
        }
        let key = BigUint::parse_bytes(digits.as_bytes(), 16)
            .ok_or_else(|| TxError::InvalidKey("private key is not valid hex".to_string()))?;
        Self::new(key)
    }

    pub fn public_point(&self) -> &AffinePoint {
        &self.public_key
    }
}

impl fmt::Debug for EthSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthSigner")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Signer for EthSigner {
    /// `0x` followed by the 64-byte `x || y` encoding.
    async fn get_public_key(&self) -> Result<String> {
        let encoded = encode_uncompressed(&self.public_key)?;
        Ok(format!("0x{}", hex::encode(&encoded[1..])))
    }

    async fn sign_hash(&self, hash: &FieldElement) -> Result<Signature> {
        let recoverable = Secp256k1Curve.sign(&hash.to_bytes_be(), &self.private_key)?;
        Ok(Secp256k1Signature::from_recoverable(&recoverable)?.into())
    }
}
