//! Signer configuration from the environment or a JSON document.
//!
//! Environment variables (a `.env` file is loaded first when present):
//! - `STARKNET_PRIVATE_KEY`: hex private key (required)
//! - `STARKNET_SIGNER`: `stark` or `secp256k1` (default `stark`)
//! - `STARKNET_CHAIN_ID`: `SN_MAIN`, `SN_SEPOLIA` or a hex felt (default `SN_SEPOLIA`)
//! - `STARKNET_SIGN_TIMEOUT_MS`: optional bound on each signing step

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TxError};
use crate::felt::{FieldElement, StarknetChainId};
use crate::signer::{EthSigner, Signer, StarkSigner, TimeoutSigner};

pub const PRIVATE_KEY_VAR: &str = "STARKNET_PRIVATE_KEY";
pub const SIGNER_KIND_VAR: &str = "STARKNET_SIGNER";
pub const CHAIN_ID_VAR: &str = "STARKNET_CHAIN_ID";
pub const SIGN_TIMEOUT_VAR: &str = "STARKNET_SIGN_TIMEOUT_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignerKind {
    #[default]
    Stark,
    Secp256k1,
}

impl FromStr for SignerKind {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stark" => Ok(SignerKind::Stark),
            "secp256k1" | "eth" => Ok(SignerKind::Secp256k1),
            other => Err(TxError::InvalidDetails(format!("unknown signer kind '{}'", other))),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    pub private_key: String,
    #[serde(default)]
    pub signer: SignerKind,
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    #[serde(default)]
    pub sign_timeout_ms: Option<u64>,
}

fn default_chain_id() -> String {
    "SN_SEPOLIA".to_string()
}

impl SignerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source, for callers with their own environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let private_key = lookup(PRIVATE_KEY_VAR)
            .ok_or_else(|| TxError::InvalidKey(format!("{} must be set", PRIVATE_KEY_VAR)))?;
        let signer = match lookup(SIGNER_KIND_VAR) {
            Some(kind) => kind.parse()?,
            None => SignerKind::default(),
        };
        let chain_id = lookup(CHAIN_ID_VAR).unwrap_or_else(default_chain_id);
        let sign_timeout_ms = match lookup(SIGN_TIMEOUT_VAR) {
            Some(ms) => Some(ms.trim().parse::<u64>().map_err(|e| {
                TxError::InvalidDetails(format!("{} is not a number of milliseconds: {}", SIGN_TIMEOUT_VAR, e))
            })?),
            None => None,
        };

        Ok(SignerConfig {
            private_key,
            signer,
            chain_id,
            sign_timeout_ms,
        })
    }

    pub fn chain_id(&self) -> Result<FieldElement> {
        StarknetChainId::from_name(&self.chain_id)
    }

    pub fn sign_timeout(&self) -> Option<Duration> {
        self.sign_timeout_ms.map(Duration::from_millis)
    }

    pub fn build_signer(&self) -> Result<Box<dyn Signer>> {
        let signer: Box<dyn Signer> = match self.signer {
            SignerKind::Stark => Box::new(StarkSigner::from_hex(&self.private_key)?),
            SignerKind::Secp256k1 => Box::new(EthSigner::from_hex(&self.private_key)?),
        };
        info!("Using {:?} signer on chain {}", self.signer, self.chain_id);

        Ok(match self.sign_timeout() {
            Some(limit) => Box::new(TimeoutSigner::new(signer, limit)),
            None => signer,
        })
    }
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("private_key", &"<redacted>")
            .field("signer", &self.signer)
            .field("chain_id", &self.chain_id)
            .field("sign_timeout_ms", &self.sign_timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SignerConfig::from_lookup(lookup(&[(PRIVATE_KEY_VAR, "0x1234")])).unwrap();
        assert_eq!(config.signer, SignerKind::Stark);
        assert_eq!(config.chain_id().unwrap(), StarknetChainId::SN_SEPOLIA);
        assert_eq!(config.sign_timeout(), None);
    }

    #[test]
    fn test_missing_key_and_bad_values() {
        assert!(matches!(
            SignerConfig::from_lookup(lookup(&[])),
            Err(TxError::InvalidKey(_))
        ));
        assert!(SignerConfig::from_lookup(lookup(&[
            (PRIVATE_KEY_VAR, "0x1"),
            (SIGNER_KIND_VAR, "ed25519"),
        ]))
        .is_err());
        assert!(SignerConfig::from_lookup(lookup(&[
            (PRIVATE_KEY_VAR, "0x1"),
            (SIGN_TIMEOUT_VAR, "soon"),
        ]))
        .is_err());
    }

    #[rstest]
    #[case("stark", 2)]
    #[case("secp256k1", 5)]
    #[tokio::test]
    async fn test_build_signer(#[case] kind: &str, #[case] signature_len: usize) {
        let config = SignerConfig::from_lookup(lookup(&[
            (PRIVATE_KEY_VAR, "0x2dccce1da22003777062ee0870e9881b460a8b7eca276870f57c601f182136c"),
            (SIGNER_KIND_VAR, kind),
            (CHAIN_ID_VAR, "SN_MAIN"),
            (SIGN_TIMEOUT_VAR, "5000"),
        ]))
        .unwrap();
        assert_eq!(config.chain_id().unwrap(), StarknetChainId::SN_MAIN);

        let signer = config.build_signer().unwrap();
        let signature = signer.sign_hash(&FieldElement::from(42u64)).await.unwrap();
        assert_eq!(signature.to_felts().len(), signature_len);
    }

    #[test]
    fn test_json_defaults_and_redacted_debug() {
        let config: SignerConfig = serde_json::from_str(r#"{"private_key": "0xabc"}"#).unwrap();
        assert_eq!(config.signer, SignerKind::Stark);
        assert_eq!(config.chain_id, "SN_SEPOLIA");

        let config: SignerConfig =
            serde_json::from_str(r#"{"private_key": "0xabc", "signer": "secp256k1", "sign_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.signer, SignerKind::Secp256k1);
        assert_eq!(config.sign_timeout(), Some(Duration::from_millis(250)));
        assert!(!format!("{:?}", config).contains("0xabc"));
    }
}
