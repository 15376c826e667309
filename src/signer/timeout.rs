use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::warn;

use super::Signer;
use crate::error::{Result, TxError};
use crate::felt::FieldElement;
use crate::signature::Signature;

/// Bounds the signing step of any signer by a deadline.
///
/// Hashing still happens before the clock starts. On expiry the pending key
/// operation is dropped and `SignerUnavailable` is returned, with no retry.
#[derive(Debug, Clone)]
pub struct TimeoutSigner<S> {
    inner: S,
    limit: Duration,
}

impl<S: Signer> TimeoutSigner<S> {
    pub fn new(inner: S, limit: Duration) -> Self {
        TimeoutSigner { inner, limit }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: Signer> Signer for TimeoutSigner<S> {
    async fn get_public_key(&self) -> Result<String> {
        match timeout(self.limit, self.inner.get_public_key()).await {
            Ok(result) => result,
            Err(_) => Err(TxError::SignerUnavailable(format!(
                "public key not returned within {:?}",
                self.limit
            ))),
        }
    }

    async fn sign_hash(&self, hash: &FieldElement) -> Result<Signature> {
        match timeout(self.limit, self.inner.sign_hash(hash)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Signer timed out after {:?} on {}", self.limit, hash);
                Err(TxError::SignerUnavailable(format!(
                    "no signature within {:?}",
                    self.limit
                )))
            }
        }
    }
}
