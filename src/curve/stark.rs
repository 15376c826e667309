//! The chain-native Stark curve.
//!
//! Two separate capabilities live here: [`StarkCurve::compress`], the Pedersen
//! compression used by every hash chain, and [`StarkCurve::sign`] /
//! [`StarkCurve::verify`] for account signatures. Public keys are derived on
//! the affine engine with the curve constants below.

use std::sync::LazyLock;

use starknet_crypto::{pedersen_hash, rfc6979_generate_k, sign, verify, Felt, SignError};
use tracing::trace;

use super::weierstrass::CurveParams;
use crate::error::{Result, TxError};
use crate::felt::FieldElement;

pub static STARK_CURVE: LazyLock<CurveParams> = LazyLock::new(|| {
    CurveParams::parse(
        "stark",
        "800000000000011000000000000000000000000000000000000000000000001",
        "1",
        "6f21413efbe40de150e596d72f7a8c5609ad26c15c915c1f4cdfcb99cee9e89",
        "800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f",
        "1ef15c18599971b7beced415a40f0c7deacfd9b0d1819e03d723d8bc943cfca",
        "5668060aa49730b7be4801df46ec62de53ecd11abe43a32873000c36e8dc1f",
    )
    .expect("stark curve constants are valid")
});

/// A Stark ECDSA signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarkSignature {
    pub r: FieldElement,
    pub s: FieldElement,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StarkCurve;

impl StarkCurve {
    /// Pedersen hash of two field elements. Order-sensitive.
    pub fn compress(&self, x: &FieldElement, y: &FieldElement) -> FieldElement {
        FieldElement::from(pedersen_hash(x.as_felt(), y.as_felt()))
    }

    /// The x coordinate of `private_key * G`.
    pub fn derive_public_key(&self, private_key: &FieldElement) -> Result<FieldElement> {
        let point = STARK_CURVE.derive_public_key(&private_key.to_biguint())?;
        let x = point
            .x()
            .ok_or_else(|| TxError::InvalidKey("public key at infinity".to_string()))?;
        Ok(FieldElement::reduce(x))
    }

    /// Deterministic signature over `hash`.
    ///
    /// The nonce comes from RFC 6979. When the curve routine rejects a nonce,
    /// the next one is generated with an incremented seed.
    pub fn sign(&self, hash: &FieldElement, private_key: &FieldElement) -> Result<StarkSignature> {
        STARK_CURVE.validate_private_key(&private_key.to_biguint())?;

        let key = private_key.as_felt();
        let message = hash.as_felt();
        let mut seed: Option<Felt> = None;
        loop {
            let k = rfc6979_generate_k(message, key, seed.as_ref());
            match sign(key, message, &k) {
                Ok(signature) => {
                    return Ok(StarkSignature {
                        r: FieldElement::from(signature.r),
                        s: FieldElement::from(signature.s),
                    })
                }
                Err(SignError::InvalidK) => {
                    trace!("nonce rejected, reseeding");
                    seed = Some(seed.unwrap_or(Felt::ZERO) + Felt::ONE);
                }
                Err(err) => {
                    return Err(TxError::InvalidSignature(format!(
                        "cannot sign message hash {}: {:?}",
                        hash, err
                    )))
                }
            }
        }
    }

    /// Malformed inputs verify as `false`.
    pub fn verify(
        &self,
        hash: &FieldElement,
        signature: &StarkSignature,
        public_key: &FieldElement,
    ) -> bool {
        verify(
            public_key.as_felt(),
            hash.as_felt(),
            signature.r.as_felt(),
            signature.s.as_felt(),
        )
        .unwrap_or(false)
    }
}
