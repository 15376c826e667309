use std::fmt;

use num_bigint::BigUint;
use serde::{Serialize, Serializer};

use crate::curve::{RecoverableSignature, StarkSignature};
use crate::error::{Result, TxError};
use crate::felt::{FieldElement, Uint256};

/// A signature as an account contract receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    /// `[r, s]`
    Stark { r: FieldElement, s: FieldElement },
    /// `[r.low, r.high, s.low, s.high, recovery]`
    Secp256k1(Secp256k1Signature),
}

impl Signature {
    /// The felts submitted with the transaction.
    pub fn to_felts(&self) -> Vec<FieldElement> {
        match self {
            Signature::Stark { r, s } => vec![*r, *s],
            Signature::Secp256k1(sig) => sig.to_felts().to_vec(),
        }
    }

    pub fn to_hex_strings(&self) -> Vec<String> {
        self.to_felts().iter().map(FieldElement::to_hex).collect()
    }
}

impl From<StarkSignature> for Signature {
    fn from(sig: StarkSignature) -> Self {
        Signature::Stark { r: sig.r, s: sig.s }
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_hex_strings().serialize(serializer)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_hex_strings().join(", "))
    }
}

/// A secp256k1 signature with `r` and `s` split into 128-bit limbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Secp256k1Signature {
    pub r: Uint256,
    pub s: Uint256,
    pub recovery: u8,
}

impl Secp256k1Signature {
    pub fn from_recoverable(sig: &RecoverableSignature) -> Result<Self> {
        Ok(Secp256k1Signature {
            r: Uint256::from_biguint(&sig.r)?,
            s: Uint256::from_biguint(&sig.s)?,
            recovery: sig.recovery,
        })
    }

    pub fn to_felts(&self) -> [FieldElement; 5] {
        [
            self.r.low,
            self.r.high,
            self.s.low,
            self.s.high,
            FieldElement::from(self.recovery as u64),
        ]
    }

    /// Parse the five-element form, checking every limb fits 128 bits.
    pub fn from_felts(felts: &[FieldElement]) -> Result<Self> {
        let [r_low, r_high, s_low, s_high, recovery] = felts else {
            return Err(TxError::InvalidSignature(format!(
                "expected 5 elements, got {}",
                felts.len()
            )));
        };

        for limb in [r_low, r_high, s_low, s_high] {
            if limb.to_biguint().bits() > 128 {
                return Err(TxError::InvalidSignature(format!("{} is not a 128-bit limb", limb)));
            }
        }
        let recovery = match recovery.to_biguint().to_u32_digits().as_slice() {
            [] => 0u8,
            [bit] if *bit <= 3 => *bit as u8,
            _ => {
                return Err(TxError::InvalidSignature(format!(
                    "recovery bit {} out of range",
                    recovery
                )))
            }
        };

        Ok(Secp256k1Signature {
            r: Uint256 { low: *r_low, high: *r_high },
            s: Uint256 { low: *s_low, high: *s_high },
            recovery,
        })
    }

    /// Reassemble the full-width `(r, s, recovery)`.
    pub fn to_recoverable(&self) -> RecoverableSignature {
        RecoverableSignature {
            r: self.r.to_biguint(),
            s: self.s.to_biguint(),
            recovery: self.recovery,
        }
    }

    pub fn r(&self) -> BigUint {
        self.r.to_biguint()
    }

    pub fn s(&self) -> BigUint {
        self.s.to_biguint()
    }
}

impl From<Secp256k1Signature> for Signature {
    fn from(sig: Secp256k1Signature) -> Self {
        Signature::Secp256k1(sig)
    }
}
