//! Elliptic curve capabilities.
//!
//! [`stark::StarkCurve`] compresses and signs for the chain itself,
//! [`secp256k1::Secp256k1Curve`] signs for Ethereum-style accounts. They share
//! the affine engine in [`weierstrass`] but expose no common trait.

pub mod secp256k1;
pub mod stark;
pub mod weierstrass;

pub use secp256k1::{RecoverableSignature, Secp256k1Curve, SECP256K1};
pub use stark::{StarkCurve, StarkSignature, STARK_CURVE};
pub use weierstrass::{AffinePoint, CurveParams};
