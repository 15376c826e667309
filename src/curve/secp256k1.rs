//! ECDSA over secp256k1, used by the Ethereum-style account signer.
//!
//! Nonces are deterministic (RFC 6979 with HMAC-SHA256) and signatures are
//! normalized to low `s`, flipping the recovery bit when `s` is negated.

use std::sync::LazyLock;

use num_bigint::BigUint;
use num_traits::Zero;
use sha2::{Digest, Sha256};

use super::weierstrass::{AffinePoint, CurveParams};
use crate::arith::{add_mod, mod_inverse, mul_mod, sub_mod};
use crate::error::{Result, TxError};

pub static SECP256K1: LazyLock<CurveParams> = LazyLock::new(|| {
    CurveParams::parse(
        "secp256k1",
        "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f",
        "0",
        "7",
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
        "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
    )
    .expect("secp256k1 curve constants are valid")
});

/// An ECDSA signature with its public-key recovery bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: BigUint,
    pub s: BigUint,
    /// Bit 0: parity of `R.y`; bit 1: `R.x` overflowed the group order.
    pub recovery: u8,
}

/// The secondary curve capability: key derivation, sign, verify, recover.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Curve;

impl Secp256k1Curve {
    pub fn derive_public_key(&self, private_key: &BigUint) -> Result<AffinePoint> {
        SECP256K1.derive_public_key(private_key)
    }

    /// Sign a 32-byte big-endian message hash.
    pub fn sign(&self, hash: &[u8; 32], private_key: &BigUint) -> Result<RecoverableSignature> {
        let curve = &*SECP256K1;
        let n = &curve.n;
        let d = curve.validate_private_key(private_key)?;
        let z = BigUint::from_bytes_be(hash);
        let h1 = &z % n;

        let mut nonces = Rfc6979Nonces::new(&to_bytes32(&d), &to_bytes32(&h1), n);
        loop {
            let k = nonces.next_nonce();
            let point = curve.mul_generator(&k)?;
            let (x, y) = match &point {
                AffinePoint::Point { x, y } => (x, y),
                AffinePoint::Infinity => continue,
            };

            let r = x % n;
            if r.is_zero() {
                continue;
            }

            let k_inv = mod_inverse(&k, n)?;
            let mut s = mul_mod(&k_inv, &add_mod(&h1, &mul_mod(&r, &d, n), n), n);
            if s.is_zero() {
                continue;
            }

            let mut recovery = u8::from(y.bit(0)) | if x >= n { 2 } else { 0 };
            let half_order = n >> 1;
            if s > half_order {
                s = n - &s;
                recovery ^= 1;
            }

            return Ok(RecoverableSignature { r, s, recovery });
        }
    }

    pub fn verify(
        &self,
        hash: &[u8; 32],
        r: &BigUint,
        s: &BigUint,
        public_key: &AffinePoint,
    ) -> Result<bool> {
        let curve = &*SECP256K1;
        let n = &curve.n;
        if r.is_zero() || r >= n || s.is_zero() || s >= n {
            return Ok(false);
        }
        if public_key.is_infinity() || !curve.is_on_curve(public_key) {
            return Ok(false);
        }

        let z = BigUint::from_bytes_be(hash) % n;
        let w = mod_inverse(s, n)?;
        let u1 = mul_mod(&z, &w, n);
        let u2 = mul_mod(r, &w, n);
        let point = curve.add(&curve.mul_generator(&u1)?, &curve.mul(public_key, &u2)?)?;

        Ok(match point.x() {
            Some(x) => &(x % n) == r,
            None => false,
        })
    }

    /// Recover the signing public key from a signature and its recovery bit.
    pub fn recover_public_key(
        &self,
        hash: &[u8; 32],
        signature: &RecoverableSignature,
    ) -> Result<AffinePoint> {
        let curve = &*SECP256K1;
        let (n, p) = (&curve.n, &curve.p);
        let RecoverableSignature { r, s, recovery } = signature;
        if r.is_zero() || r >= n || s.is_zero() || s >= n || *recovery > 3 {
            return Err(TxError::InvalidSignature("signature out of range".to_string()));
        }

        let x = if recovery & 2 != 0 { r + n } else { r.clone() };
        if &x >= p {
            return Err(TxError::InvalidSignature("R.x exceeds the field prime".to_string()));
        }

        let alpha = add_mod(&mul_mod(&mul_mod(&x, &x, p), &x, p), &curve.b, p);
        let beta = curve
            .sqrt_mod(&alpha)
            .ok_or_else(|| TxError::InvalidSignature("R is not on the curve".to_string()))?;
        let y = if beta.bit(0) == (recovery & 1 == 1) {
            beta
        } else {
            p - &beta
        };
        let big_r = AffinePoint::new(x, y);

        let z = BigUint::from_bytes_be(hash) % n;
        let r_inv = mod_inverse(r, n)?;
        let u1 = mul_mod(&sub_mod(&BigUint::zero(), &z, n), &r_inv, n);
        let u2 = mul_mod(s, &r_inv, n);
        let public_key = curve.add(&curve.mul_generator(&u1)?, &curve.mul(&big_r, &u2)?)?;
        if public_key.is_infinity() {
            return Err(TxError::InvalidSignature("recovered point at infinity".to_string()));
        }
        Ok(public_key)
    }
}

/// SEC1 uncompressed encoding `04 || x || y`.
pub fn encode_uncompressed(point: &AffinePoint) -> Result<[u8; 65]> {
    match point {
        AffinePoint::Point { x, y } => {
            let mut out = [0u8; 65];
            out[0] = 0x04;
            out[1..33].copy_from_slice(&to_bytes32(x));
            out[33..].copy_from_slice(&to_bytes32(y));
            Ok(out)
        }
        AffinePoint::Infinity => Err(TxError::InvalidKey("public key at infinity".to_string())),
    }
}

/// Decode a SEC1 uncompressed point, with or without the `04` tag.
pub fn decode_uncompressed(bytes: &[u8]) -> Result<AffinePoint> {
    let body = match bytes.len() {
        65 if bytes[0] == 0x04 => &bytes[1..],
        64 => bytes,
        len => {
            return Err(TxError::InvalidKey(format!(
                "expected a 64 or 65 byte uncompressed point, got {} bytes",
                len
            )))
        }
    };
    let point = AffinePoint::new(
        BigUint::from_bytes_be(&body[..32]),
        BigUint::from_bytes_be(&body[32..]),
    );
    if !SECP256K1.is_on_curve(&point) {
        return Err(TxError::InvalidKey("point is not on secp256k1".to_string()));
    }
    Ok(point)
}

pub(crate) fn to_bytes32(value: &BigUint) -> [u8; 32] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    let start = 32usize.saturating_sub(bytes.len());
    out[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(32)..]);
    out
}

fn hmac_sha256(key: &[u8; 32], parts: &[&[u8]]) -> [u8; 32] {
    let mut block = [0u8; 64];
    block[..32].copy_from_slice(key);

    let mut inner = Sha256::new();
    inner.update(block.map(|b| b ^ 0x36));
    for part in parts {
        inner.update(part);
    }
    let inner_hash = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(block.map(|b| b ^ 0x5c));
    outer.update(inner_hash);

    let mut out = [0u8; 32];
    out.copy_from_slice(&outer.finalize());
    out
}

/// HMAC-DRBG nonce stream from RFC 6979 section 3.2.
struct Rfc6979Nonces {
    k: [u8; 32],
    v: [u8; 32],
    order: BigUint,
    started: bool,
}

impl Rfc6979Nonces {
    fn new(private_key: &[u8; 32], hash: &[u8; 32], order: &BigUint) -> Self {
        let mut k = [0u8; 32];
        let mut v = [1u8; 32];
        for tag in [0x00u8, 0x01] {
            k = hmac_sha256(&k, &[&v, &[tag], private_key, hash]);
            v = hmac_sha256(&k, &[&v]);
        }
        Rfc6979Nonces {
            k,
            v,
            order: order.clone(),
            started: false,
        }
    }

    /// Next candidate in `[1, n)`. Every call after the first reseeds first,
    /// so a caller rejecting a nonce simply asks again.
    fn next_nonce(&mut self) -> BigUint {
        loop {
            if self.started {
                self.k = hmac_sha256(&self.k, &[&self.v, &[0x00]]);
                self.v = hmac_sha256(&self.k, &[&self.v]);
            }
            self.started = true;

            self.v = hmac_sha256(&self.k, &[&self.v]);
            let candidate = BigUint::from_bytes_be(&self.v);
            if !candidate.is_zero() && candidate < self.order {
                return candidate;
            }
        }
    }
}
