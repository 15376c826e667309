//! Affine arithmetic on short Weierstrass curves `y^2 = x^3 + a*x + b (mod p)`.
//!
//! Both curve capabilities in this crate are built on this engine. It favours
//! clarity over speed: every addition computes a modular inverse for the
//! slope, and scalar multiplication is plain double-and-add.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::arith::{add_mod, mod_inverse, mul_mod, sub_mod};
use crate::error::{Result, TxError};

/// Parameters of a prime-field short Weierstrass curve.
#[derive(Debug, Clone)]
pub struct CurveParams {
    pub name: &'static str,
    /// Field prime
    pub p: BigUint,
    pub a: BigUint,
    pub b: BigUint,
    /// Order of the generator
    pub n: BigUint,
    pub generator: AffinePoint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AffinePoint {
    Infinity,
    Point { x: BigUint, y: BigUint },
}

impl AffinePoint {
    pub fn new(x: BigUint, y: BigUint) -> Self {
        AffinePoint::Point { x, y }
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, AffinePoint::Infinity)
    }

    pub fn x(&self) -> Option<&BigUint> {
        match self {
            AffinePoint::Point { x, .. } => Some(x),
            AffinePoint::Infinity => None,
        }
    }

    pub fn y(&self) -> Option<&BigUint> {
        match self {
            AffinePoint::Point { y, .. } => Some(y),
            AffinePoint::Infinity => None,
        }
    }
}

impl CurveParams {
    /// Build a curve from hex constants, checking the generator lies on it.
    pub fn parse(
        name: &'static str,
        p: &str,
        a: &str,
        b: &str,
        n: &str,
        gx: &str,
        gy: &str,
    ) -> Result<Self> {
        let hex = |s: &str| {
            BigUint::parse_bytes(s.as_bytes(), 16).ok_or_else(|| {
                TxError::Encoding(format!("{} curve constant '{}' is not hex", name, s))
            })
        };
        let params = CurveParams {
            name,
            p: hex(p)?,
            a: hex(a)?,
            b: hex(b)?,
            n: hex(n)?,
            generator: AffinePoint::new(hex(gx)?, hex(gy)?),
        };
        if params.p.is_zero() || params.n.is_zero() || !params.is_on_curve(&params.generator) {
            return Err(TxError::Encoding(format!(
                "{} curve constants do not describe a curve with its generator",
                name
            )));
        }
        Ok(params)
    }

    pub fn is_on_curve(&self, point: &AffinePoint) -> bool {
        match point {
            AffinePoint::Infinity => true,
            AffinePoint::Point { x, y } => {
                let lhs = mul_mod(y, y, &self.p);
                let x3 = mul_mod(&mul_mod(x, x, &self.p), x, &self.p);
                let rhs = add_mod(&add_mod(&x3, &mul_mod(&self.a, x, &self.p), &self.p), &self.b, &self.p);
                lhs == rhs
            }
        }
    }

    pub fn negate(&self, point: &AffinePoint) -> AffinePoint {
        match point {
            AffinePoint::Infinity => AffinePoint::Infinity,
            AffinePoint::Point { x, y } => AffinePoint::new(x.clone(), sub_mod(&BigUint::zero(), y, &self.p)),
        }
    }

    /// Point doubling with slope `(3x^2 + a) / 2y`.
    pub fn double(&self, point: &AffinePoint) -> Result<AffinePoint> {
        let (x, y) = match point {
            AffinePoint::Infinity => return Ok(AffinePoint::Infinity),
            AffinePoint::Point { x, y } => (x, y),
        };
        if y.is_zero() {
            return Ok(AffinePoint::Infinity);
        }

        let p = &self.p;
        let numerator = add_mod(&mul_mod(&BigUint::from(3u8), &mul_mod(x, x, p), p), &self.a, p);
        let denominator = mod_inverse(&mul_mod(&BigUint::from(2u8), y, p), p)?;
        let slope = mul_mod(&numerator, &denominator, p);

        let nx = sub_mod(&mul_mod(&slope, &slope, p), &mul_mod(&BigUint::from(2u8), x, p), p);
        let ny = sub_mod(&mul_mod(&slope, &sub_mod(x, &nx, p), p), y, p);
        Ok(AffinePoint::new(nx, ny))
    }

    /// Point addition with slope `(y2 - y1) / (x2 - x1)`.
    pub fn add(&self, lhs: &AffinePoint, rhs: &AffinePoint) -> Result<AffinePoint> {
        let (x1, y1, x2, y2) = match (lhs, rhs) {
            (AffinePoint::Infinity, _) => return Ok(rhs.clone()),
            (_, AffinePoint::Infinity) => return Ok(lhs.clone()),
            (AffinePoint::Point { x: x1, y: y1 }, AffinePoint::Point { x: x2, y: y2 }) => (x1, y1, x2, y2),
        };

        let p = &self.p;
        if x1 == x2 {
            if y1 == y2 {
                return self.double(lhs);
            }
            // P + (-P)
            return Ok(AffinePoint::Infinity);
        }

        let slope = mul_mod(&sub_mod(y2, y1, p), &mod_inverse(&sub_mod(x2, x1, p), p)?, p);
        let nx = sub_mod(&sub_mod(&mul_mod(&slope, &slope, p), x1, p), x2, p);
        let ny = sub_mod(&mul_mod(&slope, &sub_mod(x1, &nx, p), p), y1, p);
        Ok(AffinePoint::new(nx, ny))
    }

    /// Double-and-add over the full bit width of `scalar`, most significant
    /// bit first.
    pub fn mul(&self, point: &AffinePoint, scalar: &BigUint) -> Result<AffinePoint> {
        let mut acc = AffinePoint::Infinity;
        for i in (0..scalar.bits()).rev() {
            acc = self.double(&acc)?;
            if scalar.bit(i) {
                acc = self.add(&acc, point)?;
            }
        }
        Ok(acc)
    }

    pub fn mul_generator(&self, scalar: &BigUint) -> Result<AffinePoint> {
        self.mul(&self.generator, scalar)
    }

    /// Reduce a private key modulo the group order, rejecting zero.
    pub fn validate_private_key(&self, private_key: &BigUint) -> Result<BigUint> {
        let reduced = private_key % &self.n;
        if reduced.is_zero() {
            return Err(TxError::InvalidKey(format!(
                "private key reduces to zero modulo the {} group order",
                self.name
            )));
        }
        Ok(reduced)
    }

    /// Derive `private_key * G`.
    pub fn derive_public_key(&self, private_key: &BigUint) -> Result<AffinePoint> {
        let key = self.validate_private_key(private_key)?;
        self.mul_generator(&key)
    }

    /// Square root modulo `p` for primes `p ≡ 3 (mod 4)`.
    pub fn sqrt_mod(&self, value: &BigUint) -> Option<BigUint> {
        let p = &self.p;
        if p % BigUint::from(4u8) != BigUint::from(3u8) {
            return None;
        }
        let exponent = (p + BigUint::one()) >> 2;
        let root = value.modpow(&exponent, p);
        if mul_mod(&root, &root, p) == value % p {
            Some(root)
        } else {
            None
        }
    }
}
