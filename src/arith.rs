//! Modular arithmetic over arbitrary-precision integers.
//!
//! Shared by [`crate::felt::FieldElement`] and the affine curve engine, which
//! work over different moduli (the Stark prime, the secp256k1 prime and both
//! group orders).

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use crate::error::{Result, TxError};

/// Reduce `value` into `[0, modulus)`.
pub fn reduce(value: &BigUint, modulus: &BigUint) -> BigUint {
    value % modulus
}

/// Reduce a signed value into `[0, modulus)`, always non-negative.
pub fn reduce_signed(value: &BigInt, modulus: &BigUint) -> BigUint {
    let m = BigInt::from_biguint(Sign::Plus, modulus.clone());
    let mut r = value % &m;
    if r.sign() == Sign::Minus {
        r += &m;
    }
    r.into_parts().1
}

pub fn add_mod(a: &BigUint, b: &BigUint, modulus: &BigUint) -> BigUint {
    (a + b) % modulus
}

pub fn sub_mod(a: &BigUint, b: &BigUint, modulus: &BigUint) -> BigUint {
    let a = a % modulus;
    let b = b % modulus;
    if a >= b {
        a - b
    } else {
        modulus - (b - a)
    }
}

pub fn mul_mod(a: &BigUint, b: &BigUint, modulus: &BigUint) -> BigUint {
    (a * b) % modulus
}

/// Modular inverse via the extended Euclidean algorithm.
///
/// Fails with [`TxError::NotInvertible`] when `gcd(a, modulus) != 1`, which
/// for a prime modulus only happens for `a ≡ 0`.
pub fn mod_inverse(a: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(TxError::NotInvertible);
    }

    let m = BigInt::from_biguint(Sign::Plus, modulus.clone());
    let mut old_r = BigInt::from_biguint(Sign::Plus, a % modulus);
    let mut r = m.clone();
    let mut old_s = BigInt::one();
    let mut s = BigInt::zero();

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return Err(TxError::NotInvertible);
    }

    Ok(reduce_signed(&old_s, modulus))
}
