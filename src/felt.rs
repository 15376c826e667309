//! Field elements of the Starknet prime field.
//!
//! [`FieldElement`] is a thin value type over `starknet_crypto::Felt` so that
//! every value handed to the hash and signing routines is already reduced
//! into `[0, P)`. It adds the encodings the calldata compiler and the
//! transaction builders need: hex, decimal and Cairo short strings.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;
use std::sync::LazyLock;

use num_bigint::BigUint;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use starknet_crypto::Felt;

use crate::arith;
use crate::error::{Result, TxError};

/// Maximum number of bytes a Cairo short string can hold.
pub const MAX_SHORT_STRING_LEN: usize = 31;

/// The Starknet prime `P = 2^251 + 17 * 2^192 + 1`.
pub static FIELD_PRIME: LazyLock<BigUint> = LazyLock::new(|| {
    (BigUint::from(1u8) << 251) + (BigUint::from(17u8) << 192) + BigUint::from(1u8)
});

static U128_MASK: LazyLock<BigUint> = LazyLock::new(|| (BigUint::from(1u8) << 128) - 1u8);

/// An element of the Starknet prime field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FieldElement(Felt);

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement(Felt::ZERO);
    pub const ONE: FieldElement = FieldElement(Felt::ONE);
    pub const TWO: FieldElement = FieldElement(Felt::TWO);

    /// Build a constant from a hex literal known to be in range.
    pub const fn from_hex_unchecked(hex: &str) -> Self {
        FieldElement(Felt::from_hex_unchecked(hex))
    }

    /// Reduce an arbitrary unsigned integer modulo `P`.
    pub fn reduce(value: &BigUint) -> Self {
        FieldElement(Felt::from(arith::reduce(value, &FIELD_PRIME)))
    }

    /// Parse a hex string, with or without `0x` prefix, reducing modulo `P`.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let digits = hex_str
            .strip_prefix("0x")
            .or_else(|| hex_str.strip_prefix("0X"))
            .unwrap_or(hex_str);
        if digits.is_empty() {
            return Err(TxError::Encoding(format!("empty hex string '{}'", hex_str)));
        }
        let value = BigUint::parse_bytes(digits.as_bytes(), 16)
            .ok_or_else(|| TxError::Encoding(format!("malformed hex string '{}'", hex_str)))?;
        Ok(Self::reduce(&value))
    }

    /// Parse a base-10 string, reducing modulo `P`.
    pub fn from_dec_str(dec_str: &str) -> Result<Self> {
        if dec_str.is_empty() || !dec_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TxError::Encoding(format!(
                "malformed decimal string '{}'",
                dec_str
            )));
        }
        let value = BigUint::parse_bytes(dec_str.as_bytes(), 10)
            .ok_or_else(|| TxError::Encoding(format!("malformed decimal string '{}'", dec_str)))?;
        Ok(Self::reduce(&value))
    }

    /// Encode an ASCII string of at most 31 bytes as a Cairo short string.
    ///
    /// Longer text cannot fit one field element and is rejected, never
    /// truncated.
    pub fn from_short_string(text: &str) -> Result<Self> {
        if !text.is_ascii() {
            return Err(TxError::Encoding(format!(
                "short string '{}' contains non-ASCII characters",
                text
            )));
        }
        let bytes = text.as_bytes();
        if bytes.len() > MAX_SHORT_STRING_LEN {
            return Err(TxError::Encoding(format!(
                "'{}' is {} bytes long, short strings hold at most {}",
                text,
                bytes.len(),
                MAX_SHORT_STRING_LEN
            )));
        }

        let mut padded = [0u8; 32];
        padded[32 - bytes.len()..].copy_from_slice(bytes);
        Ok(FieldElement(Felt::from_bytes_be(&padded)))
    }

    /// Decode a Cairo short string. Zero and non-printable bytes are dropped.
    pub fn to_short_string(&self) -> String {
        self.0
            .to_bytes_be()
            .iter()
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|b| *b as char)
            .collect()
    }

    /// Big-endian bytes, reduced modulo `P`.
    pub fn from_bytes_be(bytes: &[u8; 32]) -> Self {
        FieldElement(Felt::from_bytes_be(bytes))
    }

    pub fn to_bytes_be(&self) -> [u8; 32] {
        self.0.to_bytes_be()
    }

    /// Canonical `0x`-prefixed lower-case hex, without zero padding.
    pub fn to_hex(&self) -> String {
        self.0.to_hex_string()
    }

    /// `0x`-prefixed hex padded to 64 digits.
    pub fn to_fixed_hex(&self) -> String {
        self.0.to_fixed_hex_string()
    }

    pub fn to_decimal_string(&self) -> String {
        self.to_biguint().to_string()
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0.to_bytes_be())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Felt::ZERO
    }

    /// Multiplicative inverse modulo `P`.
    pub fn mod_inverse(&self) -> Result<Self> {
        let inverse = arith::mod_inverse(&self.to_biguint(), &FIELD_PRIME)?;
        Ok(Self::reduce(&inverse))
    }

    pub fn as_felt(&self) -> &Felt {
        &self.0
    }

    pub fn into_felt(self) -> Felt {
        self.0
    }
}

impl From<Felt> for FieldElement {
    fn from(felt: Felt) -> Self {
        FieldElement(felt)
    }
}

impl From<FieldElement> for Felt {
    fn from(value: FieldElement) -> Self {
        value.0
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        FieldElement(Felt::from(value))
    }
}

impl From<u128> for FieldElement {
    fn from(value: u128) -> Self {
        FieldElement(Felt::from(value))
    }
}

impl From<usize> for FieldElement {
    fn from(value: usize) -> Self {
        FieldElement(Felt::from(value))
    }
}

impl From<bool> for FieldElement {
    fn from(value: bool) -> Self {
        FieldElement(Felt::from(value))
    }
}

impl From<&BigUint> for FieldElement {
    fn from(value: &BigUint) -> Self {
        Self::reduce(value)
    }
}

impl FromStr for FieldElement {
    type Err = TxError;

    /// `0x`-prefixed strings are hex, everything else is decimal.
    fn from_str(s: &str) -> Result<Self> {
        if s.starts_with("0x") || s.starts_with("0X") {
            Self::from_hex(s)
        } else {
            Self::from_dec_str(s)
        }
    }
}

impl Add for FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: FieldElement) -> FieldElement {
        FieldElement(self.0 + rhs.0)
    }
}

impl Sub for FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: FieldElement) -> FieldElement {
        FieldElement(self.0 - rhs.0)
    }
}

impl Mul for FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: FieldElement) -> FieldElement {
        FieldElement(self.0 * rhs.0)
    }
}

impl Neg for FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        FieldElement::ZERO - self
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_hex())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FeltVisitor;

        impl Visitor<'_> for FeltVisitor {
            type Value = FieldElement;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a hex string, a decimal string or an unsigned integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<FieldElement, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<FieldElement, E> {
                Ok(FieldElement::from(v))
            }
        }

        deserializer.deserialize_any(FeltVisitor)
    }
}

/// A 256-bit unsigned integer split into two 128-bit limbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uint256 {
    pub low: FieldElement,
    pub high: FieldElement,
}

impl Uint256 {
    /// Split a value below `2^256` into its low and high limbs.
    pub fn from_biguint(value: &BigUint) -> Result<Self> {
        if value.bits() > 256 {
            return Err(TxError::Encoding(format!(
                "{} does not fit in 256 bits",
                value
            )));
        }
        let low = value & &*U128_MASK;
        let high = value >> 128;
        Ok(Uint256 {
            low: FieldElement::reduce(&low),
            high: FieldElement::reduce(&high),
        })
    }

    /// Reassemble `high * 2^128 + low`.
    pub fn to_biguint(&self) -> BigUint {
        (self.high.to_biguint() << 128) + self.low.to_biguint()
    }
}

/// Chain identifiers, encoded as short strings.
pub struct StarknetChainId;

impl StarknetChainId {
    /// `encode_short_string("SN_MAIN")`
    pub const SN_MAIN: FieldElement = FieldElement::from_hex_unchecked("0x534e5f4d41494e");
    /// `encode_short_string("SN_SEPOLIA")`
    pub const SN_SEPOLIA: FieldElement = FieldElement::from_hex_unchecked("0x534e5f5345504f4c4941");

    /// Resolve a network name or a raw hex chain id.
    pub fn from_name(name: &str) -> Result<FieldElement> {
        match name {
            "SN_MAIN" | "mainnet" => Ok(Self::SN_MAIN),
            "SN_SEPOLIA" | "sepolia" => Ok(Self::SN_SEPOLIA),
            other if other.starts_with("0x") => FieldElement::from_hex(other),
            other => FieldElement::from_short_string(other),
        }
    }
}
