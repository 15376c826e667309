//! Transaction versions and the V3 fee types.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TxError};
use crate::felt::FieldElement;

/// Offset added to a version for fee-estimation-only transactions.
static QUERY_VERSION_OFFSET: LazyLock<BigUint> = LazyLock::new(|| BigUint::from(1u8) << 128);

/// Protocol version of a transaction.
///
/// The query variants are hashed with their own felt value but use the
/// element layout of the matching real version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionVersion {
    V1,
    V2,
    V3,
    QueryV1,
    QueryV2,
    QueryV3,
}

/// The layout a version selects in the hash builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashLayout {
    Legacy,
    V3,
}

impl TransactionVersion {
    fn number(&self) -> u8 {
        match self {
            TransactionVersion::V1 | TransactionVersion::QueryV1 => 1,
            TransactionVersion::V2 | TransactionVersion::QueryV2 => 2,
            TransactionVersion::V3 | TransactionVersion::QueryV3 => 3,
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(
            self,
            TransactionVersion::QueryV1 | TransactionVersion::QueryV2 | TransactionVersion::QueryV3
        )
    }

    /// Strip the query flag.
    pub fn base(&self) -> TransactionVersion {
        match self {
            TransactionVersion::V1 | TransactionVersion::QueryV1 => TransactionVersion::V1,
            TransactionVersion::V2 | TransactionVersion::QueryV2 => TransactionVersion::V2,
            TransactionVersion::V3 | TransactionVersion::QueryV3 => TransactionVersion::V3,
        }
    }

    pub fn layout(&self) -> HashLayout {
        match self.base() {
            TransactionVersion::V3 => HashLayout::V3,
            _ => HashLayout::Legacy,
        }
    }

    /// The value placed in the hashed element list.
    pub fn to_felt(&self) -> FieldElement {
        let number = BigUint::from(self.number());
        if self.is_query() {
            FieldElement::reduce(&(&*QUERY_VERSION_OFFSET + number))
        } else {
            FieldElement::reduce(&number)
        }
    }

    /// Parse a version from its felt value.
    pub fn from_felt(value: &FieldElement) -> Result<Self> {
        let raw = value.to_biguint();
        let (query, number) = if raw >= *QUERY_VERSION_OFFSET {
            (true, raw - &*QUERY_VERSION_OFFSET)
        } else {
            (false, raw)
        };

        let version = if number == BigUint::from(1u8) {
            TransactionVersion::V1
        } else if number == BigUint::from(2u8) {
            TransactionVersion::V2
        } else if number == BigUint::from(3u8) {
            TransactionVersion::V3
        } else {
            return Err(TxError::UnsupportedVersion(value.to_hex()));
        };

        Ok(if query { version.into_query() } else { version })
    }

    fn into_query(self) -> TransactionVersion {
        match self.base() {
            TransactionVersion::V1 => TransactionVersion::QueryV1,
            TransactionVersion::V2 => TransactionVersion::QueryV2,
            _ => TransactionVersion::QueryV3,
        }
    }
}

impl FromStr for TransactionVersion {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self> {
        let felt = s
            .parse::<FieldElement>()
            .map_err(|_| TxError::UnsupportedVersion(s.to_string()))?;
        Self::from_felt(&felt)
    }
}

impl fmt::Display for TransactionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_felt().to_hex())
    }
}

impl Serialize for TransactionVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_felt().to_hex())
    }
}

impl<'de> Deserialize<'de> for TransactionVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let felt = FieldElement::deserialize(deserializer)?;
        TransactionVersion::from_felt(&felt).map_err(serde::de::Error::custom)
    }
}

/// Where a V3 transaction's nonce or fee state is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataAvailabilityMode {
    L1,
    L2,
}

impl DataAvailabilityMode {
    pub fn to_felt(&self) -> FieldElement {
        match self {
            DataAvailabilityMode::L1 => FieldElement::ZERO,
            DataAvailabilityMode::L2 => FieldElement::ONE,
        }
    }
}

/// Bounds for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceBounds {
    pub max_amount: FieldElement,
    pub max_price_per_unit: FieldElement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceBoundsMapping {
    pub l1_gas: ResourceBounds,
    pub l2_gas: ResourceBounds,
}

impl ResourceBoundsMapping {
    /// `l1.max_amount, l1.max_price_per_unit, l2.max_amount, l2.max_price_per_unit`
    pub fn elements(&self) -> [FieldElement; 4] {
        [
            self.l1_gas.max_amount,
            self.l1_gas.max_price_per_unit,
            self.l2_gas.max_amount,
            self.l2_gas.max_price_per_unit,
        ]
    }
}
