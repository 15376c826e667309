//! Structured call arguments before flattening.

use num_bigint::BigUint;
use serde_json::{Map, Value};

use crate::error::{Result, TxError};
use crate::felt::{FieldElement, Uint256};

/// One argument value.
///
/// Enum shapes are explicit variants: [`CairoValue::Option`],
/// [`CairoValue::Result`] and [`CairoValue::Enum`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CairoValue {
    Felt(FieldElement),
    Int(u128),
    Bool(bool),
    /// `0x` hex, decimal digits, or short text of at most 31 bytes.
    Text(String),
    /// Named fields in declaration order.
    Struct(Vec<(String, CairoValue)>),
    Array(Vec<CairoValue>),
    Option(Option<Box<CairoValue>>),
    Result(std::result::Result<Box<CairoValue>, Box<CairoValue>>),
    Enum(CustomEnum),
}

impl CairoValue {
    pub fn some(value: CairoValue) -> Self {
        CairoValue::Option(Some(Box::new(value)))
    }

    pub fn none() -> Self {
        CairoValue::Option(None)
    }

    pub fn ok(value: CairoValue) -> Self {
        CairoValue::Result(Ok(Box::new(value)))
    }

    pub fn err(value: CairoValue) -> Self {
        CairoValue::Result(Err(Box::new(value)))
    }

    /// A `u256` as its `{low, high}` struct.
    pub fn u256(value: &BigUint) -> Result<Self> {
        let Uint256 { low, high } = Uint256::from_biguint(value)?;
        Ok(CairoValue::Struct(vec![
            ("low".to_string(), CairoValue::Felt(low)),
            ("high".to_string(), CairoValue::Felt(high)),
        ]))
    }

    /// Convert a JSON value.
    ///
    /// Objects with a single `$Some`, `$None`, `$Ok` or `$Err` key build the
    /// matching enum, and `{"$variant": i, "$payload": v}` builds a custom
    /// enum. Any other object is a struct in key order.
    pub fn from_json(value: &Value) -> Result<Self> {
        from_json_at(value, "$")
    }
}

impl From<FieldElement> for CairoValue {
    fn from(value: FieldElement) -> Self {
        CairoValue::Felt(value)
    }
}

impl From<u64> for CairoValue {
    fn from(value: u64) -> Self {
        CairoValue::Int(value as u128)
    }
}

impl From<u128> for CairoValue {
    fn from(value: u128) -> Self {
        CairoValue::Int(value)
    }
}

impl From<bool> for CairoValue {
    fn from(value: bool) -> Self {
        CairoValue::Bool(value)
    }
}

impl From<&str> for CairoValue {
    fn from(value: &str) -> Self {
        CairoValue::Text(value.to_string())
    }
}

impl<T: Into<CairoValue>> From<Vec<T>> for CairoValue {
    fn from(values: Vec<T>) -> Self {
        CairoValue::Array(values.into_iter().map(Into::into).collect())
    }
}

/// A custom Cairo enum with its active variant chosen at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEnum {
    pub variant_index: usize,
    pub payload: Option<Box<CairoValue>>,
}

impl CustomEnum {
    pub fn new(variant_index: usize, payload: Option<CairoValue>) -> Self {
        CustomEnum {
            variant_index,
            payload: payload.map(Box::new),
        }
    }

    /// Pick the single defined variant out of the full variant list.
    pub fn from_variants(variants: Vec<(String, Option<CairoValue>)>) -> Result<Self> {
        let mut active = variants
            .into_iter()
            .enumerate()
            .filter_map(|(index, (name, payload))| payload.map(|p| (index, name, p)));

        let (index, _, payload) = active.next().ok_or_else(|| {
            TxError::unsupported("enum", "custom enum has no active variant")
        })?;
        if let Some((_, name, _)) = active.next() {
            return Err(TxError::unsupported(
                "enum",
                format!("custom enum has more than one active variant (also '{}')", name),
            ));
        }
        Ok(CustomEnum::new(index, Some(payload)))
    }

    /// An empty struct or empty array payload carries no data.
    pub fn has_payload(&self) -> bool {
        match self.payload.as_deref() {
            None => false,
            Some(CairoValue::Struct(fields)) => !fields.is_empty(),
            Some(CairoValue::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }
}

/// Top-level arguments of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawArgs {
    Named(Vec<(String, CairoValue)>),
    Positional(Vec<CairoValue>),
}

impl RawArgs {
    pub fn named<K: Into<String>>(fields: impl IntoIterator<Item = (K, CairoValue)>) -> Self {
        RawArgs::Named(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn positional(values: impl IntoIterator<Item = CairoValue>) -> Self {
        RawArgs::Positional(values.into_iter().collect())
    }

    /// Objects are named, arrays positional, a lone scalar is one argument.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(RawArgs::Named(struct_from_json(map, "$")?)),
            Value::Array(items) => Ok(RawArgs::Positional(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| from_json_at(item, &format!("$.{}", i)))
                    .collect::<Result<_>>()?,
            )),
            other => Ok(RawArgs::Positional(vec![from_json_at(other, "$")?])),
        }
    }
}

impl Default for RawArgs {
    fn default() -> Self {
        RawArgs::Positional(Vec::new())
    }
}

impl From<Vec<FieldElement>> for RawArgs {
    fn from(values: Vec<FieldElement>) -> Self {
        RawArgs::Positional(values.into_iter().map(CairoValue::Felt).collect())
    }
}

fn struct_from_json(map: &Map<String, Value>, path: &str) -> Result<Vec<(String, CairoValue)>> {
    map.iter()
        .map(|(key, value)| {
            let child = format!("{}.{}", path, key);
            Ok((key.clone(), from_json_at(value, &child)?))
        })
        .collect()
}

fn from_json_at(value: &Value, path: &str) -> Result<CairoValue> {
    match value {
        Value::Null => Err(TxError::unsupported(path, "null is not a calldata value")),
        Value::Bool(b) => Ok(CairoValue::Bool(*b)),
        Value::Number(number) => {
            if let Some(n) = number.as_u64() {
                return Ok(CairoValue::Int(n as u128));
            }
            if number.as_i64().is_some() {
                return Err(TxError::unsupported(path, "negative numbers are not field elements"));
            }
            match number.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f < 9_007_199_254_740_992.0 => {
                    Ok(CairoValue::Int(f as u128))
                }
                _ => Err(TxError::unsupported(
                    path,
                    format!("{} is not a non-negative integer", number),
                )),
            }
        }
        Value::String(text) => Ok(CairoValue::Text(text.clone())),
        Value::Array(items) => Ok(CairoValue::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| from_json_at(item, &format!("{}.{}", path, i)))
                .collect::<Result<_>>()?,
        )),
        Value::Object(map) => enum_from_json(map, path)
            .unwrap_or_else(|| Ok(CairoValue::Struct(struct_from_json(map, path)?))),
    }
}

fn enum_from_json(map: &Map<String, Value>, path: &str) -> Option<Result<CairoValue>> {
    let boxed = |key: &str, v: &Value| from_json_at(v, &format!("{}.{}", path, key)).map(Box::new);

    if map.len() == 2 {
        let index = map.get("$variant")?;
        let payload = map.get("$payload")?;
        return Some(index_from_json(index, path).and_then(|index| {
            let payload = match payload {
                Value::Null => None,
                v => Some(boxed("$payload", v)?),
            };
            Ok(CairoValue::Enum(CustomEnum {
                variant_index: index,
                payload,
            }))
        }));
    }

    if map.len() != 1 {
        return None;
    }
    let (key, inner) = map.iter().next()?;
    let value = match key.as_str() {
        "$Some" => boxed(key, inner).map(|v| CairoValue::Option(Some(v))),
        "$None" => Ok(CairoValue::Option(None)),
        "$Ok" => boxed(key, inner).map(|v| CairoValue::Result(Ok(v))),
        "$Err" => boxed(key, inner).map(|v| CairoValue::Result(Err(v))),
        "$variant" => index_from_json(inner, path).map(|index| CairoValue::Enum(CustomEnum::new(index, None))),
        _ => return None,
    };
    Some(value)
}

fn index_from_json(value: &Value, path: &str) -> Result<usize> {
    value
        .as_u64()
        .map(|i| i as usize)
        .ok_or_else(|| TxError::unsupported(path, "enum variant index must be an unsigned integer"))
}
