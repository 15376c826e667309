//! Depth-first flattening of call arguments into field elements.

use std::fmt;
use std::ops::Deref;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, trace};

use super::value::{CairoValue, RawArgs};
use crate::error::{Result, TxError};
use crate::felt::FieldElement;

/// Flattened calldata. Only [`compile`] produces it, so a value of this type
/// is never flattened as a tree again.
#[derive(Clone, PartialEq, Eq, Default, Hash)]
pub struct Calldata(Vec<FieldElement>);

impl Calldata {
    /// Wrap elements that are already flat, such as calldata read back from
    /// the chain.
    pub fn from_felts(felts: Vec<FieldElement>) -> Self {
        Calldata(felts)
    }

    pub fn as_slice(&self) -> &[FieldElement] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<FieldElement> {
        self.0
    }

    /// Decimal encoding of every element.
    pub fn to_decimal_strings(&self) -> Vec<String> {
        self.0.iter().map(FieldElement::to_decimal_string).collect()
    }
}

impl Deref for Calldata {
    type Target = [FieldElement];

    fn deref(&self) -> &[FieldElement] {
        &self.0
    }
}

impl fmt::Debug for Calldata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Calldata").field(&self.to_decimal_strings()).finish()
    }
}

impl Serialize for Calldata {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_decimal_strings().serialize(serializer)
    }
}

/// Accepts any argument shape [`RawArgs::from_json`] does and compiles it.
impl<'de> Deserialize<'de> for Calldata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        RawArgs::from_json(&value)
            .and_then(compile)
            .map_err(D::Error::custom)
    }
}

impl From<Calldata> for RawArgs {
    fn from(calldata: Calldata) -> Self {
        RawArgs::from(calldata.0)
    }
}

impl From<&Calldata> for RawArgs {
    fn from(calldata: &Calldata) -> Self {
        RawArgs::from(calldata.0.clone())
    }
}

/// Flatten `args` into calldata.
///
/// A top-level positional list is a record keyed by index, so it gets no
/// length prefix. That makes compiling already-flat felts the identity.
pub fn compile(args: impl Into<RawArgs>) -> Result<Calldata> {
    let args = args.into();
    let mut out = Vec::new();
    match &args {
        RawArgs::Named(fields) => {
            for (name, value) in fields {
                flatten(value, name, &mut out)?;
            }
        }
        RawArgs::Positional(values) => {
            for (index, value) in values.iter().enumerate() {
                flatten(value, &index.to_string(), &mut out)?;
            }
        }
    }
    debug!(len = out.len(), "compiled calldata");
    Ok(Calldata(out))
}

fn flatten(value: &CairoValue, path: &str, out: &mut Vec<FieldElement>) -> Result<()> {
    match value {
        CairoValue::Struct(fields) => {
            for (name, field) in fields {
                flatten(field, &format!("{}.{}", path, name), out)?;
            }
        }
        CairoValue::Array(items) => {
            push(out, &format!("{}.$$len", path), FieldElement::from(items.len()));
            for (index, item) in items.iter().enumerate() {
                flatten(item, &format!("{}.{}", path, index), out)?;
            }
        }
        CairoValue::Option(Some(payload)) => {
            push(out, path, FieldElement::ZERO);
            flatten(payload, &format!("{}.Some", path), out)?;
        }
        CairoValue::Option(None) => push(out, path, FieldElement::ONE),
        CairoValue::Result(Ok(payload)) => {
            push(out, path, FieldElement::ZERO);
            flatten(payload, &format!("{}.Ok", path), out)?;
        }
        CairoValue::Result(Err(payload)) => {
            push(out, path, FieldElement::ONE);
            flatten(payload, &format!("{}.Err", path), out)?;
        }
        CairoValue::Enum(custom) => {
            push(out, path, FieldElement::from(custom.variant_index));
            if let (true, Some(payload)) = (custom.has_payload(), custom.payload.as_deref()) {
                flatten(payload, &format!("{}.{}", path, custom.variant_index), out)?;
            }
        }
        leaf => {
            let felt = encode_leaf(leaf, path)?;
            push(out, path, felt);
        }
    }
    Ok(())
}

fn push(out: &mut Vec<FieldElement>, path: &str, felt: FieldElement) {
    trace!(path, %felt, "calldata element");
    out.push(felt);
}

fn encode_leaf(value: &CairoValue, path: &str) -> Result<FieldElement> {
    match value {
        CairoValue::Felt(felt) => Ok(*felt),
        CairoValue::Int(n) => Ok(FieldElement::from(*n)),
        CairoValue::Bool(b) => Ok(FieldElement::from(*b)),
        CairoValue::Text(text) => encode_text(text, path),
        _ => Err(TxError::unsupported(path, "not a scalar value")),
    }
}

fn encode_text(text: &str, path: &str) -> Result<FieldElement> {
    let as_unsupported = |err: TxError| TxError::unsupported(path, err.to_string());
    if text.starts_with("0x") || text.starts_with("0X") {
        FieldElement::from_hex(text).map_err(as_unsupported)
    } else if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        FieldElement::from_dec_str(text).map_err(as_unsupported)
    } else {
        FieldElement::from_short_string(text).map_err(as_unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calldata::value::CustomEnum;
    use rstest::rstest;
    use serde_json::json;

    fn felts(values: &[u64]) -> Vec<FieldElement> {
        values.iter().map(|v| FieldElement::from(*v)).collect()
    }

    #[test]
    fn test_reference_vector() {
        let args = RawArgs::named([
            ("amount", CairoValue::Int(1234)),
            ("flag", CairoValue::Bool(true)),
            ("list", CairoValue::from(vec![1u64, 2])),
        ]);
        let calldata = compile(args).unwrap();
        assert_eq!(calldata.to_decimal_strings(), vec!["1234", "1", "2", "1", "2"]);
    }

    #[test]
    fn test_nested_array_gets_length_prefix() {
        let args = RawArgs::named([(
            "outer",
            CairoValue::Struct(vec![
                ("a".to_string(), CairoValue::Int(9)),
                ("items".to_string(), CairoValue::from(vec![5u64, 6, 7])),
                ("empty".to_string(), CairoValue::Array(vec![])),
            ]),
        )]);
        assert_eq!(compile(args).unwrap().as_slice(), felts(&[9, 3, 5, 6, 7, 0]).as_slice());
    }

    #[test]
    fn test_array_of_arrays() {
        let args = RawArgs::positional([CairoValue::Array(vec![
            CairoValue::from(vec![1u64]),
            CairoValue::from(vec![2u64, 3]),
        ])]);
        assert_eq!(compile(args).unwrap().as_slice(), felts(&[2, 1, 1, 2, 2, 3]).as_slice());
    }

    #[rstest]
    #[case(CairoValue::some(CairoValue::Int(8)), vec![0, 8])]
    #[case(CairoValue::none(), vec![1])]
    #[case(CairoValue::ok(CairoValue::Int(4)), vec![0, 4])]
    #[case(CairoValue::err(CairoValue::Int(4)), vec![1, 4])]
    #[case(CairoValue::Enum(CustomEnum::new(2, Some(CairoValue::Int(6)))), vec![2, 6])]
    #[case(CairoValue::Enum(CustomEnum::new(1, Some(CairoValue::Struct(vec![])))), vec![1])]
    #[case(CairoValue::Enum(CustomEnum::new(3, Some(CairoValue::Array(vec![])))), vec![3])]
    #[case(CairoValue::Enum(CustomEnum::new(0, None)), vec![0])]
    #[case(
        CairoValue::some(CairoValue::from(vec![7u64, 8])),
        vec![0, 2, 7, 8]
    )]
    fn test_enum_shapes(#[case] value: CairoValue, #[case] expected: Vec<u64>) {
        let calldata = compile(RawArgs::positional([value])).unwrap();
        assert_eq!(calldata.as_slice(), felts(&expected).as_slice());
    }

    #[test]
    fn test_text_leaves() {
        let args = RawArgs::positional([
            CairoValue::Text("0x10".into()),
            CairoValue::Text("10".into()),
            CairoValue::Text("hello".into()),
        ]);
        let calldata = compile(args).unwrap();
        assert_eq!(calldata[0], FieldElement::from(16u64));
        assert_eq!(calldata[1], FieldElement::from(10u64));
        assert_eq!(calldata[2], FieldElement::from_short_string("hello").unwrap());
    }

    #[test]
    fn test_long_text_is_unsupported() {
        let args = RawArgs::named([(
            "memo",
            CairoValue::Struct(vec![("text".to_string(), CairoValue::Text("x".repeat(32)))]),
        )]);
        match compile(args).unwrap_err() {
            TxError::UnsupportedValue { path, .. } => assert_eq!(path, "memo.text"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_compile_is_idempotent_on_flat_input() {
        let first = compile(RawArgs::from_json(&json!([1, "0x2", 3])).unwrap()).unwrap();
        let second = compile(first.clone()).unwrap();
        assert_eq!(first, second);

        let structured = compile(RawArgs::from_json(&json!({"a": [1, 2], "b": {"$Some": 3}})).unwrap())
            .unwrap();
        assert_eq!(compile(&structured).unwrap(), structured);
    }

    #[test]
    fn test_serializes_as_decimal_strings() {
        let calldata = compile(RawArgs::from(felts(&[255]))).unwrap();
        assert_eq!(serde_json::to_string(&calldata).unwrap(), r#"["255"]"#);
    }
}
