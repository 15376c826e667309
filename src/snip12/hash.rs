/// SNIP-12 type encoding and struct hashing

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use super::domain::revision_of;
use super::{Revision, TypedData, TypedDataField};
use crate::error::{Result, TxError};
use crate::felt::{FieldElement, MAX_SHORT_STRING_LEN};
use crate::hash::starknet_keccak;

type Types = BTreeMap<String, Vec<TypedDataField>>;

/// Types every revision 1 message may reference without declaring them.
fn preset_types() -> Types {
    let u256 = vec![TypedDataField::new("low", "u128"), TypedDataField::new("high", "u128")];
    let token_amount = vec![
        TypedDataField::new("token_address", "ContractAddress"),
        TypedDataField::new("amount", "u256"),
    ];
    let nft_id = vec![
        TypedDataField::new("collection_address", "ContractAddress"),
        TypedDataField::new("token_id", "u256"),
    ];
    BTreeMap::from([
        ("u256".to_string(), u256),
        ("TokenAmount".to_string(), token_amount),
        ("NftId".to_string(), nft_id),
    ])
}

/// Declared types, plus the presets for revision 1.
pub(crate) fn all_types(typed_data: &TypedData, revision: Revision) -> Types {
    let mut types = typed_data.types.clone();
    if revision == Revision::V1 {
        for (name, fields) in preset_types() {
            types.entry(name).or_insert(fields);
        }
    }
    types
}

/// The primary type first, then every referenced struct type sorted by name.
pub fn get_dependencies(types: &Types, primary: &str) -> Vec<String> {
    fn collect(types: &Types, type_name: &str, found: &mut Vec<String>) {
        let base = type_name.trim_end_matches('*');
        if found.iter().any(|t| t == base) {
            return;
        }
        let Some(fields) = types.get(base) else {
            return;
        };
        found.push(base.to_string());
        for field in fields {
            collect(types, &field.r#type, found);
        }
    }

    let mut found = Vec::new();
    collect(types, primary, &mut found);
    if found.len() > 1 {
        found[1..].sort();
    }
    found
}

/// e.g. `Mail(from:Person,to:Person)Person(name:felt)`; revision 1 quotes
/// every name.
pub fn encode_type(types: &Types, primary: &str, revision: Revision) -> Result<String> {
    let dependencies = get_dependencies(types, primary);
    if dependencies.is_empty() {
        return Err(TxError::InvalidTypedData(format!("unknown type '{}'", primary)));
    }

    let esc = |s: &str| match revision {
        Revision::V0 => s.to_string(),
        Revision::V1 => format!("\"{}\"", s),
    };
    let mut encoded = String::new();
    for dependency in &dependencies {
        let fields: Vec<String> = types[dependency]
            .iter()
            .map(|field| format!("{}:{}", esc(&field.name), esc(&field.r#type)))
            .collect();
        encoded.push_str(&format!("{}({})", esc(dependency), fields.join(",")));
    }
    Ok(encoded)
}

pub fn get_type_hash(types: &Types, type_name: &str, revision: Revision) -> Result<FieldElement> {
    Ok(starknet_keccak(encode_type(types, type_name, revision)?.as_bytes()))
}

/// Hash of one struct value: `H([type_hash, ...encoded fields])`.
pub fn get_struct_hash(
    types: &Types,
    type_name: &str,
    data: &Map<String, Value>,
    revision: Revision,
) -> Result<FieldElement> {
    let fields = types
        .get(type_name)
        .ok_or_else(|| TxError::InvalidTypedData(format!("unknown type '{}'", type_name)))?;

    let mut elements = vec![get_type_hash(types, type_name, revision)?];
    for field in fields {
        let value = data.get(&field.name).ok_or_else(|| {
            TxError::InvalidTypedData(format!("missing field '{}' of '{}'", field.name, type_name))
        })?;
        elements.push(encode_value(types, &field.r#type, value, revision)?);
    }
    Ok(revision.hash(&elements))
}

fn encode_value(types: &Types, type_name: &str, value: &Value, revision: Revision) -> Result<FieldElement> {
    if types.contains_key(type_name) {
        let data = value.as_object().ok_or_else(|| {
            TxError::InvalidTypedData(format!("expected an object for '{}'", type_name))
        })?;
        return get_struct_hash(types, type_name, data, revision);
    }

    if let Some(inner) = type_name.strip_suffix('*') {
        let items = value.as_array().ok_or_else(|| {
            TxError::InvalidTypedData(format!("expected an array for '{}'", type_name))
        })?;
        let hashes = items
            .iter()
            .map(|item| encode_value(types, inner, item, revision))
            .collect::<Result<Vec<_>>>()?;
        return Ok(revision.hash(&hashes));
    }

    match (type_name, revision) {
        ("enum" | "merkletree", _) => Err(TxError::InvalidTypedData(format!(
            "'{}' values are not supported",
            type_name
        ))),
        ("selector", _) => match value.as_str() {
            Some(s) if s.starts_with("0x") => FieldElement::from_hex(s),
            Some(name) => Ok(starknet_keccak(name.as_bytes())),
            None => Err(TxError::InvalidTypedData("selector must be a string".to_string())),
        },
        ("string", Revision::V1) => {
            let text = value
                .as_str()
                .ok_or_else(|| TxError::InvalidTypedData("string must be text".to_string()))?;
            Ok(revision.hash(&byte_array_elements(text)))
        }
        ("i128", Revision::V1) => encode_signed(value),
        _ => encode_scalar(value),
    }
}

/// A string as a Cairo `ByteArray`: `[n, ...31-byte words, pending, pending_len]`.
pub fn byte_array_elements(text: &str) -> Vec<FieldElement> {
    fn word(chunk: &[u8]) -> FieldElement {
        let mut padded = [0u8; 32];
        padded[32 - chunk.len()..].copy_from_slice(chunk);
        FieldElement::from_bytes_be(&padded)
    }

    let chunks: Vec<&[u8]> = text.as_bytes().chunks(MAX_SHORT_STRING_LEN).collect();
    let (full, pending): (&[&[u8]], &[u8]) = match chunks.split_last() {
        Some((last, rest)) if last.len() < MAX_SHORT_STRING_LEN => (rest, *last),
        _ => (&chunks[..], &[][..]),
    };

    let mut elements = vec![FieldElement::from(full.len())];
    elements.extend(full.iter().map(|chunk| word(chunk)));
    elements.push(word(pending));
    elements.push(FieldElement::from(pending.len()));
    elements
}

fn encode_signed(value: &Value) -> Result<FieldElement> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => {
            return Err(TxError::InvalidTypedData(format!("{} is not an i128", other)));
        }
    };
    match text.strip_prefix('-') {
        Some(magnitude) => Ok(-FieldElement::from_dec_str(magnitude)?),
        None => text.parse(),
    }
}

/// Felt-like scalars: numbers, booleans, hex, decimal or short text.
fn encode_scalar(value: &Value) -> Result<FieldElement> {
    match value {
        Value::Bool(b) => Ok(FieldElement::from(*b)),
        Value::Number(n) => n
            .as_u64()
            .map(FieldElement::from)
            .ok_or_else(|| TxError::InvalidTypedData(format!("{} is not a felt", n))),
        Value::String(s) if s.starts_with("0x") || s.starts_with("0X") => FieldElement::from_hex(s),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            FieldElement::from_dec_str(s)
        }
        Value::String(s) => FieldElement::from_short_string(s),
        other => Err(TxError::InvalidTypedData(format!("{} is not a felt", other))),
    }
}

/// `H([shortstring("StarkNet Message"), domain_hash, account, message_hash])`
pub fn get_message_hash(typed_data: &TypedData, account_address: &FieldElement) -> Result<FieldElement> {
    let revision = revision_of(&typed_data.domain)?;
    let types = all_types(typed_data, revision);
    if !types.contains_key(revision.domain_type()) {
        return Err(TxError::InvalidTypedData(format!(
            "revision {:?} requires a '{}' type",
            revision,
            revision.domain_type()
        )));
    }

    let domain_hash = get_struct_hash(&types, revision.domain_type(), &typed_data.domain, revision)?;
    let message_hash = get_struct_hash(&types, &typed_data.primary_type, &typed_data.message, revision)?;
    let prefix = FieldElement::from_short_string("StarkNet Message")?;

    let hash = revision.hash(&[prefix, domain_hash, *account_address, message_hash]);
    debug!(?revision, primary_type = %typed_data.primary_type, %hash, "typed data message hash");
    Ok(hash)
}
