/// SNIP-12 (Starknet typed data) message hashing
///
/// Revision 0 hashes with Pedersen `hash_on_elements` under a
/// `StarkNetDomain` type; revision 1 hashes with Poseidon under a
/// `StarknetDomain` type and quotes names in the encoded type string.
///
/// The final message hash is
/// `H([shortstring("StarkNet Message"), domain_hash, account, struct_hash])`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::felt::FieldElement;
use crate::hash::{hash_on_elements, poseidon_hash};

mod domain;
mod hash;


pub use domain::{revision_of, StarknetDomain};
pub use hash::{byte_array_elements, encode_type, get_message_hash, get_struct_hash, get_type_hash};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    V0,
    V1,
}

impl Revision {
    pub fn domain_type(&self) -> &'static str {
        match self {
            Revision::V0 => "StarkNetDomain",
            Revision::V1 => "StarknetDomain",
        }
    }

    pub(crate) fn hash(&self, elements: &[FieldElement]) -> FieldElement {
        match self {
            Revision::V0 => hash_on_elements(elements),
            Revision::V1 => poseidon_hash(elements),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataField {
    pub name: String,
    pub r#type: String,
}

impl TypedDataField {
    pub fn new(name: &str, r#type: &str) -> Self {
        TypedDataField {
            name: name.to_string(),
            r#type: r#type.to_string(),
        }
    }
}

/// A typed data document as wallets exchange it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub types: BTreeMap<String, Vec<TypedDataField>>,
    pub primary_type: String,
    pub domain: Map<String, Value>,
    pub message: Map<String, Value>,
}

impl TypedData {
    /// Assemble a document, declaring the domain type for its revision.
    pub fn new(
        domain: &StarknetDomain,
        types: BTreeMap<String, Vec<TypedDataField>>,
        primary_type: &str,
        message: Map<String, Value>,
    ) -> Self {
        let mut types = types;
        types.insert(domain.revision.domain_type().to_string(), domain.type_fields());
        TypedData {
            types,
            primary_type: primary_type.to_string(),
            domain: domain.to_json(),
            message,
        }
    }

    pub fn revision(&self) -> Result<Revision> {
        revision_of(&self.domain)
    }

    pub fn message_hash(&self, account_address: &FieldElement) -> Result<FieldElement> {
        get_message_hash(self, account_address)
    }
}
