/// Starknet domain separator for SNIP-12

use serde_json::{Map, Value};

use super::{Revision, TypedDataField};
use crate::error::{Result, TxError};

/// Domain separator to prevent replay attacks across different chains/applications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarknetDomain {
    pub name: String,
    pub version: String,
    pub chain_id: String,
    pub revision: Revision,
}

impl StarknetDomain {
    pub fn new(name: &str, version: &str, chain_id: &str, revision: Revision) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            chain_id: chain_id.to_string(),
            revision,
        }
    }

    /// Revision 1 domain for a chain id such as `SN_MAIN` or `SN_SEPOLIA`.
    pub fn active(name: &str, version: &str, chain_id: &str) -> Self {
        Self::new(name, version, chain_id, Revision::V1)
    }

    /// Field list of the domain type for this revision.
    pub fn type_fields(&self) -> Vec<TypedDataField> {
        let kind = match self.revision {
            Revision::V0 => "felt",
            Revision::V1 => "shortstring",
        };
        let mut fields = vec![
            TypedDataField::new("name", kind),
            TypedDataField::new("version", kind),
            TypedDataField::new("chainId", kind),
        ];
        if self.revision == Revision::V1 {
            fields.push(TypedDataField::new("revision", kind));
        }
        fields
    }

    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("version".to_string(), Value::String(self.version.clone()));
        map.insert("chainId".to_string(), Value::String(self.chain_id.clone()));
        if self.revision == Revision::V1 {
            map.insert("revision".to_string(), Value::String("1".to_string()));
        }
        map
    }
}

/// Read the revision off a domain object: `1` or `"1"` selects revision 1,
/// a missing value or `0` selects revision 0.
pub fn revision_of(domain: &Map<String, Value>) -> Result<Revision> {
    match domain.get("revision") {
        None | Some(Value::Null) => Ok(Revision::V0),
        Some(Value::Number(n)) if n.as_u64() == Some(0) => Ok(Revision::V0),
        Some(Value::Number(n)) if n.as_u64() == Some(1) => Ok(Revision::V1),
        Some(Value::String(s)) if s == "0" => Ok(Revision::V0),
        Some(Value::String(s)) if s == "1" => Ok(Revision::V1),
        Some(other) => Err(TxError::InvalidTypedData(format!(
            "unsupported revision {}",
            other
        ))),
    }
}
