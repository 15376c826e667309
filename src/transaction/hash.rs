//! Transaction hash element lists.
//!
//! Every builder returns its raw element list through a `*_elements`
//! function and folds it with [`hash_on_elements`]. Optional fields that are
//! `None` are left out of the list; they are never encoded as zero.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::version::{DataAvailabilityMode, HashLayout, ResourceBoundsMapping, TransactionVersion};
use crate::error::{Result, TxError};
use crate::felt::FieldElement;
use crate::hash::hash_on_elements;

/// Fee fields of a V3 transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct V3FeeFields {
    pub resource_bounds: ResourceBoundsMapping,
    #[serde(default)]
    pub tip: Option<FieldElement>,
    #[serde(default)]
    pub paymaster_data: Option<Vec<FieldElement>>,
    #[serde(default)]
    pub account_deployment_data: Option<Vec<FieldElement>>,
    #[serde(default)]
    pub nonce_data_availability_mode: Option<DataAvailabilityMode>,
    #[serde(default)]
    pub fee_data_availability_mode: Option<DataAvailabilityMode>,
}

impl V3FeeFields {
    fn append_to(&self, elements: &mut Vec<FieldElement>) {
        elements.extend(self.resource_bounds.elements());
        elements.extend(self.tip);
        if let Some(data) = &self.paymaster_data {
            elements.extend_from_slice(data);
        }
        if let Some(data) = &self.account_deployment_data {
            elements.extend_from_slice(data);
        }
        elements.extend(self.nonce_data_availability_mode.map(|m| m.to_felt()));
        elements.extend(self.fee_data_availability_mode.map(|m| m.to_felt()));
    }
}

/// Fee parameters, shaped by the transaction version.
///
/// `resource_bounds` selects the V3 shape. Without it, any other V3-only key
/// is rejected instead of being dropped, and `max_fee` never mixes with V3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FeeSettings {
    V3(V3FeeFields),
    Legacy { max_fee: Option<FieldElement> },
}

#[derive(Deserialize)]
struct RawFeeFields {
    #[serde(default)]
    max_fee: Option<FieldElement>,
    #[serde(default)]
    resource_bounds: Option<ResourceBoundsMapping>,
    #[serde(default)]
    tip: Option<FieldElement>,
    #[serde(default)]
    paymaster_data: Option<Vec<FieldElement>>,
    #[serde(default)]
    account_deployment_data: Option<Vec<FieldElement>>,
    #[serde(default)]
    nonce_data_availability_mode: Option<DataAvailabilityMode>,
    #[serde(default)]
    fee_data_availability_mode: Option<DataAvailabilityMode>,
}

impl RawFeeFields {
    fn v3_only_keys(&self) -> Vec<&'static str> {
        [
            ("tip", self.tip.is_some()),
            ("paymaster_data", self.paymaster_data.is_some()),
            ("account_deployment_data", self.account_deployment_data.is_some()),
            ("nonce_data_availability_mode", self.nonce_data_availability_mode.is_some()),
            ("fee_data_availability_mode", self.fee_data_availability_mode.is_some()),
        ]
        .into_iter()
        .filter_map(|(key, present)| present.then_some(key))
        .collect()
    }
}

impl<'de> Deserialize<'de> for FeeSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawFeeFields::deserialize(deserializer)?;
        match raw.resource_bounds {
            Some(_) if raw.max_fee.is_some() => Err(D::Error::custom(
                "max_fee cannot be combined with resource_bounds",
            )),
            Some(resource_bounds) => Ok(FeeSettings::V3(V3FeeFields {
                resource_bounds,
                tip: raw.tip,
                paymaster_data: raw.paymaster_data,
                account_deployment_data: raw.account_deployment_data,
                nonce_data_availability_mode: raw.nonce_data_availability_mode,
                fee_data_availability_mode: raw.fee_data_availability_mode,
            })),
            None => {
                let extra = raw.v3_only_keys();
                if extra.is_empty() {
                    Ok(FeeSettings::Legacy { max_fee: raw.max_fee })
                } else {
                    Err(D::Error::custom(format!(
                        "V3-only fields without resource_bounds: {}",
                        extra.join(", ")
                    )))
                }
            }
        }
    }
}

impl FeeSettings {
    pub fn legacy(max_fee: FieldElement) -> Self {
        FeeSettings::Legacy {
            max_fee: Some(max_fee),
        }
    }

    fn max_fee(&self) -> Option<&FieldElement> {
        match self {
            FeeSettings::Legacy { max_fee } => max_fee.as_ref(),
            FeeSettings::V3(_) => None,
        }
    }

    /// The fee shape must match the version's layout.
    pub fn check_version(&self, version: TransactionVersion) -> Result<()> {
        match (version.layout(), self) {
            (HashLayout::Legacy, FeeSettings::Legacy { .. }) | (HashLayout::V3, FeeSettings::V3(_)) => Ok(()),
            (HashLayout::Legacy, FeeSettings::V3(_)) => Err(TxError::InvalidDetails(format!(
                "version {} cannot carry resource bounds or other V3 fields",
                version
            ))),
            (HashLayout::V3, FeeSettings::Legacy { .. }) => Err(TxError::InvalidDetails(format!(
                "version {} requires resource bounds instead of a max fee",
                version
            ))),
        }
    }

    fn append_v3(&self, elements: &mut Vec<FieldElement>) {
        if let FeeSettings::V3(fields) = self {
            fields.append_to(elements);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeHashParams {
    pub sender_address: FieldElement,
    pub nonce: FieldElement,
    /// The account's `__execute__` calldata
    pub calldata: Vec<FieldElement>,
    pub version: TransactionVersion,
    pub chain_id: FieldElement,
    pub fee: FeeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareHashParams {
    pub sender_address: FieldElement,
    pub class_hash: FieldElement,
    /// Hashed for V3 only.
    pub compiled_class_hash: Option<FieldElement>,
    pub version: TransactionVersion,
    pub nonce: FieldElement,
    pub fee: FeeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployAccountHashParams {
    pub contract_address: FieldElement,
    pub class_hash: FieldElement,
    pub constructor_calldata: Vec<FieldElement>,
    pub salt: FieldElement,
    pub version: TransactionVersion,
    pub nonce: FieldElement,
    pub fee: FeeSettings,
}

/// `[sender, nonce, H(calldata), max_fee?, version, chain_id, ..v3]`
pub fn invoke_elements(params: &InvokeHashParams) -> Result<Vec<FieldElement>> {
    params.fee.check_version(params.version)?;

    let mut elements = vec![
        params.sender_address,
        params.nonce,
        hash_on_elements(&params.calldata),
    ];
    elements.extend(params.fee.max_fee());
    elements.push(params.version.to_felt());
    elements.push(params.chain_id);
    params.fee.append_v3(&mut elements);
    Ok(elements)
}

/// `[contract_address, class_hash, H(ctor_calldata), salt, version, max_fee?, nonce, ..v3]`
pub fn deploy_account_elements(params: &DeployAccountHashParams) -> Result<Vec<FieldElement>> {
    params.fee.check_version(params.version)?;

    let mut elements = vec![
        params.contract_address,
        params.class_hash,
        hash_on_elements(&params.constructor_calldata),
        params.salt,
        params.version.to_felt(),
    ];
    elements.extend(params.fee.max_fee());
    elements.push(params.nonce);
    params.fee.append_v3(&mut elements);
    Ok(elements)
}

/// `[sender, class_hash, compiled_class_hash?, version, max_fee?, nonce, ..v3]`
pub fn declare_elements(params: &DeclareHashParams) -> Result<Vec<FieldElement>> {
    params.fee.check_version(params.version)?;

    let mut elements = vec![params.sender_address, params.class_hash];
    if params.version.layout() == HashLayout::V3 {
        elements.extend(params.compiled_class_hash);
    }
    elements.push(params.version.to_felt());
    elements.extend(params.fee.max_fee());
    elements.push(params.nonce);
    params.fee.append_v3(&mut elements);
    Ok(elements)
}

fn finish(kind: &str, elements: &[FieldElement]) -> FieldElement {
    let hash = hash_on_elements(elements);
    debug!(kind, len = elements.len(), %hash, "computed transaction hash");
    hash
}

pub fn compute_invoke_transaction_hash(params: &InvokeHashParams) -> Result<FieldElement> {
    Ok(finish("invoke", &invoke_elements(params)?))
}

pub fn compute_declare_transaction_hash(params: &DeclareHashParams) -> Result<FieldElement> {
    Ok(finish("declare", &declare_elements(params)?))
}

pub fn compute_deploy_account_transaction_hash(params: &DeployAccountHashParams) -> Result<FieldElement> {
    Ok(finish("deploy_account", &deploy_account_elements(params)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::felt::StarknetChainId;
    use crate::transaction::version::ResourceBounds;

    fn felt(v: u64) -> FieldElement {
        FieldElement::from(v)
    }

    fn v3_fields() -> V3FeeFields {
        V3FeeFields {
            resource_bounds: ResourceBoundsMapping {
                l1_gas: ResourceBounds {
                    max_amount: felt(0x186a0),
                    max_price_per_unit: felt(0x5af3107a4000),
                },
                l2_gas: ResourceBounds::default(),
            },
            tip: None,
            paymaster_data: None,
            account_deployment_data: None,
            nonce_data_availability_mode: Some(DataAvailabilityMode::L1),
            fee_data_availability_mode: Some(DataAvailabilityMode::L1),
        }
    }

    fn invoke(version: TransactionVersion, fee: FeeSettings) -> InvokeHashParams {
        InvokeHashParams {
            sender_address: felt(0xabc),
            nonce: felt(7),
            calldata: vec![felt(1), felt(2)],
            version,
            chain_id: StarknetChainId::SN_SEPOLIA,
            fee,
        }
    }

    #[test]
    fn test_invoke_v1_layout() {
        let params = invoke(TransactionVersion::V1, FeeSettings::legacy(felt(1000)));
        let elements = invoke_elements(&params).unwrap();
        assert_eq!(
            elements,
            vec![
                felt(0xabc),
                felt(7),
                hash_on_elements(&[felt(1), felt(2)]),
                felt(1000),
                FieldElement::ONE,
                StarknetChainId::SN_SEPOLIA,
            ]
        );
        assert_eq!(
            compute_invoke_transaction_hash(&params).unwrap(),
            hash_on_elements(&elements)
        );
    }

    #[test]
    fn test_v1_never_hashes_v3_fields() {
        let params = invoke(TransactionVersion::V1, FeeSettings::legacy(felt(1000)));
        assert_eq!(invoke_elements(&params).unwrap().len(), 6);

        let mixed = invoke(TransactionVersion::V1, FeeSettings::V3(v3_fields()));
        assert!(matches!(invoke_elements(&mixed), Err(TxError::InvalidDetails(_))));
    }

    #[test]
    fn test_v3_requires_resource_bounds() {
        let params = invoke(TransactionVersion::V3, FeeSettings::legacy(felt(1)));
        assert!(matches!(
            compute_invoke_transaction_hash(&params),
            Err(TxError::InvalidDetails(_))
        ));
    }

    #[test]
    fn test_invoke_v3_layout() {
        let mut fields = v3_fields();
        fields.tip = Some(felt(9));
        fields.paymaster_data = Some(vec![felt(0x11), felt(0x12)]);
        fields.account_deployment_data = Some(vec![felt(0x21)]);
        fields.fee_data_availability_mode = Some(DataAvailabilityMode::L2);
        let params = invoke(TransactionVersion::V3, FeeSettings::V3(fields));

        let elements = invoke_elements(&params).unwrap();
        assert_eq!(elements.len(), 5 + 4 + 1 + 2 + 1 + 2);
        assert_eq!(elements[3], FieldElement::from(3u64));
        assert_eq!(elements[5], felt(0x186a0));
        assert_eq!(elements[6], felt(0x5af3107a4000));
        assert_eq!(elements[9], felt(9));
        assert_eq!(&elements[10..12], &[felt(0x11), felt(0x12)]);
        assert_eq!(elements[12], felt(0x21));
        assert_eq!(elements[13], FieldElement::ZERO);
        assert_eq!(elements[14], FieldElement::ONE);
    }

    #[test]
    fn test_absent_differs_from_zero() {
        let base = invoke(TransactionVersion::V3, FeeSettings::V3(v3_fields()));
        let base_hash = compute_invoke_transaction_hash(&base).unwrap();

        let mut with_tip = v3_fields();
        with_tip.tip = Some(FieldElement::ZERO);
        let tipped = invoke(TransactionVersion::V3, FeeSettings::V3(with_tip));
        assert_ne!(compute_invoke_transaction_hash(&tipped).unwrap(), base_hash);

        let mut with_paymaster = v3_fields();
        with_paymaster.paymaster_data = Some(vec![FieldElement::ZERO]);
        let paymaster = invoke(TransactionVersion::V3, FeeSettings::V3(with_paymaster));
        assert_ne!(compute_invoke_transaction_hash(&paymaster).unwrap(), base_hash);

        let mut without_mode = v3_fields();
        without_mode.nonce_data_availability_mode = None;
        let no_mode = invoke(TransactionVersion::V3, FeeSettings::V3(without_mode));
        assert_ne!(compute_invoke_transaction_hash(&no_mode).unwrap(), base_hash);

        let legacy = invoke(TransactionVersion::V1, FeeSettings::Legacy { max_fee: None });
        let legacy_zero = invoke(TransactionVersion::V1, FeeSettings::legacy(FieldElement::ZERO));
        assert_ne!(
            compute_invoke_transaction_hash(&legacy).unwrap(),
            compute_invoke_transaction_hash(&legacy_zero).unwrap()
        );
    }

    #[test]
    fn test_query_version_hashes_its_own_value() {
        let real = invoke(TransactionVersion::V3, FeeSettings::V3(v3_fields()));
        let query = invoke(TransactionVersion::QueryV3, FeeSettings::V3(v3_fields()));

        let real_elements = invoke_elements(&real).unwrap();
        let query_elements = invoke_elements(&query).unwrap();
        assert_eq!(real_elements.len(), query_elements.len());
        assert_eq!(query_elements[3], TransactionVersion::QueryV3.to_felt());
        assert_ne!(
            compute_invoke_transaction_hash(&real).unwrap(),
            compute_invoke_transaction_hash(&query).unwrap()
        );
    }

    #[test]
    fn test_declare_layouts() {
        let v2 = DeclareHashParams {
            sender_address: felt(0xabc),
            class_hash: felt(0xc1a55),
            compiled_class_hash: Some(felt(0xcc)),
            version: TransactionVersion::V2,
            nonce: felt(1),
            fee: FeeSettings::legacy(felt(50)),
        };
        assert_eq!(
            declare_elements(&v2).unwrap(),
            vec![felt(0xabc), felt(0xc1a55), FieldElement::TWO, felt(50), felt(1)]
        );

        let v3 = DeclareHashParams {
            version: TransactionVersion::V3,
            fee: FeeSettings::V3(v3_fields()),
            ..v2.clone()
        };
        let elements = declare_elements(&v3).unwrap();
        assert_eq!(&elements[..5], &[felt(0xabc), felt(0xc1a55), felt(0xcc), felt(3), felt(1)]);
        assert_eq!(elements.len(), 5 + 4 + 2);

        let without_compiled = DeclareHashParams {
            compiled_class_hash: None,
            ..v3
        };
        assert_eq!(declare_elements(&without_compiled).unwrap().len(), 4 + 4 + 2);
    }

    #[test]
    fn test_deploy_account_layout() {
        let params = DeployAccountHashParams {
            contract_address: felt(0xadd),
            class_hash: felt(0xc1a55),
            constructor_calldata: vec![felt(0x5e)],
            salt: felt(0x5a17),
            version: TransactionVersion::V1,
            nonce: FieldElement::ZERO,
            fee: FeeSettings::legacy(felt(99)),
        };
        assert_eq!(
            deploy_account_elements(&params).unwrap(),
            vec![
                felt(0xadd),
                felt(0xc1a55),
                hash_on_elements(&[felt(0x5e)]),
                felt(0x5a17),
                FieldElement::ONE,
                felt(99),
                FieldElement::ZERO,
            ]
        );
    }

    #[test]
    fn test_fee_settings_deserialize_by_shape() {
        let legacy: FeeSettings = serde_json::from_str(r#"{"max_fee": "0x10"}"#).unwrap();
        assert_eq!(legacy, FeeSettings::legacy(felt(16)));

        let v3: FeeSettings = serde_json::from_str(
            r#"{
                "resource_bounds": {
                    "l1_gas": {"max_amount": "0x1", "max_price_per_unit": "0x2"},
                    "l2_gas": {"max_amount": "0x0", "max_price_per_unit": "0x0"}
                },
                "nonce_data_availability_mode": "L1",
                "fee_data_availability_mode": "L1"
            }"#,
        )
        .unwrap();
        assert!(matches!(v3, FeeSettings::V3(_)));
    }

    #[test]
    fn test_legacy_shape_rejects_v3_only_keys() {
        for extra in [
            r#""tip": "0x5""#,
            r#""paymaster_data": ["0x7"]"#,
            r#""account_deployment_data": []"#,
            r#""nonce_data_availability_mode": "L2""#,
            r#""fee_data_availability_mode": "L1""#,
        ] {
            let json = format!(r#"{{"max_fee": "0x100", {}}}"#, extra);
            let err = serde_json::from_str::<FeeSettings>(&json).unwrap_err();
            assert!(err.to_string().contains("V3-only"), "{}", err);
        }

        let mixed = r#"{
            "max_fee": "0x1",
            "resource_bounds": {
                "l1_gas": {"max_amount": "0x1", "max_price_per_unit": "0x2"},
                "l2_gas": {"max_amount": "0x0", "max_price_per_unit": "0x0"}
            }
        }"#;
        assert!(serde_json::from_str::<FeeSettings>(mixed).is_err());

        let explicit_null: FeeSettings = serde_json::from_str(r#"{"max_fee": "0x1", "tip": null}"#).unwrap();
        assert_eq!(explicit_null, FeeSettings::legacy(felt(1)));
    }
}
