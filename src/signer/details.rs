//! Version-tagged signer inputs.
//!
//! Each record converts into the matching hash-builder parameters after a
//! consistency check between its `version` and its fee fields.

use serde::{Deserialize, Serialize};

use crate::calldata::{compile, execute_calldata, CairoVersion, Call, Calldata, RawArgs};
use crate::error::{Result, TxError};
use crate::felt::FieldElement;
use crate::transaction::{
    compute_declare_transaction_hash, compute_deploy_account_transaction_hash,
    compute_invoke_transaction_hash, DeclareHashParams, DeployAccountHashParams, FeeSettings,
    InvokeHashParams, TransactionVersion,
};

/// Check that the fee fields fit the version.
///
/// Legacy versions need a `max_fee`; V3 needs both data availability modes.
pub fn validate_fee_settings(version: TransactionVersion, fee: &FeeSettings) -> Result<()> {
    fee.check_version(version)?;
    match fee {
        FeeSettings::Legacy { max_fee: None } => Err(TxError::InvalidDetails(format!(
            "version {} requires max_fee",
            version
        ))),
        FeeSettings::V3(fields)
            if fields.nonce_data_availability_mode.is_none()
                || fields.fee_data_availability_mode.is_none() =>
        {
            Err(TxError::InvalidDetails(format!(
                "version {} requires nonce and fee data availability modes",
                version
            )))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationsSignerDetails {
    pub wallet_address: FieldElement,
    pub nonce: FieldElement,
    pub chain_id: FieldElement,
    pub version: TransactionVersion,
    #[serde(default)]
    pub cairo_version: CairoVersion,
    #[serde(flatten)]
    pub fee: FeeSettings,
}

impl InvocationsSignerDetails {
    pub fn hash_params(&self, calls: &[Call]) -> Result<InvokeHashParams> {
        validate_fee_settings(self.version, &self.fee)?;
        Ok(InvokeHashParams {
            sender_address: self.wallet_address,
            nonce: self.nonce,
            calldata: execute_calldata(calls, self.cairo_version).into_vec(),
            version: self.version,
            chain_id: self.chain_id,
            fee: self.fee.clone(),
        })
    }

    pub fn transaction_hash(&self, calls: &[Call]) -> Result<FieldElement> {
        compute_invoke_transaction_hash(&self.hash_params(calls)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclareSignerDetails {
    pub sender_address: FieldElement,
    pub class_hash: FieldElement,
    #[serde(default)]
    pub compiled_class_hash: Option<FieldElement>,
    pub nonce: FieldElement,
    pub chain_id: FieldElement,
    pub version: TransactionVersion,
    #[serde(flatten)]
    pub fee: FeeSettings,
}

impl DeclareSignerDetails {
    pub fn hash_params(&self) -> Result<DeclareHashParams> {
        validate_fee_settings(self.version, &self.fee)?;
        Ok(DeclareHashParams {
            sender_address: self.sender_address,
            class_hash: self.class_hash,
            compiled_class_hash: self.compiled_class_hash,
            version: self.version,
            nonce: self.nonce,
            fee: self.fee.clone(),
        })
    }

    pub fn transaction_hash(&self) -> Result<FieldElement> {
        compute_declare_transaction_hash(&self.hash_params()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployAccountSignerDetails {
    pub contract_address: FieldElement,
    pub class_hash: FieldElement,
    /// Compiled on deserialization and in [`Self::with_constructor_args`].
    #[serde(default)]
    pub constructor_calldata: Calldata,
    pub address_salt: FieldElement,
    pub nonce: FieldElement,
    pub chain_id: FieldElement,
    pub version: TransactionVersion,
    #[serde(flatten)]
    pub fee: FeeSettings,
}

impl DeployAccountSignerDetails {
    /// Replace the constructor calldata with compiled `args`.
    pub fn with_constructor_args(mut self, args: impl Into<RawArgs>) -> Result<Self> {
        self.constructor_calldata = compile(args)?;
        Ok(self)
    }

    pub fn hash_params(&self) -> Result<DeployAccountHashParams> {
        validate_fee_settings(self.version, &self.fee)?;
        Ok(DeployAccountHashParams {
            contract_address: self.contract_address,
            class_hash: self.class_hash,
            constructor_calldata: self.constructor_calldata.to_vec(),
            salt: self.address_salt,
            version: self.version,
            nonce: self.nonce,
            fee: self.fee.clone(),
        })
    }

    pub fn transaction_hash(&self) -> Result<FieldElement> {
        compute_deploy_account_transaction_hash(&self.hash_params()?)
    }
}
