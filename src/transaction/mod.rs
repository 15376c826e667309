//! Version-aware transaction hashes and contract address derivation.

pub mod address;
pub mod hash;
pub mod version;

pub use address::{compute_contract_address, ADDR_BOUND, CONTRACT_ADDRESS_PREFIX};
pub use hash::{
    compute_declare_transaction_hash, compute_deploy_account_transaction_hash,
    compute_invoke_transaction_hash, declare_elements, deploy_account_elements, invoke_elements,
    DeclareHashParams, DeployAccountHashParams, FeeSettings, InvokeHashParams, V3FeeFields,
};
pub use version::{
    DataAvailabilityMode, HashLayout, ResourceBounds, ResourceBoundsMapping, TransactionVersion,
};
