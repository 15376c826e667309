pub mod arith;
pub mod calldata;
pub mod config;
pub mod curve;
pub mod error;
pub mod felt;
pub mod hash;
pub mod signature;
pub mod signer;
pub mod snip12;
pub mod transaction;

// Re-export commonly used types
pub use calldata::{compile, execute_calldata, CairoValue, CairoVersion, Call, Calldata, CustomEnum, RawArgs};
pub use config::{SignerConfig, SignerKind};
pub use curve::{AffinePoint, CurveParams, RecoverableSignature, Secp256k1Curve, StarkCurve, StarkSignature};
pub use error::{Result, TxError};
pub use felt::{FieldElement, StarknetChainId, Uint256};
pub use hash::{get_selector_from_name, hash_on_elements, poseidon_hash, starknet_keccak, HashChain};
pub use signature::{Secp256k1Signature, Signature};
pub use signer::{
    DeclareSignerDetails, DeployAccountSignerDetails, EthSigner, InvocationsSignerDetails, Signer,
    StarkSigner, TimeoutSigner,
};
pub use snip12::{Revision, StarknetDomain, TypedData, TypedDataField};
pub use transaction::{
    compute_contract_address, compute_declare_transaction_hash, compute_deploy_account_transaction_hash,
    compute_invoke_transaction_hash, DataAvailabilityMode, FeeSettings, ResourceBounds, ResourceBoundsMapping,
    TransactionVersion, V3FeeFields,
};

/// Initialize logging for the library
///
/// `RUST_LOG` selects the level when set; otherwise `info`.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}
