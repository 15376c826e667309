//! Transaction signing CLI
//!
//! Reads a JSON signing request from a file argument (or stdin), signs it with
//! the key configured in the environment and prints the hash and signature.
//!
//! Request shapes:
//!   {"kind": "invoke", "details": {...}, "calls": [{"to", "entrypoint", "calldata"}]}
//!   {"kind": "declare", "details": {...}}
//!   {"kind": "deploy_account", "details": {...}}
//!   {"kind": "message", "account_address": "0x..", "typed_data": {...}}
//!
//! A `details` object without `chain_id` uses `STARKNET_CHAIN_ID`.
//!
//! Usage:
//!   cargo run --bin sign_transaction -- request.json

use std::env;
use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use starknet_tx_signer::{
    init_logging, Call, DeclareSignerDetails, DeployAccountSignerDetails, FieldElement,
    InvocationsSignerDetails, RawArgs, Signer, SignerConfig, TypedData,
};
use tracing::info;

#[derive(Deserialize)]
struct CallRequest {
    to: FieldElement,
    entrypoint: String,
    #[serde(default)]
    calldata: Value,
}

impl CallRequest {
    fn into_call(self) -> Result<Call> {
        let args = match &self.calldata {
            Value::Null => RawArgs::default(),
            value => RawArgs::from_json(value)?,
        };
        Call::new(self.to, &self.entrypoint, args)
            .with_context(|| format!("Failed to compile calldata for '{}'", self.entrypoint))
    }
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SignRequest {
    Invoke {
        details: Map<String, Value>,
        calls: Vec<CallRequest>,
    },
    Declare {
        details: Map<String, Value>,
    },
    DeployAccount {
        details: Map<String, Value>,
    },
    Message {
        account_address: FieldElement,
        typed_data: TypedData,
    },
}

fn read_request() -> Result<String> {
    match env::args().nth(1) {
        Some(path) => fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path)),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read request from stdin")?;
            Ok(buffer)
        }
    }
}

fn with_chain_id<T: serde::de::DeserializeOwned>(
    mut details: Map<String, Value>,
    chain_id: FieldElement,
) -> Result<T> {
    details
        .entry("chain_id")
        .or_insert_with(|| Value::String(chain_id.to_hex()));
    serde_json::from_value(Value::Object(details)).context("Invalid signer details")
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = SignerConfig::from_env().context("Failed to load signer configuration")?;
    let chain_id = config.chain_id()?;
    let signer = config.build_signer()?;

    let request: SignRequest =
        serde_json::from_str(&read_request()?).context("Failed to parse signing request")?;

    let output = match request {
        SignRequest::Invoke { details, calls } => {
            let details: InvocationsSignerDetails = with_chain_id(details, chain_id)?;
            let calls = calls
                .into_iter()
                .map(CallRequest::into_call)
                .collect::<Result<Vec<_>>>()?;
            let hash = details.transaction_hash(&calls)?;
            let signature = signer.sign_transaction(&calls, &details).await?;
            json!({ "transaction_hash": hash, "signature": signature })
        }
        SignRequest::Declare { details } => {
            let details: DeclareSignerDetails = with_chain_id(details, chain_id)?;
            let hash = details.transaction_hash()?;
            let signature = signer.sign_declare_transaction(&details).await?;
            json!({ "transaction_hash": hash, "signature": signature })
        }
        SignRequest::DeployAccount { details } => {
            let details: DeployAccountSignerDetails = with_chain_id(details, chain_id)?;
            let hash = details.transaction_hash()?;
            let signature = signer.sign_deploy_account_transaction(&details).await?;
            json!({ "transaction_hash": hash, "signature": signature })
        }
        SignRequest::Message {
            account_address,
            typed_data,
        } => {
            let hash = typed_data.message_hash(&account_address)?;
            let signature = signer.sign_message(&typed_data, &account_address).await?;
            json!({ "message_hash": hash, "signature": signature })
        }
    };

    info!("Signed with public key {}", signer.get_public_key().await?);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
