use std::sync::LazyLock;

use num_bigint::BigUint;
use tracing::debug;

use crate::calldata::{compile, RawArgs};
use crate::error::Result;
use crate::felt::FieldElement;
use crate::hash::hash_on_elements;

/// `encode_short_string("STARKNET_CONTRACT_ADDRESS")`
pub const CONTRACT_ADDRESS_PREFIX: FieldElement =
    FieldElement::from_hex_unchecked("0x535441524b4e45545f434f4e54524143545f41444452455353");

/// Addresses live in `[0, 2^251 - 256)`.
pub static ADDR_BOUND: LazyLock<BigUint> =
    LazyLock::new(|| (BigUint::from(1u8) << 251) - BigUint::from(256u16));

/// Address of a contract deployed from `class_hash`.
///
/// Constructor arguments are compiled first; flat felts pass through as is.
pub fn compute_contract_address(
    salt: &FieldElement,
    class_hash: &FieldElement,
    constructor_calldata: impl Into<RawArgs>,
    deployer_address: &FieldElement,
) -> Result<FieldElement> {
    let calldata = compile(constructor_calldata)?;
    let hash = hash_on_elements(&[
        CONTRACT_ADDRESS_PREFIX,
        *deployer_address,
        *salt,
        *class_hash,
        hash_on_elements(&calldata),
    ]);
    let address = FieldElement::reduce(&(hash.to_biguint() % &*ADDR_BOUND));
    debug!(%address, %class_hash, "computed contract address");
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calldata::CairoValue;
    use rstest::rstest;

    const ACCOUNT_CLASS_HASH: &str = "0x5c478ee27f2112411f86f207605b2e2c58cdb647bac0df27f660ef2252359c6";

    fn hex(s: &str) -> FieldElement {
        FieldElement::from_hex(s).unwrap()
    }

    #[test]
    fn test_prefix_is_short_string() {
        assert_eq!(
            FieldElement::from_short_string("STARKNET_CONTRACT_ADDRESS").unwrap(),
            CONTRACT_ADDRESS_PREFIX
        );
    }

    #[test]
    fn test_reference_address_empty_calldata() {
        let address = compute_contract_address(
            &FieldElement::ZERO,
            &hex(ACCOUNT_CLASS_HASH),
            Vec::<FieldElement>::new(),
            &FieldElement::ZERO,
        )
        .unwrap();
        assert_eq!(
            address.to_hex(),
            "0x38f8ab9be23cec9f7dee8636e99ad7f19b369a27dac9156882f4e252e722139"
        );
    }

    #[rstest]
    #[case("0x0", ACCOUNT_CLASS_HASH, vec![], "0x0")]
    #[case("0x5a17", ACCOUNT_CLASS_HASH, vec![1, 2], "0x0")]
    #[case("0x7", "0x1", vec![0x10], "0x41a78e741e5af2fec34b695679bc6891742439f7afb8484ecd7766661ad02bf")]
    fn test_matches_reference_implementation(
        #[case] salt: &str,
        #[case] class_hash: &str,
        #[case] calldata: Vec<u64>,
        #[case] deployer: &str,
    ) {
        let calldata: Vec<FieldElement> = calldata.into_iter().map(FieldElement::from).collect();
        let ours = compute_contract_address(&hex(salt), &hex(class_hash), calldata.clone(), &hex(deployer)).unwrap();

        let raw_calldata: Vec<_> = calldata.iter().map(|f| f.into_felt()).collect();
        let reference = starknet_core::utils::get_contract_address(
            hex(salt).into_felt(),
            hex(class_hash).into_felt(),
            &raw_calldata,
            hex(deployer).into_felt(),
        );
        assert_eq!(ours.into_felt(), reference);
    }

    #[test]
    fn test_address_below_bound() {
        let address = compute_contract_address(
            &hex("0x5a17"),
            &hex(ACCOUNT_CLASS_HASH),
            vec![FieldElement::ONE, FieldElement::TWO],
            &FieldElement::ZERO,
        )
        .unwrap();
        assert_eq!(
            address.to_hex(),
            "0x58197c540354ba9fc4769d2912a7c1b813b383f12801b069cf6e2d9872098bd"
        );
        assert!(address.to_biguint() < *ADDR_BOUND);
    }

    #[test]
    fn test_constructor_arguments_are_compiled() {
        let public_key = hex("0x4a1e");
        let named = RawArgs::named([("public_key", CairoValue::Felt(public_key))]);
        let flat = vec![public_key];
        let salt = hex("0x5a17");
        let class_hash = hex(ACCOUNT_CLASS_HASH);

        assert_eq!(
            compute_contract_address(&salt, &class_hash, named, &FieldElement::ZERO).unwrap(),
            compute_contract_address(&salt, &class_hash, flat, &FieldElement::ZERO).unwrap()
        );

        let nested = RawArgs::named([(
            "signers",
            CairoValue::Array(vec![CairoValue::Int(1), CairoValue::Int(2)]),
        )]);
        let prefixed = vec![FieldElement::TWO, FieldElement::ONE, FieldElement::TWO];
        assert_eq!(
            compute_contract_address(&salt, &class_hash, nested, &FieldElement::ZERO).unwrap(),
            compute_contract_address(&salt, &class_hash, prefixed, &FieldElement::ZERO).unwrap()
        );
    }

    #[test]
    fn test_uncompilable_constructor_argument() {
        let bad = RawArgs::named([("note", CairoValue::Text("x".repeat(40)))]);
        assert!(compute_contract_address(&FieldElement::ONE, &FieldElement::ONE, bad, &FieldElement::ZERO).is_err());
    }
}
