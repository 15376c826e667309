//! Hash chains over field elements.
//!
//! [`HashChain`] folds elements through the Pedersen compression starting
//! from zero and closes with the element count, which is the commitment the
//! network uses for calldata, transaction fields and contract addresses.

use sha3::{Digest, Keccak256};
use starknet_crypto::{poseidon_hash_many, Felt};
use tracing::trace;

use crate::curve::StarkCurve;
use crate::felt::FieldElement;

/// Incremental Pedersen hash chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashChain {
    current_hash: FieldElement,
    length: usize,
}

impl HashChain {
    pub fn new() -> HashChain {
        HashChain {
            current_hash: FieldElement::ZERO,
            length: 0,
        }
    }

    // Chains a felt to the hash chain.
    pub fn chain(self, felt: &FieldElement) -> Self {
        let new_hash = StarkCurve.compress(&self.current_hash, felt);
        HashChain {
            current_hash: new_hash,
            length: self.length + 1,
        }
    }

    // Chains a felt only when it is present.
    pub fn chain_if(self, felt: Option<&FieldElement>) -> Self {
        match felt {
            Some(felt) => self.chain(felt),
            None => self,
        }
    }

    pub fn chain_iter<'a>(self, felts: impl Iterator<Item = &'a FieldElement>) -> Self {
        felts.fold(self, |chain, felt| chain.chain(felt))
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Close the chain by compressing the element count.
    pub fn finish(self) -> FieldElement {
        StarkCurve.compress(&self.current_hash, &FieldElement::from(self.length))
    }
}

/// `H(...H(H(0, e0), e1)..., len)`.
pub fn hash_on_elements(elements: &[FieldElement]) -> FieldElement {
    let hash = HashChain::new().chain_iter(elements.iter()).finish();
    trace!(len = elements.len(), %hash, "hash on elements");
    hash
}

/// Poseidon over a sequence, as used by revision 1 typed data.
pub fn poseidon_hash(elements: &[FieldElement]) -> FieldElement {
    let felts: Vec<Felt> = elements.iter().map(|e| e.into_felt()).collect();
    FieldElement::from(poseidon_hash_many(&felts))
}

/// Keccak-256 truncated to 250 bits.
pub fn starknet_keccak(input: &[u8]) -> FieldElement {
    let mut hasher = Keccak256::new();
    hasher.update(input);
    let result = hasher.finalize();

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    bytes[0] &= 0x03;
    FieldElement::from_bytes_be(&bytes)
}

/// Entrypoint selector for a function name.
pub fn get_selector_from_name(name: &str) -> FieldElement {
    match name {
        "__default__" | "__l1_default__" => FieldElement::ZERO,
        _ => starknet_keccak(name.as_bytes()),
    }
}
