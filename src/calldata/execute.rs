//! Contract calls and the account `__execute__` multicall encoding.

use serde::{Deserialize, Serialize};

use super::compile::{compile, Calldata};
use super::value::RawArgs;
use crate::error::Result;
use crate::felt::FieldElement;
use crate::hash::get_selector_from_name;

/// One contract invocation with compiled calldata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call {
    pub to: FieldElement,
    pub selector: FieldElement,
    pub calldata: Calldata,
}

impl Call {
    /// Build a call from an entrypoint name, compiling `args`.
    pub fn new(to: FieldElement, entrypoint: &str, args: impl Into<RawArgs>) -> Result<Self> {
        Ok(Call {
            to,
            selector: get_selector_from_name(entrypoint),
            calldata: compile(args)?,
        })
    }
}

/// Cairo version of the account contract receiving the multicall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CairoVersion {
    #[serde(rename = "0")]
    Zero,
    #[default]
    #[serde(rename = "1")]
    One,
}

/// Encode calls as the argument list of the account's `__execute__`.
///
/// Cairo 1 accounts take `[n, (to, selector, len, ...calldata) * n]`. Cairo 0
/// accounts take call headers with offsets into one concatenated calldata
/// array: `[n, (to, selector, offset, len) * n, total, ...calldata]`.
pub fn execute_calldata(calls: &[Call], version: CairoVersion) -> Calldata {
    let mut out = vec![FieldElement::from(calls.len())];
    match version {
        CairoVersion::One => {
            for call in calls {
                out.push(call.to);
                out.push(call.selector);
                out.push(FieldElement::from(call.calldata.len()));
                out.extend_from_slice(&call.calldata);
            }
        }
        CairoVersion::Zero => {
            let mut offset = 0usize;
            for call in calls {
                out.push(call.to);
                out.push(call.selector);
                out.push(FieldElement::from(offset));
                out.push(FieldElement::from(call.calldata.len()));
                offset += call.calldata.len();
            }
            out.push(FieldElement::from(offset));
            for call in calls {
                out.extend_from_slice(&call.calldata);
            }
        }
    }
    Calldata::from_felts(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calldata::value::CairoValue;

    fn transfer(to: u64, amount: u64) -> Call {
        Call::new(
            FieldElement::from(to),
            "transfer",
            RawArgs::positional([CairoValue::Int(0xabc), CairoValue::Int(amount as u128), CairoValue::Int(0)]),
        )
        .unwrap()
    }

    fn approve() -> Call {
        Call::new(FieldElement::from(0x22u64), "approve", RawArgs::positional([CairoValue::Int(1)])).unwrap()
    }

    #[test]
    fn test_selector_from_entrypoint() {
        let call = transfer(0x11, 5);
        assert_eq!(call.selector, get_selector_from_name("transfer"));
        assert_eq!(call.calldata.len(), 3);
    }

    #[test]
    fn test_cairo1_multicall() {
        let calls = [transfer(0x11, 5), approve()];
        let encoded = execute_calldata(&calls, CairoVersion::One);

        let mut expected = vec![FieldElement::TWO, FieldElement::from(0x11u64), calls[0].selector, FieldElement::from(3u64)];
        expected.extend_from_slice(&calls[0].calldata);
        expected.extend([FieldElement::from(0x22u64), calls[1].selector, FieldElement::ONE, FieldElement::ONE]);
        assert_eq!(encoded.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_cairo0_multicall_offsets() {
        let calls = [transfer(0x11, 5), approve()];
        let encoded = execute_calldata(&calls, CairoVersion::Zero);

        assert_eq!(encoded[0], FieldElement::TWO);
        // second header starts at offset 3 with length 1
        assert_eq!(encoded[7], FieldElement::from(3u64));
        assert_eq!(encoded[8], FieldElement::ONE);
        // total calldata length, then the concatenation
        assert_eq!(encoded[9], FieldElement::from(4u64));
        assert_eq!(encoded.len(), 1 + 8 + 1 + 4);
        assert_eq!(encoded[13], FieldElement::ONE);
    }

    #[test]
    fn test_empty_multicall() {
        assert_eq!(execute_calldata(&[], CairoVersion::One).as_slice(), &[FieldElement::ZERO]);
    }
}
