//! Minimal ABI model and word codec for the module token interface.
//!
//! The bridge only ever talks to its own embedded token contracts, whose
//! interface uses a small set of parameter types. This module parses the
//! embedded JSON ABI, derives 4-byte method selectors and 32-byte event ids
//! from canonical signatures, and encodes/decodes the standard 32-byte word
//! layout:
//!
//! - static types occupy one word (`address` right-aligned in 20 bytes,
//!   unsigned integers big-endian left-padded, `bool` as 0/1)
//! - `string` is dynamic: the head word holds the byte offset of the tail,
//!   the tail holds a length word followed by the padded bytes

use cosmwasm_std::{StdError, StdResult};
use serde::Deserialize;

use crate::address::EvmAddress;
use crate::hash::keccak256;

const WORD: usize = 32;

// ============================================================================
// Types and values
// ============================================================================

/// Parameter types understood by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiType {
    Address,
    Uint256,
    Uint8,
    Bool,
    String,
}

impl AbiType {
    pub fn parse(s: &str) -> StdResult<Self> {
        match s {
            "address" => Ok(Self::Address),
            "uint256" => Ok(Self::Uint256),
            "uint8" => Ok(Self::Uint8),
            "bool" => Ok(Self::Bool),
            "string" => Ok(Self::String),
            other => Err(StdError::generic_err(format!(
                "unsupported ABI type: {}",
                other
            ))),
        }
    }

    pub fn canonical(&self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Uint256 => "uint256",
            Self::Uint8 => "uint8",
            Self::Bool => "bool",
            Self::String => "string",
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::String)
    }
}

/// A decoded or to-be-encoded ABI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(EvmAddress),
    /// `uint256` restricted to the u128 range; wider values are a decode error
    Uint(u128),
    Uint8(u8),
    Bool(bool),
    String(String),
}

impl AbiValue {
    pub fn kind(&self) -> AbiType {
        match self {
            Self::Address(_) => AbiType::Address,
            Self::Uint(_) => AbiType::Uint256,
            Self::Uint8(_) => AbiType::Uint8,
            Self::Bool(_) => AbiType::Bool,
            Self::String(_) => AbiType::String,
        }
    }

    pub fn as_address(&self) -> StdResult<EvmAddress> {
        match self {
            Self::Address(a) => Ok(*a),
            other => Err(type_mismatch("address", other)),
        }
    }

    pub fn as_uint(&self) -> StdResult<u128> {
        match self {
            Self::Uint(v) => Ok(*v),
            other => Err(type_mismatch("uint256", other)),
        }
    }

    pub fn as_uint8(&self) -> StdResult<u8> {
        match self {
            Self::Uint8(v) => Ok(*v),
            other => Err(type_mismatch("uint8", other)),
        }
    }

    pub fn as_string(&self) -> StdResult<&str> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(type_mismatch("string", other)),
        }
    }
}

fn type_mismatch(expected: &str, got: &AbiValue) -> StdError {
    StdError::generic_err(format!(
        "ABI type mismatch: expected {}, got {}",
        expected,
        got.kind().canonical()
    ))
}

// ============================================================================
// Word codec
// ============================================================================

/// Encode values with the standard head/tail layout
pub fn encode_values(values: &[AbiValue]) -> Vec<u8> {
    let head_size = values.len() * WORD;
    let mut head = Vec::with_capacity(head_size);
    let mut tail: Vec<u8> = Vec::new();

    for value in values {
        match value {
            AbiValue::Address(addr) => {
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(addr.as_bytes());
                head.extend_from_slice(&word);
            }
            AbiValue::Uint(v) => {
                let mut word = [0u8; WORD];
                word[16..].copy_from_slice(&v.to_be_bytes());
                head.extend_from_slice(&word);
            }
            AbiValue::Uint8(v) => {
                let mut word = [0u8; WORD];
                word[31] = *v;
                head.extend_from_slice(&word);
            }
            AbiValue::Bool(v) => {
                let mut word = [0u8; WORD];
                word[31] = u8::from(*v);
                head.extend_from_slice(&word);
            }
            AbiValue::String(s) => {
                let offset = head_size + tail.len();
                let mut word = [0u8; WORD];
                word[24..].copy_from_slice(&(offset as u64).to_be_bytes());
                head.extend_from_slice(&word);

                let bytes = s.as_bytes();
                let mut len_word = [0u8; WORD];
                len_word[24..].copy_from_slice(&(bytes.len() as u64).to_be_bytes());
                tail.extend_from_slice(&len_word);
                tail.extend_from_slice(bytes);
                // pad to a word boundary
                let rem = bytes.len() % WORD;
                if rem != 0 {
                    tail.extend(std::iter::repeat(0u8).take(WORD - rem));
                }
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Decode values of the given types from encoded data.
///
/// Rejects truncated data, out-of-bounds offsets, over-range integers and
/// invalid UTF-8, so that a log with a colliding signature from an unrelated
/// contract surfaces as a decode error rather than garbage values.
pub fn decode_values(types: &[AbiType], data: &[u8]) -> StdResult<Vec<AbiValue>> {
    if data.len() < types.len() * WORD {
        return Err(StdError::generic_err(format!(
            "ABI data too short: expected at least {} bytes, got {}",
            types.len() * WORD,
            data.len()
        )));
    }

    let mut values = Vec::with_capacity(types.len());
    for (i, ty) in types.iter().enumerate() {
        let word = &data[i * WORD..(i + 1) * WORD];
        let value = match ty {
            AbiType::Address => {
                if word[..12].iter().any(|b| *b != 0) {
                    return Err(StdError::generic_err("address word has non-zero padding"));
                }
                let mut raw = [0u8; 20];
                raw.copy_from_slice(&word[12..]);
                AbiValue::Address(EvmAddress::new(raw))
            }
            AbiType::Uint256 => AbiValue::Uint(decode_u128_word(word)?),
            AbiType::Uint8 => {
                if word[..31].iter().any(|b| *b != 0) {
                    return Err(StdError::generic_err("uint8 value out of range"));
                }
                AbiValue::Uint8(word[31])
            }
            AbiType::Bool => {
                if word[..31].iter().any(|b| *b != 0) || word[31] > 1 {
                    return Err(StdError::generic_err("invalid bool word"));
                }
                AbiValue::Bool(word[31] == 1)
            }
            AbiType::String => {
                let offset = decode_usize_word(word)?;
                AbiValue::String(decode_string_tail(data, offset)?)
            }
        };
        values.push(value);
    }
    Ok(values)
}

fn decode_u128_word(word: &[u8]) -> StdResult<u128> {
    if word[..16].iter().any(|b| *b != 0) {
        return Err(StdError::generic_err("uint256 value exceeds 128 bits"));
    }
    let mut be = [0u8; 16];
    be.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(be))
}

fn decode_usize_word(word: &[u8]) -> StdResult<usize> {
    if word[..24].iter().any(|b| *b != 0) {
        return Err(StdError::generic_err("offset word out of range"));
    }
    let mut be = [0u8; 8];
    be.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(be))
        .map_err(|_| StdError::generic_err("offset word out of range"))
}

fn decode_string_tail(data: &[u8], offset: usize) -> StdResult<String> {
    let len_end = offset
        .checked_add(WORD)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| StdError::generic_err("string offset out of bounds"))?;
    let len = decode_usize_word(&data[offset..len_end])?;
    let end = len_end
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| StdError::generic_err("string length out of bounds"))?;
    String::from_utf8(data[len_end..end].to_vec())
        .map_err(|_| StdError::generic_err("string is not valid UTF-8"))
}

// ============================================================================
// ABI model
// ============================================================================

/// A single parameter of a function, constructor or event
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub indexed: bool,
}

/// A single ABI entry (function, constructor or event)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
}

/// Parsed contract ABI
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Abi(pub Vec<AbiEntry>);

impl Abi {
    fn entry(&self, kind: &str, name: &str) -> StdResult<&AbiEntry> {
        self.0
            .iter()
            .find(|e| e.kind == kind && e.name == name)
            .ok_or_else(|| StdError::generic_err(format!("ABI has no {} named {}", kind, name)))
    }

    fn constructor(&self) -> Option<&AbiEntry> {
        self.0.iter().find(|e| e.kind == "constructor")
    }

    /// Canonical signature of an entry, e.g. `transfer(address,uint256)`
    pub fn canonical_signature(entry: &AbiEntry) -> String {
        let params: Vec<&str> = entry.inputs.iter().map(|p| p.kind.as_str()).collect();
        format!("{}({})", entry.name, params.join(","))
    }

    /// 4-byte selector of a function
    pub fn selector(&self, name: &str) -> StdResult<[u8; 4]> {
        let entry = self.entry("function", name)?;
        let hash = keccak256(Self::canonical_signature(entry).as_bytes());
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&hash[..4]);
        Ok(selector)
    }

    /// 32-byte event id (the first topic of an emitted log)
    pub fn event_id(&self, name: &str) -> StdResult<[u8; 32]> {
        let entry = self.entry("event", name)?;
        Ok(keccak256(Self::canonical_signature(entry).as_bytes()))
    }

    /// Encode a method call: selector followed by encoded arguments
    pub fn encode_call(&self, name: &str, args: &[AbiValue]) -> StdResult<Vec<u8>> {
        let entry = self.entry("function", name)?;
        check_args(entry, args)?;
        let mut calldata = self.selector(name)?.to_vec();
        calldata.extend_from_slice(&encode_values(args));
        Ok(calldata)
    }

    /// Encode constructor arguments (appended to the deployment bytecode)
    pub fn encode_constructor(&self, args: &[AbiValue]) -> StdResult<Vec<u8>> {
        match self.constructor() {
            Some(entry) => {
                check_args(entry, args)?;
                Ok(encode_values(args))
            }
            None if args.is_empty() => Ok(Vec::new()),
            None => Err(StdError::generic_err(
                "ABI has no constructor but arguments were given",
            )),
        }
    }

    /// Decode a function's return data
    pub fn decode_output(&self, name: &str, data: &[u8]) -> StdResult<Vec<AbiValue>> {
        let entry = self.entry("function", name)?;
        decode_values(&param_types(&entry.outputs)?, data)
    }

    /// Decode an event's non-indexed data section
    pub fn decode_event_data(&self, name: &str, data: &[u8]) -> StdResult<Vec<AbiValue>> {
        let entry = self.entry("event", name)?;
        let non_indexed: Vec<AbiParam> = entry
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .cloned()
            .collect();
        decode_values(&param_types(&non_indexed)?, data)
    }
}

fn param_types(params: &[AbiParam]) -> StdResult<Vec<AbiType>> {
    params.iter().map(|p| AbiType::parse(&p.kind)).collect()
}

fn check_args(entry: &AbiEntry, args: &[AbiValue]) -> StdResult<()> {
    if entry.inputs.len() != args.len() {
        return Err(StdError::generic_err(format!(
            "{} expects {} arguments, got {}",
            entry.name,
            entry.inputs.len(),
            args.len()
        )));
    }
    for (param, arg) in entry.inputs.iter().zip(args) {
        if AbiType::parse(&param.kind)? != arg.kind() {
            return Err(StdError::generic_err(format!(
                "argument {} of {} expects {}, got {}",
                param.name,
                entry.name,
                param.kind,
                arg.kind().canonical()
            )));
        }
    }
    Ok(())
}
