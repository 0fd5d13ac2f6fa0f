//! Embedded compiled token contracts.
//!
//! The two module token templates are compiled offline and embedded as JSON
//! artifacts (`{"abi": [...], "bin": "<hex>"}`). They are loaded once at
//! process start; a missing or malformed artifact aborts startup, it is not
//! a runtime error path.

use std::ops::Deref;

use serde::Deserialize;

use common::Abi;

/// A byte array that serializes to hex
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteString(pub Vec<u8>);

impl<'de> Deserialize<'de> for ByteString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map(ByteString).map_err(serde::de::Error::custom)
    }
}

impl Deref for ByteString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

/// Compiled bytecode and ABI of a token contract template
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CompiledContract {
    pub abi: Abi,
    pub bin: ByteString,
}

static MODULE_FRC20_JSON: &[u8] = include_bytes!("contracts/ModuleFRC20.json");
static MODULE_FRC21_JSON: &[u8] = include_bytes!("contracts/ModuleFRC21.json");

lazy_static::lazy_static! {
    /// Template auto-provisioned for voucher and auto-bridged denoms
    pub static ref MODULE_FRC20: CompiledContract = load_contract(MODULE_FRC20_JSON, "ModuleFRC20");

    /// Template deployed on explicit registration of a token mapping
    pub static ref MODULE_FRC21: CompiledContract = load_contract(MODULE_FRC21_JSON, "ModuleFRC21");
}

fn load_contract(raw: &[u8], name: &str) -> CompiledContract {
    let contract: CompiledContract = match serde_json::from_slice(raw) {
        Ok(contract) => contract,
        Err(err) => panic!("failed to load embedded contract {}: {}", name, err),
    };
    if contract.bin.is_empty() {
        panic!("embedded contract {} has empty bytecode", name);
    }
    contract
}
