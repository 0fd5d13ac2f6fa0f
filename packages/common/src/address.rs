//! EVM address type and native-account aliasing.
//!
//! An `EvmAddress` is a raw 20-byte contract or account address. Every EVM
//! address has a native ledger alias: the bech32 encoding of the same 20
//! bytes under the chain's account prefix. The bridge uses a contract's
//! native alias as the escrow account backing that contract's circulating
//! supply.

use std::fmt;
use std::str::FromStr;

use bech32::{FromBase32, ToBase32, Variant};
use cosmwasm_std::{Addr, StdError, StdResult};

/// Bech32 human-readable prefix for native accounts
pub const ACCOUNT_HRP: &str = "ely";

/// Raw 20-byte EVM address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EvmAddress([u8; 20]);

impl EvmAddress {
    pub const fn new(raw: [u8; 20]) -> Self {
        Self(raw)
    }

    /// Parse a 0x-prefixed hex address (case-insensitive, exactly 40 hex chars)
    pub fn from_hex(addr: &str) -> StdResult<Self> {
        let hex_str = addr
            .strip_prefix("0x")
            .ok_or_else(|| StdError::generic_err("EVM address must be 0x-prefixed"))?;

        if hex_str.len() != 40 {
            return Err(StdError::generic_err(format!(
                "invalid EVM address length: expected 40 hex chars, got {}",
                hex_str.len()
            )));
        }

        let bytes = hex::decode(hex_str)
            .map_err(|e| StdError::generic_err(format!("invalid hex in EVM address: {}", e)))?;

        let mut raw = [0u8; 20];
        raw.copy_from_slice(&bytes);
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_array(self) -> [u8; 20] {
        self.0
    }

    /// The native ledger account aliasing this address.
    ///
    /// For a token contract this alias is the module-owned escrow account
    /// holding the native coins backing the contract-side supply.
    pub fn to_native_account(&self) -> StdResult<Addr> {
        Ok(Addr::unchecked(encode_native_address(&self.0)?))
    }

    /// Recover the EVM address aliased by a native account
    pub fn from_native_account(addr: &Addr) -> StdResult<Self> {
        Ok(Self(decode_native_address(addr.as_str())?))
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for EvmAddress {
    type Err = StdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl serde::Serialize for EvmAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for EvmAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl schemars::JsonSchema for EvmAddress {
    fn schema_name() -> String {
        "EvmAddress".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

/// Encode raw 20 bytes as a native bech32 account string
pub fn encode_native_address(raw: &[u8; 20]) -> StdResult<String> {
    bech32::encode(ACCOUNT_HRP, raw.to_base32(), Variant::Bech32)
        .map_err(|e| StdError::generic_err(format!("bech32 encoding failed: {}", e)))
}

/// Decode a native bech32 account string to raw 20 bytes
pub fn decode_native_address(addr: &str) -> StdResult<[u8; 20]> {
    let (hrp, data, _variant) =
        bech32::decode(addr).map_err(|e| StdError::generic_err(format!("invalid bech32: {}", e)))?;

    if hrp != ACCOUNT_HRP {
        return Err(StdError::generic_err(format!(
            "invalid account prefix: expected {}, got {}",
            ACCOUNT_HRP, hrp
        )));
    }

    let bytes = Vec::<u8>::from_base32(&data)
        .map_err(|e| StdError::generic_err(format!("invalid bech32 data: {}", e)))?;

    bytes.try_into().map_err(|bytes: Vec<u8>| {
        StdError::generic_err(format!(
            "invalid account length: expected 20 bytes, got {}",
            bytes.len()
        ))
    })
}
