//! Denomination codec.
//!
//! Three bridgeable denomination shapes exist, distinguished by exact prefix
//! and exact total length:
//!
//! | shape          | prefix      | suffix          |
//! |----------------|-------------|-----------------|
//! | IBC voucher    | `ibc/`      | 64 hex chars    |
//! | auto-bridged   | `gravity0x` | 40 hex chars    |
//! | bridge-native  | `elysium0x` | 40 hex chars    |
//!
//! Auto-bridged and bridge-native denoms embed a contract address in their
//! suffix; voucher denoms carry an opaque hash. All functions here are pure.

use common::EvmAddress;

use crate::error::BridgeError;

pub const IBC_DENOM_PREFIX: &str = "ibc/";
pub const IBC_DENOM_LEN: usize = IBC_DENOM_PREFIX.len() + 64;

pub const GRAVITY_DENOM_PREFIX: &str = "gravity0x";
pub const GRAVITY_DENOM_LEN: usize = GRAVITY_DENOM_PREFIX.len() + 40;

pub const ELYSIUM_DENOM_PREFIX: &str = "elysium0x";
pub const ELYSIUM_DENOM_LEN: usize = ELYSIUM_DENOM_PREFIX.len() + 40;

/// The shape of a bridgeable denomination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenomShape {
    /// `ibc/<64-hex>` voucher received over a cross-chain channel
    IbcVoucher,
    /// `gravity0x<40-hex>` coin auto-bridged from an external chain
    AutoBridged,
    /// `elysium0x<40-hex>` coin originating from a contract on this chain
    BridgeNative,
}

/// Classify a denom. Total and deterministic; returns `None` for any string
/// that does not match a shape's exact prefix, exact length and hex suffix.
pub fn classify(denom: &str) -> Option<DenomShape> {
    if denom.len() == IBC_DENOM_LEN
        && denom.starts_with(IBC_DENOM_PREFIX)
        && is_hex(&denom[IBC_DENOM_PREFIX.len()..])
    {
        return Some(DenomShape::IbcVoucher);
    }
    if denom.len() == GRAVITY_DENOM_LEN
        && denom.starts_with(GRAVITY_DENOM_PREFIX)
        && is_hex(&denom[GRAVITY_DENOM_PREFIX.len()..])
    {
        return Some(DenomShape::AutoBridged);
    }
    if denom.len() == ELYSIUM_DENOM_LEN
        && denom.starts_with(ELYSIUM_DENOM_PREFIX)
        && is_hex(&denom[ELYSIUM_DENOM_PREFIX.len()..])
    {
        return Some(DenomShape::BridgeNative);
    }
    None
}

/// True if the denom can be associated with a token contract
pub fn is_bridgeable(denom: &str) -> bool {
    classify(denom).is_some()
}

/// True if the denom originates from a contract on this chain
pub fn is_source_denom(denom: &str) -> bool {
    classify(denom) == Some(DenomShape::BridgeNative)
}

/// Extract the contract address embedded in an auto-bridged or bridge-native
/// denom. Voucher denoms carry no address; a prefix+length match with a
/// malformed suffix is an address error, not a shape error.
pub fn extract_contract_address(denom: &str) -> Result<EvmAddress, BridgeError> {
    // the suffix starts at the `0x`, two chars before the hex run
    let suffix = if denom.len() == GRAVITY_DENOM_LEN && denom.starts_with(GRAVITY_DENOM_PREFIX) {
        &denom[GRAVITY_DENOM_PREFIX.len() - 2..]
    } else if denom.len() == ELYSIUM_DENOM_LEN && denom.starts_with(ELYSIUM_DENOM_PREFIX) {
        &denom[ELYSIUM_DENOM_PREFIX.len() - 2..]
    } else {
        return Err(BridgeError::InvalidDenom {
            denom: denom.to_string(),
        });
    };
    EvmAddress::from_hex(suffix).map_err(|e| BridgeError::InvalidContractAddress {
        reason: e.to_string(),
    })
}

/// Derive a human-readable token symbol for an auto-provisioned contract
pub fn derive_symbol(denom: &str) -> String {
    match classify(denom) {
        Some(DenomShape::IbcVoucher) => {
            format!("IBC-{}", short_suffix(denom, IBC_DENOM_PREFIX.len()))
        }
        Some(DenomShape::AutoBridged) => {
            format!("GRV-{}", short_suffix(denom, GRAVITY_DENOM_PREFIX.len()))
        }
        Some(DenomShape::BridgeNative) => {
            format!("ELY-{}", short_suffix(denom, ELYSIUM_DENOM_PREFIX.len()))
        }
        None => denom.to_uppercase(),
    }
}

fn short_suffix(denom: &str, start: usize) -> String {
    denom[start..start + 6].to_uppercase()
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}
