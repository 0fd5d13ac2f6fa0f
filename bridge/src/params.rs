//! Module parameters, governed by chain governance.

use cosmwasm_schema::cw_serde;

use common::decode_native_address;

use crate::denom::{classify, DenomShape};
use crate::error::BridgeError;

/// Default voucher denom for the bridged ELY asset
pub const IBC_ELY_DENOM_DEFAULT: &str =
    "ibc/6B5A664BF0AF4F71B2F0BAA33141E2F1321242FBD5D19762F541EC971ACB0865";

/// Default cross-chain timeout: 1 day in nanoseconds
pub const IBC_TIMEOUT_DEFAULT: u64 = 86_400_000_000_000;

/// Governance-scoped module configuration
#[cw_serde]
pub struct Params {
    /// Voucher denom of the bridged ELY asset
    pub ibc_ely_denom: String,
    /// Timeout handed to the cross-chain transfer collaborator, in nanoseconds
    pub ibc_timeout: u64,
    /// Account allowed to register token mappings; empty means nobody
    pub bridge_admin: String,
    /// Whether conversion may auto-provision contracts for unmapped denoms
    pub enable_auto_deployment: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            ibc_ely_denom: IBC_ELY_DENOM_DEFAULT.to_string(),
            ibc_timeout: IBC_TIMEOUT_DEFAULT,
            bridge_admin: String::new(),
            enable_auto_deployment: false,
        }
    }
}

impl Params {
    pub fn new(
        ibc_ely_denom: impl Into<String>,
        ibc_timeout: u64,
        bridge_admin: impl Into<String>,
        enable_auto_deployment: bool,
    ) -> Self {
        Self {
            ibc_ely_denom: ibc_ely_denom.into(),
            ibc_timeout,
            bridge_admin: bridge_admin.into(),
            enable_auto_deployment,
        }
    }

    /// Validate every field. Invalid params are rejected before persistence,
    /// never clamped.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if classify(&self.ibc_ely_denom) != Some(DenomShape::IbcVoucher) {
            return Err(BridgeError::InvalidParams {
                reason: format!("invalid ibc denom: {}", self.ibc_ely_denom),
            });
        }
        if !self.bridge_admin.is_empty() {
            decode_native_address(&self.bridge_admin).map_err(|e| BridgeError::InvalidParams {
                reason: format!("invalid bridge admin address: {}", e),
            })?;
        }
        Ok(())
    }
}
