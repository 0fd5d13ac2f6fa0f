//! Persisted state layout for the bridge module.
//!
//! The token mapping registry is kept as two independent indices over the
//! same underlying store so that both lookup directions are O(1). The two
//! indices are always written together.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Order, StdResult, Storage};
use cw_storage_plus::{Item, Map};

use common::EvmAddress;

use crate::params::Params;

/// A registered association between a native denom and a token contract
#[cw_serde]
pub struct TokenMapping {
    pub denom: String,
    pub contract: EvmAddress,
}

// ============================================================================
// Storage
// ============================================================================

/// Module params under a single well-known key
pub const PARAMS: Item<Params> = Item::new("params");

/// Forward index: denom -> contract address
pub const DENOM_TO_CONTRACT: Map<&str, EvmAddress> = Map::new("denom_to_contract");

/// Reverse index: contract address (raw 20 bytes) -> denom
pub const CONTRACT_TO_DENOM: Map<&[u8], String> = Map::new("contract_to_denom");

/// Chain-topology metadata: denom -> outgoing transfer channel id
pub const SOURCE_CHANNELS: Map<&str, String> = Map::new("source_channels");

// ============================================================================
// Registry operations
// ============================================================================

pub fn get_contract_by_denom(
    storage: &dyn Storage,
    denom: &str,
) -> StdResult<Option<EvmAddress>> {
    DENOM_TO_CONTRACT.may_load(storage, denom)
}

pub fn get_denom_by_contract(
    storage: &dyn Storage,
    contract: &EvmAddress,
) -> StdResult<Option<String>> {
    CONTRACT_TO_DENOM.may_load(storage, contract.as_bytes())
}

/// Record a mapping, overwriting any existing association for the denom.
///
/// When the denom was previously mapped to a different contract, the stale
/// reverse entry is removed in the same write so the two indices never
/// disagree. Uniqueness policy (one denom per contract) is the caller's
/// responsibility.
pub fn set_mapping(
    storage: &mut dyn Storage,
    denom: &str,
    contract: &EvmAddress,
) -> StdResult<()> {
    if let Some(previous) = DENOM_TO_CONTRACT.may_load(storage, denom)? {
        if previous != *contract {
            CONTRACT_TO_DENOM.remove(storage, previous.as_bytes());
        }
    }
    DENOM_TO_CONTRACT.save(storage, denom, contract)?;
    CONTRACT_TO_DENOM.save(storage, contract.as_bytes(), &denom.to_string())
}

/// All registered mappings in ascending denom order
pub fn all_mappings(storage: &dyn Storage) -> StdResult<Vec<TokenMapping>> {
    DENOM_TO_CONTRACT
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(denom, contract)| TokenMapping { denom, contract }))
        .collect()
}
