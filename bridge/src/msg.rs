//! Message types for the bridge module.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Coin;

use common::EvmAddress;

use crate::params::Params;
use crate::state::TokenMapping;

// ============================================================================
// Execute Messages
// ============================================================================

/// Execute messages. Each is processed atomically: either every effect
/// persists or none does.
#[cw_serde]
pub enum ExecuteMsg {
    /// Convert native coins into contract-token balances of the sender.
    /// Unmapped denoms of a bridgeable shape are provisioned on the fly
    /// when auto-deployment is enabled.
    ConvertToContract {
        /// Non-empty set of (denom, positive amount) pairs
        coins: Vec<Coin>,
    },

    /// Convert contract-token balances of the sender back into native
    /// coins. Every denom must already be mapped.
    ConvertToNative {
        /// Non-empty set of (denom, positive amount) pairs
        coins: Vec<Coin>,
    },

    /// Register or update a token mapping
    ///
    /// Authorization: bridge admin only
    UpdateTokenMapping {
        /// A bridgeable denom
        denom: String,
        /// Hex contract address; empty deploys a fresh ModuleFRC21
        contract: String,
        /// Token symbol, used when deploying
        symbol: String,
        /// Token decimals, used when deploying
        decimals: u8,
    },

    /// Replace the module params
    ///
    /// Authorization: governance authority only
    UpdateParams { params: Params },
}

// ============================================================================
// Query Messages
// ============================================================================

/// Query messages
#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Current module params
    #[returns(ParamsResponse)]
    Params {},

    /// Contract mapped to a denom, if any
    #[returns(ContractByDenomResponse)]
    ContractByDenom { denom: String },

    /// Denom mapped to a contract, if any
    #[returns(DenomByContractResponse)]
    DenomByContract {
        /// Hex contract address
        contract: String,
    },

    /// Registered token mappings, paginated by denom
    #[returns(TokenMappingsResponse)]
    TokenMappings {
        start_after: Option<String>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct ParamsResponse {
    pub params: Params,
}

#[cw_serde]
pub struct ContractByDenomResponse {
    pub contract: Option<EvmAddress>,
}

#[cw_serde]
pub struct DenomByContractResponse {
    pub denom: Option<String>,
}

#[cw_serde]
pub struct TokenMappingsResponse {
    pub mappings: Vec<TokenMapping>,
}
