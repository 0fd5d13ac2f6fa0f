//! Error types for the Elysium bridge module.

use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

use common::EvmAddress;

#[derive(Error, Debug, PartialEq)]
pub enum BridgeError {
    #[error("{0}")]
    Std(#[from] StdError),

    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("Invalid denom: {denom}")]
    InvalidDenom { denom: String },

    #[error("Invalid contract address: {reason}")]
    InvalidContractAddress { reason: String },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Invalid params: {reason}")]
    InvalidParams { reason: String },

    #[error("Invalid genesis: {reason}")]
    InvalidGenesis { reason: String },

    // ========================================================================
    // Registry Errors
    // ========================================================================

    #[error("Denom not supported for conversion: {denom}")]
    UnsupportedDenom { denom: String },

    #[error("No denom registered for contract {contract}")]
    DenomNotRegistered { contract: EvmAddress },

    #[error("Contract {contract} is not connected to a native token")]
    UnmappedContract { contract: EvmAddress },

    #[error("Contract {contract} is already mapped to denom {denom}")]
    DuplicateContractMapping { contract: EvmAddress, denom: String },

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("Unauthorized: sender does not match the required authority")]
    Unauthorized,

    // ========================================================================
    // Conversion Errors
    // ========================================================================

    #[error("Auto-deployment is disabled: cannot provision a contract for {denom}")]
    AutoDeploymentDisabled { denom: String },

    #[error("Insufficient contract balance of {contract}: {source_msg}")]
    InsufficientContractBalance {
        contract: EvmAddress,
        source_msg: String,
    },

    #[error("Amount {amount} overflows when scaled by 10^{exponent}")]
    AmountOverflow { amount: Uint128, exponent: u32 },

    #[error("Amount {amount} is not divisible by the scaling factor 10^{exponent}")]
    NonDivisibleAmount { amount: Uint128, exponent: u32 },

    // ========================================================================
    // Collaborator Errors
    // ========================================================================

    #[error("VM execution failed: {msg}")]
    VmExecution { msg: String },

    #[error("Account does not exist: {address}")]
    AccountNotFound { address: String },

    #[error("No cross-chain channel registered for denom {denom}")]
    ChannelNotRegistered { denom: String },

    #[error("Cross-chain transfer initiation failed: {msg}")]
    CrossChainInitiation { msg: String },
}
