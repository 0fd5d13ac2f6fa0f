//! Capability interfaces consumed by the bridge.
//!
//! The ledger, the contract-execution environment and the cross-chain
//! transfer subsystem are external collaborators. The bridge talks to them
//! through these narrow one-directional traits, injected at keeper
//! construction; it never holds a back-reference into its callers.
//!
//! Every mutating method receives the transaction-scoped storage view, so a
//! collaborator's writes are discarded together with the bridge's own when
//! the enclosing operation fails.

use cosmwasm_std::{Addr, Coin, Storage, Uint128};

use common::EvmAddress;

use crate::error::BridgeError;

/// A log record emitted during contract execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmLog {
    /// The contract that emitted the log
    pub contract: EvmAddress,
    /// Ordered 32-byte topics; the first is the event signature hash
    pub topics: Vec<[u8; 32]>,
    /// ABI-encoded non-indexed arguments
    pub data: Vec<u8>,
}

/// Result of a contract invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallResult {
    /// ABI-encoded return data
    pub data: Vec<u8>,
    /// Logs emitted during the call, in emission order
    pub logs: Vec<EvmLog>,
}

/// Native account-balance ledger
pub trait BankKeeper {
    fn get_balance(&self, storage: &dyn Storage, address: &Addr, denom: &str) -> Uint128;

    fn send_coins(
        &self,
        storage: &mut dyn Storage,
        from: &Addr,
        to: &Addr,
        coins: &[Coin],
    ) -> Result<(), BridgeError>;

    /// Mint coins to a module-owned account
    fn mint_coins(
        &self,
        storage: &mut dyn Storage,
        to: &Addr,
        coins: &[Coin],
    ) -> Result<(), BridgeError>;

    /// Burn coins from a module-owned account
    fn burn_coins(
        &self,
        storage: &mut dyn Storage,
        from: &Addr,
        coins: &[Coin],
    ) -> Result<(), BridgeError>;
}

/// Account existence checks, used to validate recipients before crediting
pub trait AccountKeeper {
    fn has_account(&self, storage: &dyn Storage, address: &Addr) -> bool;
}

/// Embedded contract-execution environment
pub trait EvmKeeper {
    /// Deploy a contract from bytecode with ABI-encoded constructor args
    fn deploy(
        &self,
        storage: &mut dyn Storage,
        bytecode: &[u8],
        ctor_args: &[u8],
    ) -> Result<EvmAddress, BridgeError>;

    /// Invoke a contract; returns the call's output and emitted logs
    fn call(
        &self,
        storage: &mut dyn Storage,
        contract: &EvmAddress,
        calldata: &[u8],
    ) -> Result<CallResult, BridgeError>;
}

/// Cross-chain transfer subsystem
pub trait TransferKeeper {
    /// Initiate a transfer over the given channel. The timeout is data for
    /// the collaborator; it is not enforced inside the bridge.
    fn initiate_transfer(
        &self,
        storage: &mut dyn Storage,
        sender: &Addr,
        recipient: &str,
        coin: &Coin,
        channel: &str,
        timeout_ns: u64,
    ) -> Result<(), BridgeError>;
}
