//! The bridge keeper.
//!
//! Holds the injected capability interfaces and implements the module's
//! exposed operations. Every exposed operation runs against a
//! [`StateOverlay`] and commits only on full success, so callers observe
//! one atomic effect or one atomic failure.
//!
//! The implementation is modularized into:
//! - `convert` - the conversion engine (native <-> contract)
//! - `deploy`  - contract provisioning from the embedded templates
//! - `events`  - log dispatch and the typed handlers

mod convert;
mod deploy;
mod events;

pub use convert::NATIVE_DECIMALS;
pub use events::{LogHandlerKind, SEND_ELY_TO_IBC_EVENT, SEND_TO_ACCOUNT_EVENT};

use std::collections::BTreeMap;

use cosmwasm_std::{Addr, Coin, Response, Storage};

use common::EvmAddress;

use crate::denom;
use crate::error::BridgeError;
use crate::msg::ExecuteMsg;
use crate::overlay::StateOverlay;
use crate::params::Params;
use crate::state::{self, PARAMS};
use crate::traits::{AccountKeeper, BankKeeper, EvmKeeper, EvmLog, TransferKeeper};

pub struct Keeper<B, A, E, T> {
    /// The single governance authority allowed to update params
    pub authority: Addr,
    pub bank: B,
    pub accounts: A,
    pub evm: E,
    pub transfer: T,
    handlers: BTreeMap<[u8; 32], LogHandlerKind>,
}

impl<B, A, E, T> Keeper<B, A, E, T>
where
    B: BankKeeper,
    A: AccountKeeper,
    E: EvmKeeper,
    T: TransferKeeper,
{
    pub fn new(authority: Addr, bank: B, accounts: A, evm: E, transfer: T) -> Self {
        Self {
            authority,
            bank,
            accounts,
            evm,
            transfer,
            handlers: events::default_handlers(),
        }
    }

    /// Route an authenticated message to its handler
    pub fn execute(
        &self,
        storage: &mut dyn Storage,
        sender: &Addr,
        msg: ExecuteMsg,
    ) -> Result<Response, BridgeError> {
        match msg {
            ExecuteMsg::ConvertToContract { coins } => {
                self.convert_to_contract(storage, sender, &coins)
            }
            ExecuteMsg::ConvertToNative { coins } => {
                self.convert_to_native(storage, sender, &coins)
            }
            ExecuteMsg::UpdateTokenMapping {
                denom,
                contract,
                symbol,
                decimals,
            } => self.update_token_mapping(storage, sender, &denom, &contract, &symbol, decimals),
            ExecuteMsg::UpdateParams { params } => self.update_params(storage, sender, params),
        }
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Convert native coins into contract-token balances, provisioning
    /// contracts for unmapped bridgeable denoms
    pub fn convert_to_contract(
        &self,
        storage: &mut dyn Storage,
        sender: &Addr,
        coins: &[Coin],
    ) -> Result<Response, BridgeError> {
        if coins.is_empty() {
            return Err(BridgeError::InvalidAmount {
                reason: "no coins to convert".to_string(),
            });
        }

        let mut view = StateOverlay::new(storage);
        for coin in coins {
            self.convert_coin_from_native(&mut view, sender, coin, true)?;
        }
        view.commit();

        Ok(Response::new()
            .add_attribute("method", "convert_to_contract")
            .add_attribute("sender", sender))
    }

    /// Convert contract-token balances back into native coins
    pub fn convert_to_native(
        &self,
        storage: &mut dyn Storage,
        sender: &Addr,
        coins: &[Coin],
    ) -> Result<Response, BridgeError> {
        if coins.is_empty() {
            return Err(BridgeError::InvalidAmount {
                reason: "no coins to convert".to_string(),
            });
        }

        let mut view = StateOverlay::new(storage);
        for coin in coins {
            let contract = state::get_contract_by_denom(&view, &coin.denom)?.ok_or_else(|| {
                BridgeError::UnsupportedDenom {
                    denom: coin.denom.clone(),
                }
            })?;
            self.convert_coin_to_native(&mut view, &contract, sender, coin.amount)?;
        }
        view.commit();

        Ok(Response::new()
            .add_attribute("method", "convert_to_native")
            .add_attribute("sender", sender))
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register or update a token mapping.
    ///
    /// Requires the sender to match the configured bridge admin; an unset
    /// admin authorizes no one. An empty `contract` deploys a fresh
    /// ModuleFRC21 parameterized by `symbol`/`decimals`.
    pub fn update_token_mapping(
        &self,
        storage: &mut dyn Storage,
        sender: &Addr,
        denom: &str,
        contract: &str,
        symbol: &str,
        decimals: u8,
    ) -> Result<Response, BridgeError> {
        let params = PARAMS.load(storage)?;
        if params.bridge_admin.is_empty() || sender.as_str() != params.bridge_admin {
            return Err(BridgeError::Unauthorized);
        }
        if !denom::is_bridgeable(denom) {
            return Err(BridgeError::InvalidDenom {
                denom: denom.to_string(),
            });
        }

        let mut view = StateOverlay::new(storage);

        let address = if contract.is_empty() {
            self.deploy_module_frc21(&mut view, symbol, decimals)?
        } else {
            EvmAddress::from_hex(contract).map_err(|e| BridgeError::InvalidContractAddress {
                reason: e.to_string(),
            })?
        };

        // bridge-native denoms must embed the very contract they map to
        if denom::is_source_denom(denom) {
            let embedded = denom::extract_contract_address(denom)?;
            if embedded != address {
                return Err(BridgeError::InvalidContractAddress {
                    reason: format!("denom {} embeds {}, not {}", denom, embedded, address),
                });
            }
        }

        // one denom per contract; the registry never silently picks an owner
        if let Some(existing) = state::get_denom_by_contract(&view, &address)? {
            if existing != denom {
                return Err(BridgeError::DuplicateContractMapping {
                    contract: address,
                    denom: existing,
                });
            }
        }

        state::set_mapping(&mut view, denom, &address)?;
        view.commit();

        Ok(Response::new()
            .add_attribute("method", "update_token_mapping")
            .add_attribute("denom", denom)
            .add_attribute("contract", address.to_string()))
    }

    // ========================================================================
    // Params
    // ========================================================================

    /// Replace the module params. Only the governance authority may do this.
    pub fn update_params(
        &self,
        storage: &mut dyn Storage,
        sender: &Addr,
        params: Params,
    ) -> Result<Response, BridgeError> {
        if *sender != self.authority {
            return Err(BridgeError::Unauthorized);
        }
        params.validate()?;
        PARAMS.save(storage, &params)?;

        Ok(Response::new().add_attribute("method", "update_params"))
    }

    // ========================================================================
    // Post-tx hook
    // ========================================================================

    /// Entry point for the execution environment after a user-submitted
    /// contract transaction: dispatch the emitted logs in their own
    /// transaction scope.
    pub fn post_tx_processing(
        &self,
        storage: &mut dyn Storage,
        logs: &[EvmLog],
    ) -> Result<(), BridgeError> {
        let mut view = StateOverlay::new(storage);
        self.dispatch_evm_logs(&mut view, logs)?;
        view.commit();
        Ok(())
    }
}
