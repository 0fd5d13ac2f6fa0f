//! Log dispatch and the typed handlers.
//!
//! After a contract invocation the VM yields the emitted logs in order. For
//! each log the first topic is matched against the handler table:
//!
//! - no match: the log is ignored (unrelated contract events are expected)
//! - match but undecodable data: logged and skipped, never an error. A
//!   coincidental signature collision from an unrelated contract must not
//!   halt unrelated business
//! - handler error: propagated, aborting the enclosing state transition

use std::collections::BTreeMap;

use cosmwasm_std::{Coin, Storage};

use crate::contracts::MODULE_FRC20;
use crate::error::BridgeError;
use crate::state::{self, PARAMS, SOURCE_CHANNELS};
use crate::traits::{AccountKeeper, BankKeeper, EvmKeeper, EvmLog, TransferKeeper};

use super::convert::scale_to_native;
use super::Keeper;

/// `event __ElysiumSendToAccount(address recipient, uint256 amount)`
pub const SEND_TO_ACCOUNT_EVENT: &str = "__ElysiumSendToAccount";

/// `event __ElysiumSendElyToIbc(address sender, string recipient, uint256 amount)`
pub const SEND_ELY_TO_IBC_EVENT: &str = "__ElysiumSendElyToIbc";

/// Typed reaction to a recognized log signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogHandlerKind {
    /// Move escrowed coins to a native account
    CreditAccount,
    /// Forward escrowed coins to a recipient on an external chain
    ForwardCrossChain,
}

lazy_static::lazy_static! {
    static ref SEND_TO_ACCOUNT_EVENT_ID: [u8; 32] = MODULE_FRC20
        .abi
        .event_id(SEND_TO_ACCOUNT_EVENT)
        .expect("embedded ABI defines __ElysiumSendToAccount");

    static ref SEND_ELY_TO_IBC_EVENT_ID: [u8; 32] = MODULE_FRC20
        .abi
        .event_id(SEND_ELY_TO_IBC_EVENT)
        .expect("embedded ABI defines __ElysiumSendElyToIbc");
}

/// The static signature -> handler binding
pub(crate) fn default_handlers() -> BTreeMap<[u8; 32], LogHandlerKind> {
    let mut handlers = BTreeMap::new();
    handlers.insert(*SEND_TO_ACCOUNT_EVENT_ID, LogHandlerKind::CreditAccount);
    handlers.insert(*SEND_ELY_TO_IBC_EVENT_ID, LogHandlerKind::ForwardCrossChain);
    handlers
}

impl<B, A, E, T> Keeper<B, A, E, T>
where
    B: BankKeeper,
    A: AccountKeeper,
    E: EvmKeeper,
    T: TransferKeeper,
{
    /// Dispatch emitted logs, in emission order, against the handler table
    pub fn dispatch_evm_logs(
        &self,
        storage: &mut dyn Storage,
        logs: &[EvmLog],
    ) -> Result<(), BridgeError> {
        for log in logs {
            let Some(signature) = log.topics.first() else {
                continue;
            };
            let Some(kind) = self.handlers.get(signature) else {
                continue;
            };
            match kind {
                LogHandlerKind::CreditAccount => self.handle_send_to_account(storage, log)?,
                LogHandlerKind::ForwardCrossChain => self.handle_send_ely_to_ibc(storage, log)?,
            }
        }
        Ok(())
    }

    /// Handle `__ElysiumSendToAccount`: move coins from the emitting
    /// contract's escrow to the decoded recipient's native balance.
    fn handle_send_to_account(
        &self,
        storage: &mut dyn Storage,
        log: &EvmLog,
    ) -> Result<(), BridgeError> {
        let args = match MODULE_FRC20
            .abi
            .decode_event_data(SEND_TO_ACCOUNT_EVENT, &log.data)
        {
            Ok(args) => args,
            Err(err) => {
                tracing::error!(
                    contract = %log.contract,
                    error = %err,
                    "log signature matches but failed to decode"
                );
                return Ok(());
            }
        };
        let [recipient_arg, amount_arg] = args.as_slice() else {
            return Ok(());
        };

        let denom = state::get_denom_by_contract(storage, &log.contract)?.ok_or(
            BridgeError::UnmappedContract {
                contract: log.contract,
            },
        )?;

        let decimals = self.contract_decimals(storage, &log.contract)?;
        let amount = scale_to_native(amount_arg.as_uint()?, decimals)?;

        let recipient = recipient_arg.as_address()?.to_native_account()?;
        if !self.accounts.has_account(storage, &recipient) {
            return Err(BridgeError::AccountNotFound {
                address: recipient.to_string(),
            });
        }

        let escrow = log.contract.to_native_account()?;
        self.bank
            .send_coins(storage, &escrow, &recipient, &[Coin { denom, amount }])?;
        Ok(())
    }

    /// Handle `__ElysiumSendElyToIbc`: release escrow to the decoded sender,
    /// then initiate a cross-chain transfer to the decoded recipient.
    fn handle_send_ely_to_ibc(
        &self,
        storage: &mut dyn Storage,
        log: &EvmLog,
    ) -> Result<(), BridgeError> {
        let args = match MODULE_FRC20
            .abi
            .decode_event_data(SEND_ELY_TO_IBC_EVENT, &log.data)
        {
            Ok(args) => args,
            Err(err) => {
                tracing::error!(
                    contract = %log.contract,
                    error = %err,
                    "log signature matches but failed to decode"
                );
                return Ok(());
            }
        };
        let [sender_arg, recipient_arg, amount_arg] = args.as_slice() else {
            return Ok(());
        };

        let params = PARAMS.load(storage)?;
        // an unmapped emitter is the wrapped bridge asset; everything else
        // forwards the denom it is registered for
        let denom = state::get_denom_by_contract(storage, &log.contract)?
            .unwrap_or_else(|| params.ibc_ely_denom.clone());

        let decimals = self.contract_decimals(storage, &log.contract)?;
        let amount = scale_to_native(amount_arg.as_uint()?, decimals)?;
        let coin = Coin {
            denom: denom.clone(),
            amount,
        };

        // send to the sender first so that a failed transfer refunds them,
        // not the escrow
        let sender = sender_arg.as_address()?.to_native_account()?;
        let escrow = log.contract.to_native_account()?;
        self.bank
            .send_coins(storage, &escrow, &sender, std::slice::from_ref(&coin))?;

        let channel = SOURCE_CHANNELS
            .may_load(storage, &denom)?
            .ok_or(BridgeError::ChannelNotRegistered { denom })?;
        let recipient = recipient_arg.as_string()?;
        self.transfer.initiate_transfer(
            storage,
            &sender,
            recipient,
            &coin,
            &channel,
            params.ibc_timeout,
        )?;
        Ok(())
    }
}
