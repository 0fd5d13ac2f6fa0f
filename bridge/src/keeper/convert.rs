//! The conversion engine.
//!
//! Native -> contract escrows the coins with the contract's module-owned
//! account and mints the scaled amount contract-side. Contract -> native
//! burns contract-side and releases the escrow. The sum of escrowed native
//! coins and contract-side circulating supply is constant for any mapped
//! denom across any sequence of conversions.
//!
//! Amount scaling is exact integer arithmetic: a contract declaring more
//! decimals than the native base exponent multiplies by the power-of-ten
//! ratio, fewer decimals divides and rejects fractional remainders.

use cosmwasm_std::{Addr, Coin, Storage, Uint128};

use common::{AbiValue, EvmAddress};

use crate::contracts::MODULE_FRC20;
use crate::denom;
use crate::error::BridgeError;
use crate::state;
use crate::traits::{AccountKeeper, BankKeeper, EvmKeeper, TransferKeeper};

use super::Keeper;

/// Decimal exponent of native base units
pub const NATIVE_DECIMALS: u8 = 18;

impl<B, A, E, T> Keeper<B, A, E, T>
where
    B: BankKeeper,
    A: AccountKeeper,
    E: EvmKeeper,
    T: TransferKeeper,
{
    /// Convert one native coin into a contract-token balance of `sender`.
    ///
    /// With `auto_register`, an unmapped denom of a bridgeable shape is
    /// provisioned on the fly; otherwise only pre-mapped denoms convert.
    pub(crate) fn convert_coin_from_native(
        &self,
        storage: &mut dyn Storage,
        sender: &Addr,
        coin: &Coin,
        auto_register: bool,
    ) -> Result<(), BridgeError> {
        if coin.amount.is_zero() {
            return Err(BridgeError::InvalidAmount {
                reason: format!("amount for {} must be positive", coin.denom),
            });
        }

        let contract = match state::get_contract_by_denom(storage, &coin.denom)? {
            Some(contract) => contract,
            None if auto_register && denom::is_bridgeable(&coin.denom) => {
                self.ensure_contract_for_denom(storage, &coin.denom)?
            }
            None => {
                return Err(BridgeError::UnsupportedDenom {
                    denom: coin.denom.clone(),
                })
            }
        };

        let decimals = self.contract_decimals(storage, &contract)?;
        let contract_amount = scale_to_contract(coin.amount, decimals)?;

        // escrow the native coins with the contract's module-owned account
        let escrow = contract.to_native_account()?;
        self.bank
            .send_coins(storage, sender, &escrow, std::slice::from_ref(coin))?;

        // credit the sender's contract-side balance
        let holder = EvmAddress::from_native_account(sender)?;
        let calldata = MODULE_FRC20.abi.encode_call(
            "mint_by_elysium_module",
            &[AbiValue::Address(holder), AbiValue::Uint(contract_amount)],
        )?;
        let result = self.evm.call(storage, &contract, &calldata)?;
        self.dispatch_evm_logs(storage, &result.logs)?;

        tracing::debug!(
            denom = %coin.denom,
            amount = %coin.amount,
            contract = %contract,
            "converted native coin to contract balance"
        );
        Ok(())
    }

    /// Convert a contract-token balance of `holder` back into the native
    /// coin registered for `contract`. `amount` is in native base units.
    pub(crate) fn convert_coin_to_native(
        &self,
        storage: &mut dyn Storage,
        contract: &EvmAddress,
        holder: &Addr,
        amount: Uint128,
    ) -> Result<(), BridgeError> {
        if amount.is_zero() {
            return Err(BridgeError::InvalidAmount {
                reason: "amount must be positive".to_string(),
            });
        }

        let denom = state::get_denom_by_contract(storage, contract)?.ok_or(
            BridgeError::DenomNotRegistered {
                contract: *contract,
            },
        )?;

        let decimals = self.contract_decimals(storage, contract)?;
        let contract_amount = scale_to_contract(amount, decimals)?;

        // debit the holder's contract-side balance
        let holder_evm = EvmAddress::from_native_account(holder)?;
        let calldata = MODULE_FRC20.abi.encode_call(
            "burn_by_elysium_module",
            &[AbiValue::Address(holder_evm), AbiValue::Uint(contract_amount)],
        )?;
        let result = self
            .evm
            .call(storage, contract, &calldata)
            .map_err(|err| match err {
                BridgeError::VmExecution { msg } => BridgeError::InsufficientContractBalance {
                    contract: *contract,
                    source_msg: msg,
                },
                other => other,
            })?;
        self.dispatch_evm_logs(storage, &result.logs)?;

        // release the escrowed native coins
        let escrow = contract.to_native_account()?;
        self.bank.send_coins(
            storage,
            &escrow,
            holder,
            &[Coin {
                denom: denom.clone(),
                amount,
            }],
        )?;

        tracing::debug!(
            %denom,
            %amount,
            contract = %contract,
            "converted contract balance to native coin"
        );
        Ok(())
    }

    /// The decimal exponent declared by a token contract
    pub(crate) fn contract_decimals(
        &self,
        storage: &mut dyn Storage,
        contract: &EvmAddress,
    ) -> Result<u8, BridgeError> {
        let calldata = MODULE_FRC20.abi.encode_call("decimals", &[])?;
        let result = self.evm.call(storage, contract, &calldata)?;
        let values = MODULE_FRC20.abi.decode_output("decimals", &result.data)?;
        match values.as_slice() {
            [value] => Ok(value.as_uint8()?),
            _ => Err(BridgeError::VmExecution {
                msg: format!("contract {} returned malformed decimals", contract),
            }),
        }
    }
}

/// Scale a native base-unit amount to contract-side units
pub(crate) fn scale_to_contract(
    amount: Uint128,
    contract_decimals: u8,
) -> Result<u128, BridgeError> {
    let native = amount.u128();
    if contract_decimals >= NATIVE_DECIMALS {
        let exponent = u32::from(contract_decimals - NATIVE_DECIMALS);
        let factor = pow10(exponent, amount)?;
        native
            .checked_mul(factor)
            .ok_or(BridgeError::AmountOverflow { amount, exponent })
    } else {
        let exponent = u32::from(NATIVE_DECIMALS - contract_decimals);
        let factor = pow10(exponent, amount)?;
        if native % factor != 0 {
            return Err(BridgeError::NonDivisibleAmount { amount, exponent });
        }
        Ok(native / factor)
    }
}

/// Scale a contract-side amount to native base units
pub(crate) fn scale_to_native(
    contract_amount: u128,
    contract_decimals: u8,
) -> Result<Uint128, BridgeError> {
    let amount = Uint128::new(contract_amount);
    if contract_decimals >= NATIVE_DECIMALS {
        let exponent = u32::from(contract_decimals - NATIVE_DECIMALS);
        let factor = pow10(exponent, amount)?;
        if contract_amount % factor != 0 {
            return Err(BridgeError::NonDivisibleAmount { amount, exponent });
        }
        Ok(Uint128::new(contract_amount / factor))
    } else {
        let exponent = u32::from(NATIVE_DECIMALS - contract_decimals);
        let factor = pow10(exponent, amount)?;
        contract_amount
            .checked_mul(factor)
            .map(Uint128::new)
            .ok_or(BridgeError::AmountOverflow { amount, exponent })
    }
}

fn pow10(exponent: u32, amount: Uint128) -> Result<u128, BridgeError> {
    10u128
        .checked_pow(exponent)
        .ok_or(BridgeError::AmountOverflow { amount, exponent })
}
