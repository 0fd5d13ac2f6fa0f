//! Contract provisioning from the embedded templates.

use cosmwasm_std::Storage;

use common::{AbiValue, EvmAddress};

use crate::contracts::{MODULE_FRC20, MODULE_FRC21};
use crate::denom::{self, DenomShape};
use crate::error::BridgeError;
use crate::state::{self, PARAMS};
use crate::traits::{AccountKeeper, BankKeeper, EvmKeeper, TransferKeeper};

use super::convert::NATIVE_DECIMALS;
use super::Keeper;

impl<B, A, E, T> Keeper<B, A, E, T>
where
    B: BankKeeper,
    A: AccountKeeper,
    E: EvmKeeper,
    T: TransferKeeper,
{
    /// Resolve the contract for a denom, provisioning one when absent.
    ///
    /// Idempotent: an existing mapping is returned unchanged. Deployment
    /// failure records no mapping. Bridge-native denoms are never
    /// auto-provisioned; their contract must be registered explicitly.
    pub fn ensure_contract_for_denom(
        &self,
        storage: &mut dyn Storage,
        denom: &str,
    ) -> Result<EvmAddress, BridgeError> {
        if let Some(contract) = state::get_contract_by_denom(storage, denom)? {
            return Ok(contract);
        }

        match denom::classify(denom) {
            Some(DenomShape::IbcVoucher) | Some(DenomShape::AutoBridged) => {}
            Some(DenomShape::BridgeNative) => {
                return Err(BridgeError::UnsupportedDenom {
                    denom: denom.to_string(),
                })
            }
            None => {
                return Err(BridgeError::UnsupportedDenom {
                    denom: denom.to_string(),
                })
            }
        }

        let params = PARAMS.load(storage)?;
        if !params.enable_auto_deployment {
            return Err(BridgeError::AutoDeploymentDisabled {
                denom: denom.to_string(),
            });
        }

        let contract = self.deploy_module_frc20(storage, denom)?;
        state::set_mapping(storage, denom, &contract)?;

        tracing::debug!(denom, contract = %contract, "auto-provisioned token contract");
        Ok(contract)
    }

    fn deploy_module_frc20(
        &self,
        storage: &mut dyn Storage,
        denom: &str,
    ) -> Result<EvmAddress, BridgeError> {
        let template = &*MODULE_FRC20;
        let ctor_args = template.abi.encode_constructor(&[
            AbiValue::String(denom.to_string()),
            AbiValue::String(denom::derive_symbol(denom)),
            AbiValue::Uint8(NATIVE_DECIMALS),
        ])?;
        self.evm.deploy(storage, &template.bin, &ctor_args)
    }

    /// Deploy a fresh ModuleFRC21 instance
    pub fn deploy_module_frc21(
        &self,
        storage: &mut dyn Storage,
        symbol: &str,
        decimals: u8,
    ) -> Result<EvmAddress, BridgeError> {
        let template = &*MODULE_FRC21;
        let ctor_args = template.abi.encode_constructor(&[
            AbiValue::String(symbol.to_string()),
            AbiValue::Uint8(decimals),
        ])?;
        self.evm.deploy(storage, &template.bin, &ctor_args)
    }
}
