//! Genesis state: validation, import and export.

use std::collections::BTreeSet;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Order, StdResult, Storage};

use crate::denom::{classify, extract_contract_address, DenomShape};
use crate::error::BridgeError;
use crate::params::Params;
use crate::state::{self, TokenMapping, PARAMS, SOURCE_CHANNELS};

/// A denom's outgoing cross-chain channel
#[cw_serde]
pub struct SourceChannel {
    pub denom: String,
    pub channel: String,
}

/// Initial module state
#[cw_serde]
pub struct GenesisState {
    pub params: Params,
    /// Mappings for bridge-native (`elysium0x...`) denoms
    pub external_contracts: Vec<TokenMapping>,
    /// Mappings for voucher and auto-bridged denoms
    pub auto_contracts: Vec<TokenMapping>,
    /// Chain-topology metadata for cross-chain transfers
    pub source_channels: Vec<SourceChannel>,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            params: Params::default(),
            external_contracts: Vec::new(),
            auto_contracts: Vec::new(),
            source_channels: Vec::new(),
        }
    }
}

impl GenesisState {
    pub fn validate(&self) -> Result<(), BridgeError> {
        self.params.validate()?;

        let mut denoms = BTreeSet::new();
        let mut contracts = BTreeSet::new();

        for mapping in &self.external_contracts {
            if classify(&mapping.denom) != Some(DenomShape::BridgeNative) {
                return Err(BridgeError::InvalidGenesis {
                    reason: format!("{} is not a bridge-native denom", mapping.denom),
                });
            }
            if extract_contract_address(&mapping.denom)? != mapping.contract {
                return Err(BridgeError::InvalidGenesis {
                    reason: format!(
                        "denom {} does not embed contract {}",
                        mapping.denom, mapping.contract
                    ),
                });
            }
        }
        for mapping in &self.auto_contracts {
            match classify(&mapping.denom) {
                Some(DenomShape::IbcVoucher) | Some(DenomShape::AutoBridged) => {}
                _ => {
                    return Err(BridgeError::InvalidGenesis {
                        reason: format!("{} is not an auto-bridgeable denom", mapping.denom),
                    })
                }
            }
        }
        for mapping in self.external_contracts.iter().chain(&self.auto_contracts) {
            if !denoms.insert(mapping.denom.as_str()) {
                return Err(BridgeError::InvalidGenesis {
                    reason: format!("duplicate denom {}", mapping.denom),
                });
            }
            if !contracts.insert(mapping.contract) {
                return Err(BridgeError::InvalidGenesis {
                    reason: format!("duplicate contract {}", mapping.contract),
                });
            }
        }

        let mut channel_denoms = BTreeSet::new();
        for entry in &self.source_channels {
            if entry.channel.is_empty() {
                return Err(BridgeError::InvalidGenesis {
                    reason: format!("empty channel for denom {}", entry.denom),
                });
            }
            if !channel_denoms.insert(entry.denom.as_str()) {
                return Err(BridgeError::InvalidGenesis {
                    reason: format!("duplicate channel entry for denom {}", entry.denom),
                });
            }
        }

        Ok(())
    }
}

/// Validate and write the genesis state
pub fn init_genesis(storage: &mut dyn Storage, genesis: &GenesisState) -> Result<(), BridgeError> {
    genesis.validate()?;

    PARAMS.save(storage, &genesis.params)?;
    for mapping in genesis.external_contracts.iter().chain(&genesis.auto_contracts) {
        state::set_mapping(storage, &mapping.denom, &mapping.contract)?;
    }
    for entry in &genesis.source_channels {
        SOURCE_CHANNELS.save(storage, &entry.denom, &entry.channel)?;
    }
    Ok(())
}

/// Reconstruct the genesis state from storage
pub fn export_genesis(storage: &dyn Storage) -> StdResult<GenesisState> {
    let params = PARAMS.load(storage)?;

    let mut external_contracts = Vec::new();
    let mut auto_contracts = Vec::new();
    for mapping in state::all_mappings(storage)? {
        match classify(&mapping.denom) {
            Some(DenomShape::BridgeNative) => external_contracts.push(mapping),
            _ => auto_contracts.push(mapping),
        }
    }

    let source_channels = SOURCE_CHANNELS
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(denom, channel)| SourceChannel { denom, channel }))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(GenesisState {
        params,
        external_contracts,
        auto_contracts,
        source_channels,
    })
}
