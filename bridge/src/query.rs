//! Query handlers for the bridge module.

use cosmwasm_std::{to_json_binary, Binary, Order, StdResult, Storage};
use cw_storage_plus::Bound;

use common::EvmAddress;

use crate::msg::{
    ContractByDenomResponse, DenomByContractResponse, ParamsResponse, QueryMsg,
    TokenMappingsResponse,
};
use crate::state::{self, TokenMapping, DENOM_TO_CONTRACT, PARAMS};

const DEFAULT_LIMIT: u32 = 30;
const MAX_LIMIT: u32 = 100;

/// Route a query message to its handler
pub fn query(storage: &dyn Storage, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Params {} => to_json_binary(&query_params(storage)?),
        QueryMsg::ContractByDenom { denom } => {
            to_json_binary(&query_contract_by_denom(storage, &denom)?)
        }
        QueryMsg::DenomByContract { contract } => {
            to_json_binary(&query_denom_by_contract(storage, &contract)?)
        }
        QueryMsg::TokenMappings { start_after, limit } => {
            to_json_binary(&query_token_mappings(storage, start_after, limit)?)
        }
    }
}

pub fn query_params(storage: &dyn Storage) -> StdResult<ParamsResponse> {
    Ok(ParamsResponse {
        params: PARAMS.load(storage)?,
    })
}

pub fn query_contract_by_denom(
    storage: &dyn Storage,
    denom: &str,
) -> StdResult<ContractByDenomResponse> {
    Ok(ContractByDenomResponse {
        contract: state::get_contract_by_denom(storage, denom)?,
    })
}

pub fn query_denom_by_contract(
    storage: &dyn Storage,
    contract: &str,
) -> StdResult<DenomByContractResponse> {
    let address = EvmAddress::from_hex(contract)?;
    Ok(DenomByContractResponse {
        denom: state::get_denom_by_contract(storage, &address)?,
    })
}

pub fn query_token_mappings(
    storage: &dyn Storage,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<TokenMappingsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.as_deref().map(Bound::exclusive);

    let mappings = DENOM_TO_CONTRACT
        .range(storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(denom, contract)| TokenMapping { denom, contract }))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(TokenMappingsResponse { mappings })
}
