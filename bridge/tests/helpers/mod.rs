//! Shared test harness: mock capabilities around a `MockStorage`.
//!
//! The mock EVM recognizes the two embedded bytecode templates and simulates
//! the module token interface (decimals, balances, mint/burn with Transfer
//! logs). Ledger balances and contract state live in the same storage as the
//! bridge's own state, so overlay rollback covers them exactly as it would
//! in the real state machine.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use cosmwasm_std::testing::MockStorage;
use cosmwasm_std::{Addr, Coin, StdError, Storage, Uint128};
use cw_storage_plus::{Item, Map};

use common::abi::{decode_values, encode_values};
use common::{encode_native_address, AbiType, AbiValue, EvmAddress};

use bridge::contracts::{MODULE_FRC20, MODULE_FRC21};
use bridge::error::BridgeError;
use bridge::genesis::{init_genesis, GenesisState, SourceChannel};
use bridge::params::Params;
use bridge::traits::{
    AccountKeeper, BankKeeper, CallResult, EvmKeeper, EvmLog, TransferKeeper,
};
use bridge::Keeper;

// ============================================================================
// Fixtures
// ============================================================================

pub const VOUCHER: &str =
    "ibc/6B5A664BF0AF4F71B2F0BAA33141E2F1321242FBD5D19762F541EC971ACB0865";
pub const VOUCHER_2: &str =
    "ibc/0000000000000000000000000000000000000000000000000000000000000000";
pub const GRAVITY: &str = "gravity0x57f96e6b86cdefdb3d412547816a82e3e0ebf9d2";
pub const CHANNEL: &str = "channel-0";

pub fn native_addr(seed: u8) -> Addr {
    Addr::unchecked(encode_native_address(&[seed; 20]).unwrap())
}

pub fn evm_alias(addr: &Addr) -> EvmAddress {
    EvmAddress::from_native_account(addr).unwrap()
}

// ============================================================================
// Mock bank
// ============================================================================

const BALANCES: Map<(&str, &str), Uint128> = Map::new("mock_bank_balances");

pub struct MockBank;

impl MockBank {
    fn add(
        storage: &mut dyn Storage,
        address: &Addr,
        coin: &Coin,
    ) -> Result<(), BridgeError> {
        let key = (address.as_str(), coin.denom.as_str());
        let balance = BALANCES.may_load(storage, key)?.unwrap_or_default();
        BALANCES.save(storage, key, &(balance + coin.amount))?;
        Ok(())
    }

    fn sub(
        storage: &mut dyn Storage,
        address: &Addr,
        coin: &Coin,
    ) -> Result<(), BridgeError> {
        let key = (address.as_str(), coin.denom.as_str());
        let balance = BALANCES.may_load(storage, key)?.unwrap_or_default();
        let remaining = balance.checked_sub(coin.amount).map_err(|_| {
            BridgeError::Std(StdError::generic_err(format!(
                "insufficient funds: {} has {}{}",
                address, balance, coin.denom
            )))
        })?;
        BALANCES.save(storage, key, &remaining)?;
        Ok(())
    }
}

impl BankKeeper for MockBank {
    fn get_balance(&self, storage: &dyn Storage, address: &Addr, denom: &str) -> Uint128 {
        BALANCES
            .may_load(storage, (address.as_str(), denom))
            .unwrap_or_default()
            .unwrap_or_default()
    }

    fn send_coins(
        &self,
        storage: &mut dyn Storage,
        from: &Addr,
        to: &Addr,
        coins: &[Coin],
    ) -> Result<(), BridgeError> {
        for coin in coins {
            Self::sub(storage, from, coin)?;
            Self::add(storage, to, coin)?;
        }
        Ok(())
    }

    fn mint_coins(
        &self,
        storage: &mut dyn Storage,
        to: &Addr,
        coins: &[Coin],
    ) -> Result<(), BridgeError> {
        for coin in coins {
            Self::add(storage, to, coin)?;
        }
        Ok(())
    }

    fn burn_coins(
        &self,
        storage: &mut dyn Storage,
        from: &Addr,
        coins: &[Coin],
    ) -> Result<(), BridgeError> {
        for coin in coins {
            Self::sub(storage, from, coin)?;
        }
        Ok(())
    }
}

// ============================================================================
// Mock accounts
// ============================================================================

#[derive(Default)]
pub struct MockAccounts {
    /// Addresses reported as nonexistent
    pub missing: RefCell<BTreeSet<String>>,
}

impl AccountKeeper for MockAccounts {
    fn has_account(&self, _storage: &dyn Storage, address: &Addr) -> bool {
        !self.missing.borrow().contains(address.as_str())
    }
}

// ============================================================================
// Mock EVM
// ============================================================================

const EVM_SEQ: Item<u64> = Item::new("mock_evm_seq");
const EVM_DECIMALS: Map<&[u8], u8> = Map::new("mock_evm_decimals");
const EVM_BALANCES: Map<(&[u8], &[u8]), Uint128> = Map::new("mock_evm_balances");
const EVM_SUPPLY: Map<&[u8], Uint128> = Map::new("mock_evm_supply");

#[derive(Default)]
pub struct MockEvm {
    pub deploy_count: Cell<u32>,
    pub fail_deploys: Cell<bool>,
    /// When set, calls with this selector revert
    pub fail_selector: Cell<Option<[u8; 4]>>,
}

impl MockEvm {
    fn vm_err(msg: impl Into<String>) -> BridgeError {
        BridgeError::VmExecution { msg: msg.into() }
    }

    fn transfer_log(contract: &EvmAddress, from: [u8; 32], to: [u8; 32], amount: u128) -> EvmLog {
        EvmLog {
            contract: *contract,
            topics: vec![
                MODULE_FRC20.abi.event_id("Transfer").unwrap(),
                from,
                to,
            ],
            data: encode_values(&[AbiValue::Uint(amount)]),
        }
    }
}

impl EvmKeeper for MockEvm {
    fn deploy(
        &self,
        storage: &mut dyn Storage,
        bytecode: &[u8],
        ctor_args: &[u8],
    ) -> Result<EvmAddress, BridgeError> {
        if self.fail_deploys.get() {
            return Err(Self::vm_err("deployment rejected"));
        }

        let decimals = if bytecode == &*MODULE_FRC20.bin {
            let values = decode_values(
                &[AbiType::String, AbiType::String, AbiType::Uint8],
                ctor_args,
            )?;
            values[2].as_uint8()?
        } else if bytecode == &*MODULE_FRC21.bin {
            let values = decode_values(&[AbiType::String, AbiType::Uint8], ctor_args)?;
            values[1].as_uint8()?
        } else {
            return Err(Self::vm_err("unknown bytecode"));
        };

        let seq = EVM_SEQ.may_load(storage)?.unwrap_or_default() + 1;
        EVM_SEQ.save(storage, &seq)?;

        let hash = common::keccak256(&seq.to_be_bytes());
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&hash[12..]);
        let address = EvmAddress::new(raw);

        EVM_DECIMALS.save(storage, address.as_bytes(), &decimals)?;
        EVM_SUPPLY.save(storage, address.as_bytes(), &Uint128::zero())?;
        self.deploy_count.set(self.deploy_count.get() + 1);
        Ok(address)
    }

    fn call(
        &self,
        storage: &mut dyn Storage,
        contract: &EvmAddress,
        calldata: &[u8],
    ) -> Result<CallResult, BridgeError> {
        if calldata.len() < 4 {
            return Err(Self::vm_err("calldata too short"));
        }
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&calldata[..4]);
        if self.fail_selector.get() == Some(selector) {
            return Err(Self::vm_err("call reverted"));
        }
        let args = &calldata[4..];

        let decimals = EVM_DECIMALS
            .may_load(storage, contract.as_bytes())?
            .ok_or_else(|| Self::vm_err(format!("no code at {}", contract)))?;

        let abi = &MODULE_FRC20.abi;
        if selector == abi.selector("decimals")? {
            return Ok(CallResult {
                data: encode_values(&[AbiValue::Uint8(decimals)]),
                logs: vec![],
            });
        }
        if selector == abi.selector("totalSupply")? {
            let supply = EVM_SUPPLY
                .may_load(storage, contract.as_bytes())?
                .unwrap_or_default();
            return Ok(CallResult {
                data: encode_values(&[AbiValue::Uint(supply.u128())]),
                logs: vec![],
            });
        }
        if selector == abi.selector("balanceOf")? {
            let values = decode_values(&[AbiType::Address], args)?;
            let holder = values[0].as_address()?;
            let balance = EVM_BALANCES
                .may_load(storage, (contract.as_bytes(), &holder.to_array()))?
                .unwrap_or_default();
            return Ok(CallResult {
                data: encode_values(&[AbiValue::Uint(balance.u128())]),
                logs: vec![],
            });
        }
        if selector == abi.selector("mint_by_elysium_module")? {
            let values = decode_values(&[AbiType::Address, AbiType::Uint256], args)?;
            let holder = values[0].as_address()?;
            let amount = values[1].as_uint()?;

            let key = (contract.as_bytes(), holder.to_array());
            let balance = EVM_BALANCES
                .may_load(storage, (key.0, &key.1))?
                .unwrap_or_default();
            EVM_BALANCES.save(storage, (key.0, &key.1), &(balance + Uint128::new(amount)))?;
            let supply = EVM_SUPPLY
                .may_load(storage, contract.as_bytes())?
                .unwrap_or_default();
            EVM_SUPPLY.save(storage, contract.as_bytes(), &(supply + Uint128::new(amount)))?;

            let mut to_topic = [0u8; 32];
            to_topic[12..].copy_from_slice(holder.as_bytes());
            return Ok(CallResult {
                data: vec![],
                logs: vec![Self::transfer_log(contract, [0u8; 32], to_topic, amount)],
            });
        }
        if selector == abi.selector("burn_by_elysium_module")? {
            let values = decode_values(&[AbiType::Address, AbiType::Uint256], args)?;
            let holder = values[0].as_address()?;
            let amount = values[1].as_uint()?;

            let key = (contract.as_bytes(), holder.to_array());
            let balance = EVM_BALANCES
                .may_load(storage, (key.0, &key.1))?
                .unwrap_or_default();
            let remaining = balance
                .checked_sub(Uint128::new(amount))
                .map_err(|_| Self::vm_err("burn amount exceeds balance"))?;
            EVM_BALANCES.save(storage, (key.0, &key.1), &remaining)?;
            let supply = EVM_SUPPLY
                .may_load(storage, contract.as_bytes())?
                .unwrap_or_default();
            EVM_SUPPLY.save(
                storage,
                contract.as_bytes(),
                &supply.checked_sub(Uint128::new(amount)).unwrap_or_default(),
            )?;

            let mut from_topic = [0u8; 32];
            from_topic[12..].copy_from_slice(holder.as_bytes());
            return Ok(CallResult {
                data: vec![],
                logs: vec![Self::transfer_log(contract, from_topic, [0u8; 32], amount)],
            });
        }

        Err(Self::vm_err("unknown method"))
    }
}

// ============================================================================
// Mock cross-chain transfer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SentTransfer {
    pub sender: String,
    pub recipient: String,
    pub coin: Coin,
    pub channel: String,
    pub timeout_ns: u64,
}

#[derive(Default)]
pub struct MockTransfer {
    pub fail: Cell<bool>,
    pub sent: RefCell<Vec<SentTransfer>>,
}

impl TransferKeeper for MockTransfer {
    fn initiate_transfer(
        &self,
        _storage: &mut dyn Storage,
        sender: &Addr,
        recipient: &str,
        coin: &Coin,
        channel: &str,
        timeout_ns: u64,
    ) -> Result<(), BridgeError> {
        if self.fail.get() {
            return Err(BridgeError::CrossChainInitiation {
                msg: "channel closed".to_string(),
            });
        }
        self.sent.borrow_mut().push(SentTransfer {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            coin: coin.clone(),
            channel: channel.to_string(),
            timeout_ns,
        });
        Ok(())
    }
}

// ============================================================================
// Test environment
// ============================================================================

pub type TestKeeper = Keeper<MockBank, MockAccounts, MockEvm, MockTransfer>;

pub struct TestEnv {
    pub storage: MockStorage,
    pub keeper: TestKeeper,
    pub authority: Addr,
    pub admin: Addr,
    pub user: Addr,
}

/// Setup with auto-deployment enabled, an admin, and a channel for the
/// default bridge voucher denom
pub fn setup() -> TestEnv {
    let admin = native_addr(0xAD);
    setup_with_params(Params {
        bridge_admin: admin.to_string(),
        enable_auto_deployment: true,
        ..Params::default()
    })
}

pub fn setup_with_params(params: Params) -> TestEnv {
    let mut storage = MockStorage::new();
    let authority = native_addr(0xA0);
    let admin = native_addr(0xAD);
    let user = native_addr(0x01);

    let genesis = GenesisState {
        params,
        source_channels: vec![SourceChannel {
            denom: bridge::params::IBC_ELY_DENOM_DEFAULT.to_string(),
            channel: CHANNEL.to_string(),
        }],
        ..GenesisState::default()
    };
    init_genesis(&mut storage, &genesis).unwrap();

    let keeper = Keeper::new(
        authority.clone(),
        MockBank,
        MockAccounts::default(),
        MockEvm::default(),
        MockTransfer::default(),
    );

    TestEnv {
        storage,
        keeper,
        authority,
        admin,
        user,
    }
}

impl TestEnv {
    pub fn fund(&mut self, address: &Addr, coins: &[Coin]) {
        self.keeper
            .bank
            .mint_coins(&mut self.storage, address, coins)
            .unwrap();
    }

    pub fn balance(&self, address: &Addr, denom: &str) -> Uint128 {
        self.keeper.bank.get_balance(&self.storage, address, denom)
    }

    /// Contract-side balance via the token's `balanceOf` entry point
    pub fn contract_balance(&mut self, contract: &EvmAddress, holder: &Addr) -> Uint128 {
        let calldata = MODULE_FRC20
            .abi
            .encode_call("balanceOf", &[AbiValue::Address(evm_alias(holder))])
            .unwrap();
        let result = self
            .keeper
            .evm
            .call(&mut self.storage, contract, &calldata)
            .unwrap();
        let values = MODULE_FRC20.abi.decode_output("balanceOf", &result.data).unwrap();
        Uint128::new(values[0].as_uint().unwrap())
    }

    pub fn total_supply(&mut self, contract: &EvmAddress) -> Uint128 {
        let calldata = MODULE_FRC20.abi.encode_call("totalSupply", &[]).unwrap();
        let result = self
            .keeper
            .evm
            .call(&mut self.storage, contract, &calldata)
            .unwrap();
        let values = MODULE_FRC20
            .abi
            .decode_output("totalSupply", &result.data)
            .unwrap();
        Uint128::new(values[0].as_uint().unwrap())
    }
}

/// Build a log as the module tokens emit it: the event id as first topic,
/// the non-indexed arguments ABI-encoded in the data section
pub fn make_log(contract: &EvmAddress, event: &str, values: &[AbiValue]) -> EvmLog {
    EvmLog {
        contract: *contract,
        topics: vec![MODULE_FRC20.abi.event_id(event).unwrap()],
        data: encode_values(values),
    }
}
