//! Common - Shared EVM Primitives for the Elysium Bridge
//!
//! This package provides the low-level types and functions shared by the
//! bridge module and its tests:
//! - 20-byte EVM addresses with hex and bech32 representations
//! - keccak256 hashing and event-signature derivation
//! - a minimal ABI word codec for the module token interface

pub mod abi;
pub mod address;
pub mod hash;

pub use abi::{Abi, AbiType, AbiValue};
pub use address::{decode_native_address, encode_native_address, EvmAddress, ACCOUNT_HRP};
pub use hash::{event_signature_hash, keccak256};
