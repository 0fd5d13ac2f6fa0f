//! Keccak hashing helpers.

use tiny_keccak::{Hasher, Keccak};

/// Compute keccak256 hash of arbitrary data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Event id of a canonical event signature, e.g.
/// `__ElysiumSendToAccount(address,uint256)`. Emitted as the first topic of
/// every non-anonymous log.
pub fn event_signature_hash(signature: &str) -> [u8; 32] {
    keccak256(signature.as_bytes())
}
