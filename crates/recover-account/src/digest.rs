//! Digest of the demo access message.

use alloy::primitives::{keccak256, U256};
use recover_types::{Address, Bytes32};

/// Hash of an access grant, laid out like Solidity's
/// `keccak256(abi.encodePacked(from, to, amount, allowed))`:
/// two 20-byte addresses, a 32-byte big-endian amount and one byte for the
/// flag.
pub fn access_digest(from: &Address, to: &Address, amount: U256, allowed: bool) -> Bytes32 {
	let mut packed = Vec::with_capacity(20 + 20 + 32 + 1);
	packed.extend_from_slice(from.as_bytes());
	packed.extend_from_slice(to.as_bytes());
	packed.extend_from_slice(&amount.to_be_bytes::<32>());
	packed.push(allowed as u8);

	keccak256(&packed).into()
}
