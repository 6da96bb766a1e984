//! Binding for the `Recover` contract.
//!
//! The contract exposes a single view function,
//! `recover(bytes32 hash, bytes sig) returns (address)`, which splits the
//! 65-byte signature into `r`, `s` and `v`, lifts `v` from {0, 1} to
//! {27, 28} when needed, and returns what the `ecrecover` precompile gives
//! back (the zero address for an invalid signature).

use alloy::primitives::{hex, Bytes, B256};
use alloy::sol;
use alloy::sol_types::SolCall;
use recover_types::{Address, Bytes32, CheckError, Signature};

sol! {
	interface IRecover {
		function recover(bytes32 hash, bytes memory sig) external view returns (address);
	}
}

/// Creation code: an 11-byte constructor that copies and returns the
/// 65-byte runtime below.
///
/// Runtime, reading ABI-encoded `(bytes32, bytes)` calldata:
///
/// ```text
/// mstore(0x00, calldataload(0x04))                  hash
/// base := add(calldataload(0x24), 0x04)             length word of sig
/// mstore(0x40, calldataload(add(base, 0x20)))       r
/// mstore(0x60, calldataload(add(base, 0x40)))       s
/// v := byte(0, calldataload(add(base, 0x60)))
/// mstore(0x20, add(v, mul(lt(v, 27), 27)))
/// pop(staticcall(gas(), 0x01, 0x00, 0x80, 0x80, 0x20))
/// return(0x80, 0x20)
/// ```
const CREATION_CODE: [u8; 76] = hex!(
	"604180600b6000396000f3600435600052602435600401806020013560405280604001356060526060013560001a80601b9010601b0201602052602060806080600060015afa5060206080f3"
);

/// Bytecode deployed by the check.
pub fn creation_code() -> Vec<u8> {
	CREATION_CODE.to_vec()
}

/// Calldata for `recover(hash, sig)`.
pub fn encode_recover(hash: &Bytes32, signature: &Signature) -> Vec<u8> {
	IRecover::recoverCall {
		hash: B256::from(*hash),
		sig: Bytes::copy_from_slice(signature.as_bytes()),
	}
	.abi_encode()
}

/// Decodes the single `address` word returned by `recover`.
pub fn decode_address(output: &[u8]) -> Result<Address, CheckError> {
	if output.len() != 32 {
		return Err(CheckError::Decode(format!(
			"recover returned {} bytes, expected one 32-byte word",
			output.len()
		)));
	}

	if output[..12].iter().any(|b| *b != 0) {
		return Err(CheckError::Decode(format!(
			"recover returned a non-address word 0x{}",
			hex::encode(output)
		)));
	}

	Address::from_slice(&output[12..]).map_err(|e| CheckError::Decode(e.to_string()))
}
