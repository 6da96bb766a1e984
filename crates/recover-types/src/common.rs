//! Fixed-size byte types used throughout the workspace.
//!
//! Each type is displayed and serialized as a `0x`-prefixed lowercase hex
//! string, and parsed from hex with or without the prefix.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a hex string cannot be turned into a fixed-size value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
	#[error("Invalid hex: {0}")]
	InvalidHex(String),
	#[error("Expected {expected} bytes, got {actual}")]
	InvalidLength { expected: usize, actual: usize },
}

/// Decodes a hex string, tolerating an optional `0x` prefix.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, HexError> {
	let stripped = value.strip_prefix("0x").unwrap_or(value);
	hex::decode(stripped).map_err(|e| HexError::InvalidHex(e.to_string()))
}

macro_rules! fixed_bytes {
	($(#[$meta:meta])* $name:ident, $len:expr) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
		pub struct $name(pub [u8; $len]);

		impl $name {
			pub fn as_bytes(&self) -> &[u8; $len] {
				&self.0
			}

			pub fn from_slice(bytes: &[u8]) -> Result<Self, HexError> {
				let array: [u8; $len] =
					bytes.try_into().map_err(|_| HexError::InvalidLength {
						expected: $len,
						actual: bytes.len(),
					})?;
				Ok(Self(array))
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "0x{}", hex::encode(self.0))
			}
		}

		impl FromStr for $name {
			type Err = HexError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::from_slice(&decode_hex(s)?)
			}
		}

		impl From<[u8; $len]> for $name {
			fn from(bytes: [u8; $len]) -> Self {
				Self(bytes)
			}
		}

		impl Serialize for $name {
			fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
				serializer.serialize_str(&self.to_string())
			}
		}

		impl<'de> Deserialize<'de> for $name {
			fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
				let s = String::deserialize(deserializer)?;
				s.parse().map_err(serde::de::Error::custom)
			}
		}
	};
}

fixed_bytes!(
	/// A 32-byte word: message digests and block hashes.
	Bytes32,
	32
);

fixed_bytes!(
	/// A 20-byte account or contract address.
	Address,
	20
);

fixed_bytes!(
	/// Identifier correlating a submitted transaction to its receipt.
	TransactionHash,
	32
);

impl From<alloy::primitives::Address> for Address {
	fn from(addr: alloy::primitives::Address) -> Self {
		Self(addr.into_array())
	}
}

impl From<Address> for alloy::primitives::Address {
	fn from(addr: Address) -> Self {
		alloy::primitives::Address::from(addr.0)
	}
}

impl From<alloy::primitives::B256> for TransactionHash {
	fn from(hash: alloy::primitives::B256) -> Self {
		Self(hash.0)
	}
}

impl From<TransactionHash> for alloy::primitives::B256 {
	fn from(hash: TransactionHash) -> Self {
		alloy::primitives::B256::from(hash.0)
	}
}

impl From<alloy::primitives::B256> for Bytes32 {
	fn from(word: alloy::primitives::B256) -> Self {
		Self(word.0)
	}
}

impl From<Bytes32> for alloy::primitives::B256 {
	fn from(word: Bytes32) -> Self {
		alloy::primitives::B256::from(word.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_address_parse_with_and_without_prefix() {
		let with_prefix: Address = "0x5B38Da6a701c568545dCfcB03FcB875f56beddC4".parse().unwrap();
		let without_prefix: Address = "5b38da6a701c568545dcfcb03fcb875f56beddc4".parse().unwrap();

		assert_eq!(with_prefix, without_prefix);
		assert_eq!(
			with_prefix.to_string(),
			"0x5b38da6a701c568545dcfcb03fcb875f56beddc4"
		);
	}

	#[test]
	fn test_wrong_length_rejected() {
		let err = "0x1234".parse::<TransactionHash>().unwrap_err();
		assert_eq!(
			err,
			HexError::InvalidLength {
				expected: 32,
				actual: 2
			}
		);

		assert!(matches!(
			"0xzz".parse::<Address>(),
			Err(HexError::InvalidHex(_))
		));
	}

	#[test]
	fn test_serializes_as_hex_string() {
		let hash = TransactionHash([0xab; 32]);
		let json = serde_json::to_string(&hash).unwrap();
		assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));

		let back: TransactionHash = serde_json::from_str(&json).unwrap();
		assert_eq!(back, hash);
	}
}
