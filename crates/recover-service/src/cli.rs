//! Command-line interface definitions.

use clap::Parser;
use recover_config::Overrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "recover-check")]
#[command(about = "Deploy the Recover contract and check on-chain signer recovery", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
	/// JSON-RPC endpoint of the node
	#[arg(long = "eth", value_name = "URL")]
	pub eth: Option<String>,

	/// Hex private key used to send transactions
	#[arg(long = "sk", value_name = "HEX")]
	pub sk: Option<String>,

	/// Hex private key that signs the message digest (defaults to --sk)
	#[arg(long, value_name = "HEX")]
	pub signer_key: Option<String>,

	/// Optional TOML configuration file
	#[arg(short, long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, env = "RECOVER_LOG_LEVEL", default_value = "info")]
	pub log_level: String,
}

impl Args {
	/// Values that override the file and environment.
	pub fn overrides(&self) -> Overrides {
		Overrides {
			rpc_url: self.eth.clone(),
			private_key: self.sk.clone(),
			signer_key: self.signer_key.clone(),
		}
	}
}
