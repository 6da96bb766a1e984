use anyhow::{Context, Result};
use clap::Parser;
use recover_account::{AccountInterface, LocalWallet};
use recover_config::ConfigLoader;
use recover_delivery::AlloyDelivery;
use recover_service::cli::Args;
use recover_service::RecoverCheck;
use recover_types::CheckError;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	let args = Args::parse();

	setup_tracing(&args.log_level)?;

	if let Err(e) = run(args).await {
		error!("{:#}", e);
		std::process::exit(1);
	}

	Ok(())
}

async fn run(args: Args) -> Result<()> {
	let mut loader = ConfigLoader::new().with_overrides(args.overrides());
	if let Some(path) = &args.config {
		info!("Loading configuration from: {:?}", path);
		loader = loader.with_file(path);
	}

	let config = loader
		.load()
		.await
		.map_err(CheckError::from)
		.context("Failed to load configuration")?;

	let delivery = AlloyDelivery::new(&config.network.rpc_url).map_err(CheckError::from)?;

	let account: Arc<dyn AccountInterface> = Arc::new(
		LocalWallet::new(&config.network.private_key)
			.map_err(CheckError::from)
			.context("Failed to load transaction key")?,
	);
	let message_signer: Arc<dyn AccountInterface> = Arc::new(
		LocalWallet::new(config.signer_key())
			.map_err(CheckError::from)
			.context("Failed to load signer key")?,
	);

	let report = RecoverCheck::new(config, Arc::new(delivery), account, message_signer)
		.run()
		.await?;

	info!(
		chain_id = report.chain_id,
		contract = %report.contract,
		gas_used = report.receipt.gas_used,
		attempts = report.attempts.len(),
		"Recover check passed"
	);

	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
		.context("Invalid log level")?;

	// Logs go to stderr; stdout carries the diagnostic values
	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	Ok(())
}
