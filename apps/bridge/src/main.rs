use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vsg_snapshot::{
	default_decoder, GeneratorConfig, ThumbnailChannel, ThumbnailGenerator, CHANNEL_NAME,
};

mod server;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
	Text,
	Json,
}

#[derive(Parser, Debug)]
#[command(
	name = "vsg-bridge",
	version,
	about = "Serves video thumbnail method calls as JSON lines on stdin/stdout"
)]
struct Cli {
	/// JSON file with generator settings
	#[arg(long)]
	config: Option<PathBuf>,

	/// Overrides `max_concurrent_decodes` from the config file
	#[arg(long)]
	max_concurrent_decodes: Option<usize>,

	/// Log output format, logs always go to stderr
	#[arg(long, value_enum, default_value = "text")]
	log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	init_tracing(cli.log_format);

	let mut config = match &cli.config {
		Some(path) => GeneratorConfig::load(path)
			.await
			.with_context(|| format!("Unable to load config from {}", path.display()))?,
		None => GeneratorConfig::default(),
	};

	if let Some(max_concurrent_decodes) = cli.max_concurrent_decodes {
		config.max_concurrent_decodes = max_concurrent_decodes;
	}
	config.validate()?;

	let decoder = default_decoder();
	info!(
		channel = CHANNEL_NAME,
		decoder = decoder.name(),
		available = decoder.is_available(),
		?config,
		"Starting bridge"
	);

	let channel = ThumbnailChannel::new(ThumbnailGenerator::new(decoder, config));

	server::serve(channel, tokio::io::stdin(), tokio::io::stdout()).await?;

	info!("Input closed, shutting down");

	Ok(())
}

fn init_tracing(format: LogFormat) {
	// Stdout carries the protocol, so logs go to stderr
	let (text, json) = match format {
		LogFormat::Text => (Some(fmt::layer().with_writer(io::stderr)), None),
		LogFormat::Json => (None, Some(fmt::layer().json().with_writer(io::stderr))),
	};

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(text)
		.with(json)
		.init();
}
