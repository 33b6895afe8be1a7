use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazar::api::ClientError;
use bazar::cli::{run_command, Cli};
use bazar::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let base_url = config.resolve_base_url(cli.api_url.as_deref()).to_string();
    tracing::debug!("Bazar v{} using {}", env!("CARGO_PKG_VERSION"), base_url);

    if let Err(e) = run_command(&cli, &config).await {
        match e.downcast_ref::<ClientError>() {
            Some(client_error) => eprintln!("{}", client_error.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}
