//! labrig CLI entry point.

use clap::Parser;
use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use labrig::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let directive = if cli.debug { "labrig=debug" } else { "labrig=info" };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    cli.execute(&cancel).await
}
