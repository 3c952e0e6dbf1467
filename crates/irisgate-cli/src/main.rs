//! `irisgate` -- serve iris species predictions over HTTP.
//!
//! - `irisgate serve` -- load the model artifact and run the HTTP service.
//! - `irisgate predict` -- run one prediction offline and print the JSON.

use clap::{Parser, Subcommand};

mod predict;
mod serve;

#[derive(Parser)]
#[command(name = "irisgate", about = "Iris species prediction service", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP prediction service.
    Serve(serve::ServeArgs),

    /// Classify one JSON payload without starting a server.
    Predict(predict::PredictArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("irisgate v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Predict(args) => predict::run(args),
    }
}
