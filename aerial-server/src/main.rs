//! Binary entry point for the aerial view HTTP service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments (bind address and port)
//! - Initializing tracing
//! - Wiring the configuration into the router and serving it

use clap::Parser;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "aerial-server", version, about = "Aerial view HTTP service")]
struct Args {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = aerial_core::Config::load()?;

    aerial_server::http::serve(config, &args.host, args.port).await
}
