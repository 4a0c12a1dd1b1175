//! `sentinel` -- UrbanSentinel monitoring client.
//!
//! Signs in against the REST API, manages cameras, follows live video
//! and notifications, and builds incident reports.
//!
//! # Environment variables
//!
//! | Variable                        | Default                               |
//! |---------------------------------|---------------------------------------|
//! | `SENTINEL_API_URL`              | `http://localhost:8000`               |
//! | `SENTINEL_API_WS_URL`           | `ws://127.0.0.1:8000`                 |
//! | `SENTINEL_STREAM_URL`           | `http://localhost:8010`               |
//! | `SENTINEL_STREAM_WS_URL`        | `ws://127.0.0.1:8010`                 |
//! | `SENTINEL_SESSION_FILE`         | `$HOME/.config/sentinel/session.json` |
//! | `SENTINEL_REQUEST_TIMEOUT_SECS` | `30`                                  |

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel_cli::cli::Cli;
use sentinel_cli::config::ClientConfig;
use sentinel_cli::context::AppContext;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sentinel_cli=info,sentinel_stream=info,sentinel_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // --- Configuration ---
    let config = ClientConfig::from_env()?;
    tracing::debug!(
        api_url = %config.api_url,
        stream_url = %config.stream_url,
        session_file = %config.session_file.display(),
        "Loaded client configuration",
    );

    let ctx = AppContext::new(config)?;
    sentinel_cli::commands::run(&ctx, cli).await
}
