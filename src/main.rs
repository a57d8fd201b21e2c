//! Pocket Network transfer-and-relay client.
//!
//! # Flow
//!
//! ```text
//!   environment ──▶ DemoConfig
//!                      │
//!                      ▼
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ scenario                                                     │
//!   │   provider ─ keys ─ AAT ─ height ─ transfer ─ dispatch ─ relay │
//!   └──────────────────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//!   stdout: height, transaction hash, relay response
//!   stderr: logs and errors
//! ```
//!
//! Exit code 0 on success, 1 on any error.

use std::process::ExitCode;

use pocket_relay::config::load_from_env;
use pocket_relay::observability::logging::{init_logging, DEFAULT_LOG_FILTER};
use pocket_relay::{run_scenario, DemoResult, PocketToolkit};

#[tokio::main]
async fn main() -> ExitCode {
    // Optional .env in the working directory
    dotenvy::dotenv().ok();

    init_logging(DEFAULT_LOG_FILTER);
    tracing::info!("pocket-relay v{} starting", env!("CARGO_PKG_VERSION"));

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DemoResult<()> {
    let config = load_from_env()?;

    tracing::info!(
        endpoint = %config.endpoint,
        network = %config.transfer.chain_id,
        relay_chain = %config.relay.chain,
        "Configuration loaded"
    );

    let toolkit = PocketToolkit::new(&config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_scenario(&config, &toolkit, &mut out).await?;

    tracing::info!("Scenario complete");
    Ok(())
}
