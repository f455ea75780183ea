//! Room Relay Gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p relay-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use relay_common::{init_tracing, AppConfig, AppError, Environment, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().map_err(AppError::from);

    // Log format follows APP_ENV; fall back to development output if config is invalid
    let env = config
        .as_ref()
        .map_or(Environment::Development, |config| config.app.env);
    if let Err(e) = init_tracing(&TracingConfig::for_environment(env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "Failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        address = %config.gateway.address(),
        echo_to_sender = config.relay.echo_to_sender,
        announce_departures = config.relay.announce_departures,
        "Starting Room Relay Gateway..."
    );

    if let Err(e) = relay_gateway::run(config).await {
        error!(error = %e, code = e.error_code(), "Gateway failed");
        std::process::exit(1);
    }
}
