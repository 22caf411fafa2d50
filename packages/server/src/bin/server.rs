//! Multi-room WebSocket chat relay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomhub-server
//! cargo run --bin roomhub-server -- --host 0.0.0.0 --port 3000 --wire-format json
//! ```

use clap::Parser;
use roomhub_server::{
    app::build_server,
    config::{Args, ServerConfig},
};
use roomhub_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = match ServerConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Starting with default room '{}', history limit {}, wire format {}",
        config.default_room,
        config.history_limit,
        config.wire_format
    );

    let server = match build_server(&config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to open message store: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = server.run(config.host.clone(), config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
