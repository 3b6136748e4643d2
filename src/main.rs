use std::process::ExitCode;

use tracing::{error, info};

use feedcast::{Application, Config};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration; without it there is nothing to serve.
    let path = Config::path_from_env();
    let config = match Config::load_with_env(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    if let Err(e) = feedcast::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        feedcast::logging::init_console_only(&config.logging.level);
    }

    info!(
        "feedcast serving {} feed(s) on {}:{}",
        config.feeds.sources.len(),
        config.server.host,
        config.server.port
    );

    let app = match Application::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to start: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = app.run().await {
        error!("Server stopped: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
