//! FraudWatch Client - Main Entry Point
//!
//! Headless operator console: loads the dashboard, follows the live stream and
//! reads commands from stdin.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use fraudwatch_client::api::commands::{self, Command};
use fraudwatch_client::constants::{APP_NAME, APP_VERSION};
use fraudwatch_client::{App, ClientConfig};

// Single-threaded like the browser event loop it replaces
#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = ClientConfig::from_env();
    log::info!("   Backend: {}", config.backend.base_url);
    log::info!("   Window: {} samples", config.window_cap);
    log::info!(
        "   Stream reconnect: {} (delay {:?}, max {:?})",
        config.reconnect.enabled,
        config.reconnect.delay,
        config.reconnect.max_attempts
    );

    let (app, pump) = match App::new(config) {
        Ok(parts) => parts,
        Err(e) => {
            log::error!("Failed to create backend client: {}", e);
            std::process::exit(1);
        }
    };

    tokio::spawn(pump.run());
    let app = Arc::new(app);
    let _stream = app.start().await;

    println!("{}", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read stdin: {}", e);
                break;
            }
        };

        match commands::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                // Flows run independently; a slow upload never blocks the console
                let app = app.clone();
                tokio::spawn(async move {
                    for out in commands::execute(&app, command).await {
                        println!("{}", out);
                    }
                });
            }
            Err(e) => println!("{}", e),
        }
    }

    log::info!("{} stopped", APP_NAME);
}
