#![cfg(not(tarpaulin_include))]

use env_logger::Env;
use registration::{app, Config};

/// Main entry point for the web application
///
/// Reads the configuration from the environment (see [`Config::load`]) and
/// serves the registration form until the process is stopped.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::load()?;
    app::run(config).await
}
