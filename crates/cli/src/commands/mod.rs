//! Command implementations, one module per top-level noun.

pub mod account;
pub mod auth;
pub mod cart;
pub mod items;

use campus_hub_client::{ApiError, ConfigError, HubClient, HubConfig};
use thiserror::Error;

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Invalid category: {0}. Valid categories: textbook, equipment, decor, appliance, other")]
    InvalidCategory(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Cannot read image {path}: {source}")]
    ImageRead {
        path: String,
        source: std::io::Error,
    },
}

/// Build a client from the environment and validate stored credentials.
pub async fn connect() -> Result<HubClient, CliError> {
    dotenvy::dotenv().ok();

    let config = HubConfig::from_env()?;
    let hub = HubClient::new(config)?;
    hub.startup().await;
    Ok(hub)
}
