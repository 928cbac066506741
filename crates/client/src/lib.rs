//! Client SDK for the campus hub marketplace API.
//!
//! The entry point is [`HubClient`]: it owns a JWT session with
//! transparent refresh, a retrying transport, and a set of state stores
//! (catalog, cart, account, UI) that mirror server state locally. All
//! handles are cheap clones sharing one underlying state, so a UI layer
//! can hand them out freely.
//!
//! ```no_run
//! use campus_hub_client::{HubClient, HubConfig};
//! use url::Url;
//!
//! # async fn run() -> Result<(), campus_hub_client::ApiError> {
//! let config = HubConfig::new(Url::parse("https://hub.example.edu").unwrap());
//! let hub = HubClient::new(config)?;
//! hub.startup().await;
//!
//! hub.session().login("maria", "hunter2").await?;
//! hub.catalog().list().await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod config;
mod error;
pub mod models;
mod session;
pub mod storage;
mod stores;
mod transport;

pub use client::HubClient;
pub use config::{ConfigError, HubConfig};
pub use error::{ApiError, ErrorPayload, Result};
pub use session::{SessionPhase, SessionState, SessionStore};
pub use storage::{DiskStorage, LocalStorage, MemoryStorage, StorageHandle};
pub use stores::{
    CartState, CartStore, CatalogState, CatalogStore, Notice, NoticeLevel, UiState, UiStore,
    UserState, UserStore,
};
