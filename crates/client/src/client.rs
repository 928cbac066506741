//! The top-level client handle wiring session, transport, and stores
//! together.

use std::sync::Arc;

use tracing::instrument;

use crate::config::HubConfig;
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::storage::{DiskStorage, LocalStorage, StorageHandle};
use crate::stores::{CartStore, CatalogStore, UiStore, UserStore};
use crate::transport::Transport;

/// Handle to the whole client: one session, one transport, one set of
/// stores. Cheaply cloneable; every clone shares the same state.
#[derive(Clone)]
pub struct HubClient {
    inner: Arc<HubClientInner>,
}

struct HubClientInner {
    config: HubConfig,
    session: SessionStore,
    catalog: CatalogStore,
    cart: CartStore,
    user: UserStore,
    ui: UiStore,
}

impl HubClient {
    /// Create a client with token storage on disk at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(config: HubConfig) -> Result<Self, ApiError> {
        let storage = Arc::new(DiskStorage::open(&config.storage_path));
        Self::with_storage(config, storage)
    }

    /// Create a client over an injected storage backend.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn with_storage(
        config: HubConfig,
        storage: Arc<dyn LocalStorage>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let storage = StorageHandle::new(storage);
        let session = SessionStore::new(http.clone(), &config.base_url, storage.clone());
        let transport = Transport::new(http, &config.base_url, session.clone(), storage.clone());

        let ui = UiStore::new(storage);
        let catalog = CatalogStore::new(transport.clone(), ui.clone());
        let cart = CartStore::new(transport.clone(), ui.clone());
        let user = UserStore::new(transport, ui.clone());

        Ok(Self {
            inner: Arc::new(HubClientInner {
                config,
                session,
                catalog,
                cart,
                user,
                ui,
            }),
        })
    }

    /// Validate stored credentials against the server. Call once after
    /// construction; a stale token downgrades the session silently.
    #[instrument(skip(self))]
    pub async fn startup(&self) {
        self.inner.session.check_status().await;
    }

    /// Log out and clear all per-user state.
    pub fn logout(&self) {
        self.inner.session.logout();
        self.inner.cart.reset();
        self.inner.user.reset();
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn user(&self) -> &UserStore {
        &self.inner.user
    }

    #[must_use]
    pub fn ui(&self) -> &UiStore {
        &self.inner.ui
    }

    #[must_use]
    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }
}
