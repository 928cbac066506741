//! Integration tests for the campus hub client.
//!
//! Every test runs against a fresh [`wiremock::MockServer`] standing in
//! for the hub API, with tokens held in a [`MemoryStorage`] so nothing
//! touches disk.
//!
//! ```bash
//! cargo test -p campus-hub-integration-tests
//! ```

use std::sync::Arc;

use campus_hub_client::{
    HubClient, HubConfig, LocalStorage, MemoryStorage, StorageHandle,
};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One client wired to one mock server.
pub struct TestContext {
    pub server: MockServer,
    pub hub: HubClient,
    storage: StorageHandle,
}

impl TestContext {
    /// A logged-out client.
    pub async fn new() -> Self {
        Self::build(false).await
    }

    /// A client with seeded tokens (`access-0` / `refresh-0`), as if a
    /// previous session had persisted them.
    pub async fn authenticated() -> Self {
        Self::build(true).await
    }

    async fn build(seed_tokens: bool) -> Self {
        let server = MockServer::start().await;

        let backing: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        let storage = StorageHandle::new(backing.clone());
        if seed_tokens {
            storage.set_tokens("access-0", "refresh-0");
        }

        let config = HubConfig::new(Url::parse(&server.uri()).expect("mock server uri"));
        let hub = HubClient::with_storage(config, backing).expect("client construction");

        Self {
            server,
            hub,
            storage,
        }
    }

    /// The access token currently in storage, if any.
    pub fn stored_access_token(&self) -> Option<String> {
        self.storage
            .access_token()
            .map(|t| t.expose_secret().to_string())
    }

    /// The refresh token currently in storage, if any.
    pub fn stored_refresh_token(&self) -> Option<String> {
        self.storage
            .refresh_token()
            .map(|t| t.expose_secret().to_string())
    }

    /// Whether storage holds a complete access/refresh pair.
    pub fn has_stored_credentials(&self) -> bool {
        self.storage.has_credentials()
    }

    /// Mount a refresh endpoint that rotates to the given access token.
    pub async fn mock_refresh_success(&self, access: &str) {
        Mock::given(method("POST"))
            .and(path("/api/token/refresh/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access": access })),
            )
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Mount a refresh endpoint that rejects the stored credential.
    pub async fn mock_refresh_failure(&self) {
        Mock::given(method("POST"))
            .and(path("/api/token/refresh/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "Token is invalid or expired"
            })))
            .mount(&self.server)
            .await;
    }
}

/// A catalog item as the API renders it.
pub fn item_json(id: i64, name: &str, price: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} in good condition"),
        "category": "other",
        "category_display": "Other",
        "price": price,
        "is_active": true,
        "created_at": "2026-08-01T10:00:00Z",
    })
}

/// A cart line holding `quantity` of an item priced `price`.
pub fn cart_entry_json(entry_id: i64, item_id: i64, price: &str, quantity: u32) -> Value {
    json!({
        "id": entry_id,
        "item": item_json(item_id, &format!("item-{item_id}"), price),
        "quantity": quantity,
    })
}

/// A DRF-style paginated envelope.
pub fn paginated_json(results: Vec<Value>, count: u64) -> Value {
    json!({
        "results": results,
        "count": count,
        "next": null,
        "previous": null,
    })
}
