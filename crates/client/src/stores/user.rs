//! Account store: the authenticated user's profile, own listings, and
//! order history.

use std::sync::{Arc, RwLock};

use campus_hub_core::OrderId;
use tracing::instrument;

use crate::error::{ApiError, ErrorPayload};
use crate::models::{Item, Listing, Order, ProfilePatch, UserProfile};
use crate::stores::ui::UiStore;
use crate::transport::Transport;

/// Account state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    pub profile: Option<UserProfile>,
    /// Listings created by this user.
    pub items: Vec<Item>,
    pub orders: Vec<Order>,
    pub loading: bool,
    pub error: Option<ErrorPayload>,
}

/// Account store. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct UserStore {
    inner: Arc<UserInner>,
}

struct UserInner {
    transport: Transport,
    ui: UiStore,
    state: RwLock<UserState>,
}

/// Fold an update response into the cached profile.
///
/// The server may answer with the full profile or only the changed
/// fields. A partial answer is merged shallowly so untouched fields
/// survive; with no cached profile, only a full answer is usable.
fn apply_profile_update(profile: &mut Option<UserProfile>, body: &serde_json::Value) {
    if let Ok(full) = serde_json::from_value::<UserProfile>(body.clone()) {
        *profile = Some(full);
        return;
    }
    if let (Some(existing), Ok(patch)) = (
        profile.as_mut(),
        serde_json::from_value::<ProfilePatch>(body.clone()),
    ) {
        patch.apply_to(existing);
    }
}

impl UserStore {
    pub(crate) fn new(transport: Transport, ui: UiStore) -> Self {
        Self {
            inner: Arc::new(UserInner {
                transport,
                ui,
                state: RwLock::new(UserState::default()),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> UserState {
        self.read(Clone::clone)
    }

    /// Fetch the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.begin();

        match self.inner.transport.get::<UserProfile>("/api/profile/", &[]).await {
            Ok(profile) => {
                self.write(|state| {
                    state.loading = false;
                    state.profile = Some(profile.clone());
                });
                Ok(profile)
            }
            Err(e) => Err(self.fail(e, "Failed to fetch profile")),
        }
    }

    /// Send a partial profile update and fold the response into the
    /// cached profile.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<(), ApiError> {
        self.begin();

        let result = self
            .inner
            .transport
            .patch_json::<_, serde_json::Value>("/api/profile/update/", patch)
            .await;

        match result {
            Ok(body) => {
                self.write(|state| {
                    state.loading = false;
                    apply_profile_update(&mut state.profile, &body);
                });
                self.inner.ui.notify_success("Profile updated successfully!");
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to update profile")),
        }
    }

    /// Fetch the user's own listings.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self))]
    pub async fn fetch_my_items(&self) -> Result<(), ApiError> {
        self.begin();

        match self.inner.transport.get::<Listing<Item>>("/api/my-items/", &[]).await {
            Ok(listing) => {
                let (items, _) = listing.into_parts();
                self.write(|state| {
                    state.loading = false;
                    state.items = items;
                });
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to fetch your items")),
        }
    }

    /// Fetch the user's order history.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self))]
    pub async fn fetch_orders(&self) -> Result<(), ApiError> {
        self.begin();

        match self.inner.transport.get::<Listing<Order>>("/api/orders/", &[]).await {
            Ok(listing) => {
                let (orders, _) = listing.into_parts();
                self.write(|state| {
                    state.loading = false;
                    state.orders = orders;
                });
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to fetch orders")),
        }
    }

    /// Cancel a pending order. The server's updated order replaces the
    /// matching one in the history.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, ApiError> {
        self.begin();

        let path = format!("/api/orders/{order_id}/cancel_order/");
        let result = self
            .inner
            .transport
            .post_json::<_, Order>(&path, &serde_json::json!({}))
            .await;

        match result {
            Ok(order) => {
                self.write(|state| {
                    state.loading = false;
                    if let Some(slot) = state.orders.iter_mut().find(|o| o.id == order_id) {
                        *slot = order.clone();
                    }
                });
                self.inner.ui.notify_success("Order cancelled");
                Ok(order)
            }
            Err(e) => Err(self.fail(e, "Failed to cancel order")),
        }
    }

    /// Clear the stored error payload.
    pub fn clear_error(&self) {
        self.write(|state| state.error = None);
    }

    /// Reset to the initial empty state (logout).
    pub(crate) fn reset(&self) {
        self.write(|state| *state = UserState::default());
    }

    fn begin(&self) {
        self.write(|state| {
            state.loading = true;
            state.error = None;
        });
    }

    fn fail(&self, error: ApiError, fallback: &str) -> ApiError {
        let payload = error.to_payload(fallback);
        self.write(|state| {
            state.loading = false;
            state.error = Some(payload.clone());
        });
        self.inner.ui.notify_error(payload.message);
        error
    }

    fn read<R>(&self, f: impl FnOnce(&UserState) -> R) -> R {
        f(&self
            .inner
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut UserState) -> R) -> R {
        f(&mut self
            .inner
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_hub_core::UserId;
    use serde_json::json;

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new(7),
            username: "maria".to_string(),
            email: "maria@campus.edu".to_string(),
            first_name: "Maria".to_string(),
            last_name: "Santos".to_string(),
            date_joined: None,
            items_count: 4,
            messages_count: 2,
        }
    }

    #[test]
    fn test_partial_response_merges_shallowly() {
        let mut cached = Some(profile());
        apply_profile_update(&mut cached, &json!({ "first_name": "Mari" }));

        let merged = cached.as_ref().unwrap();
        assert_eq!(merged.first_name, "Mari");
        assert_eq!(merged.email, "maria@campus.edu");
        assert_eq!(merged.items_count, 4);
    }

    #[test]
    fn test_full_response_replaces_profile() {
        let mut cached = Some(profile());
        let full = json!({
            "id": 7,
            "username": "maria_s",
            "email": "new@campus.edu",
            "first_name": "Maria",
            "last_name": "Santos",
            "date_joined": null,
            "items_count": 5,
            "messages_count": 2,
        });
        apply_profile_update(&mut cached, &full);

        let replaced = cached.as_ref().unwrap();
        assert_eq!(replaced.username, "maria_s");
        assert_eq!(replaced.items_count, 5);
    }

    #[test]
    fn test_partial_response_without_cached_profile_is_ignored() {
        let mut cached = None;
        apply_profile_update(&mut cached, &json!({ "first_name": "Mari" }));
        assert!(cached.is_none());
    }
}
