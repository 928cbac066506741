//! Cart store: contents, derived totals, and checkout.
//!
//! Totals follow one rule: a wholesale server payload (fetch, checkout,
//! add-with-snapshot) is authoritative and applied as-is; a local-only
//! mutation (remove, quantity update) recomputes them from the resulting
//! entries. The recomputation is a pure function of the entries.

use std::sync::{Arc, RwLock};

use campus_hub_core::{CartEntryId, ItemId, Price};
use serde_json::json;
use tracing::instrument;

use crate::error::{ApiError, ErrorPayload};
use crate::models::{AddToCartOutcome, CartEntry, CartSnapshot, CheckoutPayload, Order};
use crate::stores::SeqGuard;
use crate::stores::ui::UiStore;
use crate::transport::Transport;

/// Cart state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub entries: Vec<CartEntry>,
    pub total_items: u32,
    pub total_price: Price,
    pub loading: bool,
    pub error: Option<ErrorPayload>,
}

/// Cart store. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

struct CartInner {
    transport: Transport,
    ui: UiStore,
    state: RwLock<CartState>,
    seq: SeqGuard,
}

/// Recompute derived totals from the line entries.
///
/// `total_items` is the quantity sum; `total_price` sums unit price times
/// quantity, treating priceless (swap-only) items as zero.
fn derived_totals(entries: &[CartEntry]) -> (u32, Price) {
    let total_items = entries.iter().map(|e| e.quantity).sum();
    let total_price = entries
        .iter()
        .map(|e| e.item.price_or_zero() * e.quantity)
        .sum();
    (total_items, total_price)
}

/// Replace state wholesale from an authoritative server snapshot.
fn apply_snapshot(state: &mut CartState, snapshot: CartSnapshot) {
    state.entries = snapshot.items;
    state.total_items = snapshot.total_items;
    state.total_price = snapshot.total_price;
}

/// Drop one entry locally and recompute totals.
fn apply_remove(state: &mut CartState, id: CartEntryId) {
    state.entries.retain(|e| e.id != id);
    (state.total_items, state.total_price) = derived_totals(&state.entries);
}

/// Replace one entry with its server-updated form and recompute totals.
fn apply_entry_update(state: &mut CartState, entry: CartEntry) {
    if let Some(slot) = state.entries.iter_mut().find(|e| e.id == entry.id) {
        *slot = entry;
    }
    (state.total_items, state.total_price) = derived_totals(&state.entries);
}

impl CartStore {
    pub(crate) fn new(transport: Transport, ui: UiStore) -> Self {
        Self {
            inner: Arc::new(CartInner {
                transport,
                ui,
                state: RwLock::new(CartState::default()),
                seq: SeqGuard::default(),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.read(Clone::clone)
    }

    /// Fetch the cart and replace local state wholesale. Missing fields
    /// in the response default to empty/zero.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<(), ApiError> {
        let seq = self.inner.seq.stamp();
        self.begin();

        match self.inner.transport.get::<CartSnapshot>("/api/my-cart/", &[]).await {
            Ok(snapshot) => {
                self.write(|state| {
                    state.loading = false;
                    if self.inner.seq.try_apply(seq) {
                        apply_snapshot(state, snapshot);
                    }
                });
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to fetch cart")),
        }
    }

    /// Add an item. If the server responds with a refreshed full cart it
    /// replaces local state; a bare-entry response leaves local state
    /// untouched (no optimistic synthesis).
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self), fields(item_id = %item_id, quantity))]
    pub async fn add(&self, item_id: ItemId, quantity: u32) -> Result<(), ApiError> {
        let seq = self.inner.seq.stamp();
        self.begin();

        let path = format!("/api/items/{item_id}/add_to_cart/");
        let result = self
            .inner
            .transport
            .post_json::<_, AddToCartOutcome>(&path, &json!({ "quantity": quantity }))
            .await;

        match result {
            Ok(outcome) => {
                self.write(|state| {
                    state.loading = false;
                    if let Some(items) = outcome.items
                        && self.inner.seq.try_apply(seq)
                    {
                        apply_snapshot(
                            state,
                            CartSnapshot {
                                id: None,
                                items,
                                total_items: outcome.total_items.unwrap_or_default(),
                                total_price: outcome.total_price.unwrap_or_default(),
                            },
                        );
                    }
                });
                self.inner.ui.notify_success("Item added to cart!");
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to add item to cart")),
        }
    }

    /// Remove a cart entry, then recompute totals locally - no extra
    /// round-trip for totals.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self), fields(cart_item_id = %cart_item_id))]
    pub async fn remove(&self, cart_item_id: CartEntryId) -> Result<(), ApiError> {
        let seq = self.inner.seq.stamp();
        self.begin();

        let path = format!("/api/carts/items/{cart_item_id}/");
        match self.inner.transport.delete(&path).await {
            Ok(()) => {
                self.write(|state| {
                    state.loading = false;
                    if self.inner.seq.try_apply(seq) {
                        apply_remove(state, cart_item_id);
                    }
                });
                self.inner.ui.notify_success("Item removed from cart!");
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to remove from cart")),
        }
    }

    /// Update one entry's quantity from the server's updated form, then
    /// recompute totals locally.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self), fields(cart_item_id = %cart_item_id, quantity))]
    pub async fn update_quantity(
        &self,
        cart_item_id: CartEntryId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let seq = self.inner.seq.stamp();
        self.begin();

        let path = format!("/api/carts/items/{cart_item_id}/");
        let result = self
            .inner
            .transport
            .patch_json::<_, CartEntry>(&path, &json!({ "quantity": quantity }))
            .await;

        match result {
            Ok(entry) => {
                self.write(|state| {
                    state.loading = false;
                    if self.inner.seq.try_apply(seq) {
                        apply_entry_update(state, entry);
                    }
                });
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to update quantity")),
        }
    }

    /// Check out: the server converts the cart to an order, so success
    /// clears the local cart entirely.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip_all)]
    pub async fn checkout(&self, payload: &CheckoutPayload) -> Result<Order, ApiError> {
        let seq = self.inner.seq.stamp();
        self.begin();

        let result = self
            .inner
            .transport
            .post_json::<_, Order>("/api/carts/checkout/", payload)
            .await;

        match result {
            Ok(order) => {
                self.write(|state| {
                    state.loading = false;
                    if self.inner.seq.try_apply(seq) {
                        apply_snapshot(state, CartSnapshot::default());
                    }
                });
                self.inner.ui.notify_success("Order placed successfully!");
                Ok(order)
            }
            Err(e) => Err(self.fail(e, "Checkout failed")),
        }
    }

    /// Clear the stored error payload.
    pub fn clear_error(&self) {
        self.write(|state| state.error = None);
    }

    /// Reset to the initial empty state (logout).
    pub(crate) fn reset(&self) {
        self.write(|state| *state = CartState::default());
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

    fn read<R>(&self, f: impl FnOnce(&CartState) -> R) -> R {
        f(&self
            .inner
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut CartState) -> R) -> R {
        f(&mut self
            .inner
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }
}
