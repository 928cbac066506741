//! Catalog store: the browsable item list, the currently viewed item,
//! and search results.
//!
//! Single items are cached for 5 minutes so revisiting a detail page does
//! not refetch. Mutations (create/update/delete) keep the cache honest.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use campus_hub_core::ItemId;
use moka::future::Cache;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use crate::error::{ApiError, ErrorPayload};
use crate::models::{ImageAttachment, Item, ItemFilters, ItemPatch, Listing, NewItem, Pagination, SearchQuery};
use crate::stores::SeqGuard;
use crate::stores::ui::UiStore;
use crate::transport::Transport;

/// Catalog state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    /// The current page of the browsable list.
    pub items: Vec<Item>,
    /// The item whose detail view is open, if any.
    pub current: Option<Item>,
    pub search_results: Vec<Item>,
    pub filters: ItemFilters,
    pub pagination: Pagination,
    pub loading: bool,
    /// Search has its own flag so a slow search does not grey out the list.
    pub search_loading: bool,
    pub error: Option<ErrorPayload>,
}

/// Catalog store. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    transport: Transport,
    ui: UiStore,
    state: RwLock<CatalogState>,
    cache: Cache<ItemId, Item>,
    list_seq: SeqGuard,
    search_seq: SeqGuard,
}

fn image_part(image: &ImageAttachment) -> Part {
    let part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
    match part.mime_str(&image.content_type) {
        Ok(part) => part,
        Err(_) => Part::bytes(image.bytes.clone()).file_name(image.file_name.clone()),
    }
}

fn creation_form(item: &NewItem) -> Form {
    let mut form = Form::new()
        .text("name", item.name.clone())
        .text("description", item.description.clone())
        .text("category", item.category.code().to_string());
    if let Some(price) = item.price {
        form = form.text("price", price.to_string());
    }
    for (index, image) in item.images.iter().enumerate() {
        form = form.part(format!("image{}", index + 1), image_part(image));
    }
    form
}

impl CatalogStore {
    pub(crate) fn new(transport: Transport, ui: UiStore) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogInner {
                transport,
                ui,
                state: RwLock::new(CatalogState::default()),
                cache,
                list_seq: SeqGuard::default(),
                search_seq: SeqGuard::default(),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CatalogState {
        self.read(Clone::clone)
    }

    /// Fetch the item list using the filters currently in state.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<(), ApiError> {
        let seq = self.inner.list_seq.stamp();
        let query = self.read(|state| state.filters.to_query());
        self.write(|state| {
            state.loading = true;
            state.error = None;
        });

        match self.inner.transport.get::<Listing<Item>>("/api/items/", &query).await {
            Ok(listing) => {
                let (items, pagination) = listing.into_parts();
                self.write(|state| {
                    state.loading = false;
                    if self.inner.list_seq.try_apply(seq) {
                        state.items = items;
                        state.pagination = pagination;
                    }
                });
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to fetch items")),
        }
    }

    /// Fetch one item and make it the current one. Served from cache when
    /// still fresh. A missing item clears `current` and records the error.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn get(&self, item_id: ItemId) -> Result<Item, ApiError> {
        if let Some(item) = self.inner.cache.get(&item_id).await {
            self.write(|state| {
                state.current = Some(item.clone());
                state.error = None;
            });
            return Ok(item);
        }

        self.write(|state| {
            state.loading = true;
            state.error = None;
        });

        let path = format!("/api/items/{item_id}/");
        match self.inner.transport.get::<Item>(&path, &[]).await {
            Ok(item) => {
                self.inner.cache.insert(item_id, item.clone()).await;
                self.write(|state| {
                    state.loading = false;
                    state.current = Some(item.clone());
                });
                Ok(item)
            }
            Err(e) => {
                if matches!(e, ApiError::NotFound(_)) {
                    self.write(|state| state.current = None);
                }
                Err(self.fail(e, "Failed to fetch item"))
            }
        }
    }

    /// Run a search. Results land in `search_results` without touching the
    /// browsable list.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip_all)]
    pub async fn search(&self, query: &SearchQuery) -> Result<(), ApiError> {
        let seq = self.inner.search_seq.stamp();
        self.write(|state| {
            state.search_loading = true;
            state.error = None;
        });

        let result = self
            .inner
            .transport
            .get::<Listing<Item>>("/api/search/", &query.to_query())
            .await;

        match result {
            Ok(listing) => {
                let (items, _) = listing.into_parts();
                self.write(|state| {
                    state.search_loading = false;
                    if self.inner.search_seq.try_apply(seq) {
                        state.search_results = items;
                    }
                });
                Ok(())
            }
            Err(e) => {
                let payload = e.to_payload("Search failed");
                self.write(|state| {
                    state.search_loading = false;
                    state.error = Some(payload.clone());
                });
                self.inner.ui.notify_error(payload.message);
                Err(e)
            }
        }
    }

    /// Create a listing. Images upload as multipart parts. On success the
    /// confirmed item is prepended to the list.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip_all, fields(name = %item.name))]
    pub async fn create(&self, item: &NewItem) -> Result<Item, ApiError> {
        self.write(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = self
            .inner
            .transport
            .post_multipart::<Item, _>("/api/items/", || creation_form(item))
            .await;

        match result {
            Ok(created) => {
                self.inner.cache.insert(created.id, created.clone()).await;
                self.write(|state| {
                    state.loading = false;
                    state.items.insert(0, created.clone());
                });
                self.inner.ui.notify_success("Item created successfully!");
                Ok(created)
            }
            Err(e) => Err(self.fail(e, "Failed to create item")),
        }
    }

    /// Apply a partial update. The server's updated form replaces the item
    /// in the list and in `current` if it is the one being viewed.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self, patch), fields(item_id = %item_id))]
    pub async fn update(&self, item_id: ItemId, patch: &ItemPatch) -> Result<Item, ApiError> {
        self.write(|state| {
            state.loading = true;
            state.error = None;
        });

        let path = format!("/api/items/{item_id}/");
        match self.inner.transport.patch_json::<_, Item>(&path, patch).await {
            Ok(updated) => {
                self.inner.cache.insert(item_id, updated.clone()).await;
                self.write(|state| {
                    state.loading = false;
                    if let Some(slot) = state.items.iter_mut().find(|i| i.id == item_id) {
                        *slot = updated.clone();
                    }
                    if state.current.as_ref().is_some_and(|i| i.id == item_id) {
                        state.current = Some(updated.clone());
                    }
                });
                self.inner.ui.notify_success("Item updated successfully!");
                Ok(updated)
            }
            Err(e) => Err(self.fail(e, "Failed to update item")),
        }
    }

    /// Delete a listing and drop it from local state and the cache.
    ///
    /// # Errors
    ///
    /// Stores the error payload in state and returns the error.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn delete(&self, item_id: ItemId) -> Result<(), ApiError> {
        self.write(|state| {
            state.loading = true;
            state.error = None;
        });

        let path = format!("/api/items/{item_id}/");
        match self.inner.transport.delete(&path).await {
            Ok(()) => {
                self.inner.cache.invalidate(&item_id).await;
                self.write(|state| {
                    state.loading = false;
                    state.items.retain(|i| i.id != item_id);
                    if state.current.as_ref().is_some_and(|i| i.id == item_id) {
                        state.current = None;
                    }
                });
                self.inner.ui.notify_success("Item deleted successfully!");
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to delete item")),
        }
    }

    /// Replace the list filters. Callers follow up with [`list`](Self::list).
    pub fn set_filters(&self, filters: ItemFilters) {
        self.write(|state| state.filters = filters);
    }

    /// Reset filters to the server defaults.
    pub fn clear_filters(&self) {
        self.write(|state| state.filters = ItemFilters::default());
    }

    pub fn clear_search_results(&self) {
        self.write(|state| state.search_results.clear());
    }

    /// Set the current item directly, e.g. from an already loaded list.
    pub fn set_current(&self, item: Item) {
        self.write(|state| state.current = Some(item));
    }

    pub fn clear_current(&self) {
        self.write(|state| state.current = None);
    }

    /// Clear the stored error payload.
    pub fn clear_error(&self) {
        self.write(|state| state.error = None);
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

    fn read<R>(&self, f: impl FnOnce(&CatalogState) -> R) -> R {
        f(&self
            .inner
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut CatalogState) -> R) -> R {
        f(&mut self
            .inner
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }
}
