//! Wire models for the hub REST API.
//!
//! Field names follow the server's snake_case JSON. Collections arrive
//! either paginated (`{results, count, next, previous}`) or as a bare
//! array, which [`Listing`] absorbs with an untagged enum.

use campus_hub_core::{
    CartEntryId, CartId, Category, ItemId, OrderId, OrderLineId, OrderStatus, Price, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// Embedded user projection (sellers, buyers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub date_joined: Option<DateTime<Utc>>,
}

/// The authenticated user's profile, with ownership counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items_count: u32,
    #[serde(default)]
    pub messages_count: u32,
}

/// Partial profile update, both as a request body and as the response
/// merged shallowly into the cached profile.
///
/// Only `Some` fields are sent / applied, so fields the update did not
/// touch are preserved on the cached side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_count: Option<u32>,
}

impl ProfilePatch {
    /// Shallow-merge this patch into an existing profile.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(username) = &self.username {
            profile.username.clone_from(username);
        }
        if let Some(email) = &self.email {
            profile.email.clone_from(email);
        }
        if let Some(first_name) = &self.first_name {
            profile.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &self.last_name {
            profile.last_name.clone_from(last_name);
        }
        if let Some(items_count) = self.items_count {
            profile.items_count = items_count;
        }
        if let Some(messages_count) = self.messages_count {
            profile.messages_count = messages_count;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Items
// ─────────────────────────────────────────────────────────────────────────────

/// A catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub category_display: Option<String>,
    /// Swap-only listings have no price.
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub seller: Option<UserSummary>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Item {
    /// Price treated as zero for swap-only listings, for total math.
    #[must_use]
    pub fn price_or_zero(&self) -> Price {
        self.price.unwrap_or(Price::ZERO)
    }
}

const fn default_true() -> bool {
    true
}

/// Fields for creating a listing. Images ride along as multipart parts.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price: Option<Price>,
    pub images: Vec<ImageAttachment>,
}

/// An image file attached to a listing at creation time.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Partial listing update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Query filters for the item list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilters {
    pub category: Option<Category>,
    pub seller: Option<UserId>,
    /// Server-side ordering key, e.g. `-created_at`, `price`.
    pub ordering: Option<String>,
    pub page: Option<u32>,
}

impl ItemFilters {
    /// Render as query-string pairs.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(category) = self.category {
            query.push(("category".to_string(), category.code().to_string()));
        }
        if let Some(seller) = self.seller {
            query.push(("seller".to_string(), seller.to_string()));
        }
        if let Some(ordering) = &self.ordering {
            query.push(("ordering".to_string(), ordering.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        query
    }
}

/// Query parameters for the search endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub category: Option<Category>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    /// One of `name`, `price`, `created_at` or their `-`-prefixed forms.
    pub sort_by: Option<String>,
}

impl SearchQuery {
    /// Free-text search with server defaults for everything else.
    #[must_use]
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Render as query-string pairs.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(q) = &self.query {
            query.push(("query".to_string(), q.clone()));
        }
        if let Some(category) = self.category {
            query.push(("category".to_string(), category.code().to_string()));
        }
        if let Some(min_price) = self.min_price {
            query.push(("min_price".to_string(), min_price.to_string()));
        }
        if let Some(max_price) = self.max_price {
            query.push(("max_price".to_string(), max_price.to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            query.push(("sort_by".to_string(), sort_by.clone()));
        }
        query
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cart
// ─────────────────────────────────────────────────────────────────────────────

/// One line in the cart: a referenced item plus a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: CartEntryId,
    pub item: Item,
    pub quantity: u32,
    /// Server-computed line total; local math uses `item.price`.
    #[serde(default)]
    pub total_price: Option<Price>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Authoritative cart payload from the server.
///
/// Some server versions spell the amount `total_amount`; the alias keeps
/// both spellings working.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub id: Option<CartId>,
    #[serde(default)]
    pub items: Vec<CartEntry>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default, alias = "total_amount")]
    pub total_price: Price,
}

/// Response to `add_to_cart`: either a refreshed full cart or a bare
/// entry. Only payloads carrying `items` replace local state.
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartOutcome {
    #[serde(default)]
    pub items: Option<Vec<CartEntry>>,
    #[serde(default)]
    pub total_items: Option<u32>,
    #[serde(default, alias = "total_amount")]
    pub total_price: Option<Price>,
}

/// Checkout request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckoutPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders
// ─────────────────────────────────────────────────────────────────────────────

/// One purchased line inside an order, with the price frozen at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub item: Item,
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub buyer: Option<UserSummary>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default, alias = "total_price")]
    pub total_amount: Price,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Listings & pagination
// ─────────────────────────────────────────────────────────────────────────────

/// Pagination metadata from a paginated listing response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// A collection response: paginated envelope or bare-array fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        count: u64,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    /// Split into the rows and pagination metadata. A bare array counts
    /// itself.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, Pagination) {
        match self {
            Self::Paginated {
                results,
                count,
                next,
                previous,
            } => (
                results,
                Pagination {
                    count,
                    next,
                    previous,
                },
            ),
            Self::Plain(results) => {
                let count = results.len() as u64;
                (
                    results,
                    Pagination {
                        count,
                        ..Pagination::default()
                    },
                )
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Login request body for the token endpoint.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Token pair from login; refresh responses may omit the rotated
/// refresh token, in which case the stored one stays valid.
#[derive(Debug, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}
