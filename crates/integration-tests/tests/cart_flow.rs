//! Cart lifecycle against a mocked hub API: fetch, add, remove,
//! quantity updates, checkout.

use campus_hub_client::ApiError;
use campus_hub_core::{CartEntryId, ItemId, OrderStatus, Price};
use campus_hub_integration_tests::{TestContext, cart_entry_json};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

/// Seed the cart with two lines: 2 x 10.00 and 3 x 5.00.
async fn seed_cart(ctx: &TestContext) {
    Mock::given(method("GET"))
        .and(path("/api/my-cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "items": [
                cart_entry_json(1, 10, "10.00", 2),
                cart_entry_json(2, 20, "5.00", 3),
            ],
            "total_items": 5,
            "total_price": "35.00",
        })))
        .mount(&ctx.server)
        .await;
    ctx.hub.cart().fetch().await.expect("seed cart");
}

#[tokio::test]
async fn fetch_replaces_state_wholesale() {
    let ctx = TestContext::authenticated().await;
    seed_cart(&ctx).await;

    let state = ctx.hub.cart().state();
    assert_eq!(state.entries.len(), 2);
    assert_eq!(state.total_items, 5);
    assert_eq!(state.total_price, Price::from_major(35));
    assert!(!state.loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn fetch_tolerates_legacy_amount_spelling() {
    let ctx = TestContext::authenticated().await;
    Mock::given(method("GET"))
        .and(path("/api/my-cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [cart_entry_json(1, 10, "10.00", 2)],
            "total_items": 2,
            "total_amount": "20.00",
        })))
        .mount(&ctx.server)
        .await;

    ctx.hub.cart().fetch().await.expect("fetch");

    assert_eq!(ctx.hub.cart().state().total_price, Price::from_major(20));
}

#[tokio::test]
async fn add_with_full_cart_response_replaces_state() {
    let ctx = TestContext::authenticated().await;
    Mock::given(method("POST"))
        .and(path("/api/items/10/add_to_cart/"))
        .and(body_json(json!({ "quantity": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Item added to cart",
            "items": [cart_entry_json(1, 10, "10.00", 2)],
            "total_items": 2,
            "total_price": "20.00",
        })))
        .mount(&ctx.server)
        .await;

    ctx.hub.cart().add(ItemId::new(10), 2).await.expect("add");

    let state = ctx.hub.cart().state();
    assert_eq!(state.entries.len(), 1);
    assert_eq!(state.total_items, 2);
    assert_eq!(state.total_price, Price::from_major(20));

    let notices = ctx.hub.ui().state().notices;
    assert_eq!(notices[0].message, "Item added to cart!");
}

#[tokio::test]
async fn add_with_bare_entry_response_leaves_state_untouched() {
    let ctx = TestContext::authenticated().await;
    seed_cart(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/api/items/30/add_to_cart/"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(cart_entry_json(3, 30, "8.00", 1)),
        )
        .mount(&ctx.server)
        .await;

    ctx.hub.cart().add(ItemId::new(30), 1).await.expect("add");

    // No cart payload came back, so nothing is synthesized locally.
    let state = ctx.hub.cart().state();
    assert_eq!(state.entries.len(), 2);
    assert_eq!(state.total_items, 5);
}

#[tokio::test]
async fn remove_recomputes_totals_locally() {
    let ctx = TestContext::authenticated().await;
    seed_cart(&ctx).await;

    Mock::given(method("DELETE"))
        .and(path("/api/carts/items/1/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&ctx.server)
        .await;

    ctx.hub
        .cart()
        .remove(CartEntryId::new(1))
        .await
        .expect("remove");

    let state = ctx.hub.cart().state();
    assert_eq!(state.entries.len(), 1);
    assert_eq!(state.total_items, 3);
    assert_eq!(state.total_price, Price::from_major(15));
}

#[tokio::test]
async fn quantity_update_applies_server_entry_and_recomputes() {
    let ctx = TestContext::authenticated().await;
    seed_cart(&ctx).await;

    Mock::given(method("PATCH"))
        .and(path("/api/carts/items/2/"))
        .and(body_json(json!({ "quantity": 1 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(cart_entry_json(2, 20, "5.00", 1)),
        )
        .mount(&ctx.server)
        .await;

    ctx.hub
        .cart()
        .update_quantity(CartEntryId::new(2), 1)
        .await
        .expect("update quantity");

    let state = ctx.hub.cart().state();
    assert_eq!(state.total_items, 3);
    assert_eq!(state.total_price, Price::from_major(25));
}

#[tokio::test]
async fn checkout_clears_the_cart_and_returns_the_order() {
    let ctx = TestContext::authenticated().await;
    seed_cart(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/api/carts/checkout/"))
        .and(body_json(json!({
            "shipping_address": "12 Dorm Rd",
            "payment_method": "cash",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 77,
            "items": [],
            "total_amount": "35.00",
            "status": "pending",
            "created_at": "2026-08-15T09:00:00Z",
        })))
        .mount(&ctx.server)
        .await;

    let order = ctx
        .hub
        .cart()
        .checkout(&campus_hub_client::models::CheckoutPayload {
            shipping_address: Some("12 Dorm Rd".to_string()),
            payment_method: Some("cash".to_string()),
        })
        .await
        .expect("checkout");

    assert_eq!(order.total_amount, Price::from_major(35));
    assert_eq!(order.status, OrderStatus::Pending);

    let state = ctx.hub.cart().state();
    assert!(state.entries.is_empty());
    assert_eq!(state.total_items, 0);
    assert_eq!(state.total_price, Price::ZERO);

    let notices = ctx.hub.ui().state().notices;
    assert_eq!(notices[0].message, "Order placed successfully!");
}

#[tokio::test]
async fn failed_checkout_keeps_the_cart() {
    let ctx = TestContext::authenticated().await;
    seed_cart(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/api/carts/checkout/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Cart is empty"
        })))
        .mount(&ctx.server)
        .await;

    let err = ctx
        .hub
        .cart()
        .checkout(&campus_hub_client::models::CheckoutPayload::default())
        .await
        .expect_err("rejected checkout");

    assert!(matches!(err, ApiError::Validation(_)));
    let state = ctx.hub.cart().state();
    assert_eq!(state.entries.len(), 2);
    assert_eq!(state.error.expect("stored error").message, "Cart is empty");
}

#[tokio::test]
async fn failures_surface_as_error_notices() {
    let ctx = TestContext::authenticated().await;
    Mock::given(method("GET"))
        .and(path("/api/my-cart/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&ctx.server)
        .await;

    let _ = ctx.hub.cart().fetch().await;

    let ui = ctx.hub.ui().state();
    assert_eq!(ui.notices[0].message, "Failed to fetch cart");
    assert_eq!(ui.unread_count, 1);
}
