//! The transport's expired-token handling: refresh once, retry once,
//! give up cleanly.

use campus_hub_client::{ApiError, SessionPhase};
use campus_hub_integration_tests::{TestContext, cart_entry_json};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn expired_token() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "detail": "Given token not valid for any token type"
    }))
}

#[tokio::test]
async fn expired_access_token_refreshes_and_retries_once() {
    let ctx = TestContext::authenticated().await;
    ctx.mock_refresh_success("a1").await;

    // The stale bearer is rejected; the rotated one succeeds. The retry
    // must pick up the new token from storage.
    Mock::given(method("GET"))
        .and(path("/api/my-cart/"))
        .and(header("authorization", "Bearer access-0"))
        .respond_with(expired_token())
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/my-cart/"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [cart_entry_json(1, 10, "10.00", 2)],
            "total_items": 2,
            "total_price": "20.00",
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    ctx.hub.cart().fetch().await.expect("fetch after refresh");

    assert_eq!(ctx.hub.cart().state().total_items, 2);
    assert!(ctx.hub.session().is_authenticated());
}

#[tokio::test]
async fn second_rejection_after_refresh_forces_logout() {
    let ctx = TestContext::authenticated().await;
    ctx.mock_refresh_success("a1").await;

    // Rejects the retry too; the transport must not loop.
    Mock::given(method("GET"))
        .and(path("/api/my-cart/"))
        .respond_with(expired_token())
        .expect(2)
        .mount(&ctx.server)
        .await;

    let err = ctx.hub.cart().fetch().await.expect_err("second rejection");

    assert!(matches!(err, ApiError::AuthFailure));
    assert_eq!(ctx.hub.session().state().phase, SessionPhase::ForcedLogout);
    assert!(ctx.stored_access_token().is_none());
}

#[tokio::test]
async fn failed_refresh_aborts_the_request() {
    let ctx = TestContext::authenticated().await;
    ctx.mock_refresh_failure().await;

    Mock::given(method("GET"))
        .and(path("/api/my-cart/"))
        .respond_with(expired_token())
        .expect(1)
        .mount(&ctx.server)
        .await;

    let err = ctx.hub.cart().fetch().await.expect_err("refresh failed");

    assert!(matches!(err, ApiError::AuthFailure));
    assert!(ctx.stored_refresh_token().is_none());
}

#[tokio::test]
async fn concurrent_expiries_share_one_refresh() {
    let ctx = TestContext::authenticated().await;
    // expect(1) fails if each caller triggers its own exchange.
    ctx.mock_refresh_success("a1").await;

    Mock::given(method("GET"))
        .and(path("/api/my-cart/"))
        .and(header("authorization", "Bearer access-0"))
        .respond_with(expired_token())
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/my-cart/"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .and(header("authorization", "Bearer access-0"))
        .respond_with(expired_token())
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "username": "maria",
            "date_joined": null,
        })))
        .mount(&ctx.server)
        .await;

    let (cart, profile) = tokio::join!(ctx.hub.cart().fetch(), ctx.hub.user().fetch_profile());

    cart.expect("cart fetch");
    profile.expect("profile fetch");
}

#[tokio::test]
async fn missing_resource_maps_to_not_found() {
    let ctx = TestContext::authenticated().await;

    Mock::given(method("GET"))
        .and(path("/api/items/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "Not found."
        })))
        .mount(&ctx.server)
        .await;

    let err = ctx
        .hub
        .catalog()
        .get(campus_hub_core::ItemId::new(99))
        .await
        .expect_err("missing item");

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn rejected_request_carries_server_payload() {
    let ctx = TestContext::authenticated().await;

    Mock::given(method("POST"))
        .and(path("/api/items/5/add_to_cart/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "You cannot add your own item to cart"
        })))
        .mount(&ctx.server)
        .await;

    let err = ctx
        .hub
        .cart()
        .add(campus_hub_core::ItemId::new(5), 1)
        .await
        .expect_err("own item");

    match err {
        ApiError::Validation(payload) => {
            assert_eq!(payload.message, "You cannot add your own item to cart");
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_maps_to_unexpected() {
    let ctx = TestContext::authenticated().await;

    Mock::given(method("GET"))
        .and(path("/api/my-cart/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&ctx.server)
        .await;

    let err = ctx.hub.cart().fetch().await.expect_err("server error");

    assert!(matches!(err, ApiError::Unexpected { status: 500, .. }));
}
