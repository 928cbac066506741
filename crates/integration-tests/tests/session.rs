//! Session lifecycle: login, refresh, coalescing, forced logout.

use campus_hub_client::{ApiError, SessionPhase};
use campus_hub_integration_tests::TestContext;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn login_persists_tokens_and_authenticates() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({ "username": "maria", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
            "refresh": "r1",
        })))
        .mount(&ctx.server)
        .await;

    ctx.hub
        .session()
        .login("maria", "hunter2")
        .await
        .expect("login");

    assert!(ctx.hub.session().is_authenticated());
    assert_eq!(ctx.hub.session().state().phase, SessionPhase::Authenticated);
    assert_eq!(ctx.stored_access_token().as_deref(), Some("a1"));
    assert_eq!(ctx.stored_refresh_token().as_deref(), Some("r1"));
}

#[tokio::test]
async fn login_without_refresh_token_stores_no_refresh_credential() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
        })))
        .mount(&ctx.server)
        .await;

    ctx.hub
        .session()
        .login("maria", "hunter2")
        .await
        .expect("login");

    // An absent refresh token stays absent; it must not be persisted as
    // an empty string that makes the credential pair look complete.
    assert_eq!(ctx.stored_access_token().as_deref(), Some("a1"));
    assert_eq!(ctx.stored_refresh_token(), None);
    assert!(!ctx.has_stored_credentials());
}

#[tokio::test]
async fn login_rejection_surfaces_server_message() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&ctx.server)
        .await;

    let err = ctx
        .hub
        .session()
        .login("maria", "wrong")
        .await
        .expect_err("rejected credentials");

    match err {
        ApiError::Validation(payload) => {
            assert_eq!(
                payload.message,
                "No active account found with the given credentials"
            );
        }
        other => panic!("expected Validation, got {other:?}"),
    }
    assert!(!ctx.hub.session().is_authenticated());
    assert!(ctx.stored_access_token().is_none());
}

#[tokio::test]
async fn refresh_rotates_access_and_keeps_refresh_when_omitted() {
    let ctx = TestContext::authenticated().await;
    ctx.mock_refresh_success("a1").await;

    ctx.hub.session().refresh().await.expect("refresh");

    assert_eq!(ctx.stored_access_token().as_deref(), Some("a1"));
    // Non-rotating server omitted the refresh token; the old one stays.
    assert_eq!(ctx.stored_refresh_token().as_deref(), Some("refresh-0"));
    assert!(ctx.hub.session().is_authenticated());
}

#[tokio::test]
async fn refresh_without_credential_forces_logout() {
    let ctx = TestContext::new().await;

    let err = ctx
        .hub
        .session()
        .refresh()
        .await
        .expect_err("nothing to refresh with");

    assert!(matches!(err, ApiError::AuthFailure));
    assert_eq!(ctx.hub.session().state().phase, SessionPhase::ForcedLogout);
}

#[tokio::test]
async fn rejected_refresh_clears_credentials() {
    let ctx = TestContext::authenticated().await;
    ctx.mock_refresh_failure().await;

    let err = ctx
        .hub
        .session()
        .refresh()
        .await
        .expect_err("refresh rejected");

    assert!(matches!(err, ApiError::AuthFailure));
    assert!(ctx.stored_access_token().is_none());
    assert!(ctx.stored_refresh_token().is_none());
    assert_eq!(ctx.hub.session().state().phase, SessionPhase::ForcedLogout);
}

#[tokio::test]
async fn concurrent_refreshes_coalesce_into_one_exchange() {
    let ctx = TestContext::authenticated().await;
    // expect(1) fails the test on a second exchange.
    ctx.mock_refresh_success("a1").await;

    let session = ctx.hub.session().clone();
    let (first, second) = tokio::join!(session.refresh(), ctx.hub.session().refresh());

    first.expect("first refresh");
    second.expect("second refresh");
    assert_eq!(ctx.stored_access_token().as_deref(), Some("a1"));
}

#[tokio::test]
async fn startup_with_stale_tokens_starts_logged_out() {
    let ctx = TestContext::authenticated().await;
    ctx.mock_refresh_failure().await;

    ctx.hub.startup().await;

    // Startup failure is silent: logged out, not force-logged-out.
    assert!(!ctx.hub.session().is_authenticated());
    assert_eq!(ctx.hub.session().state().phase, SessionPhase::LoggedOut);
    assert!(ctx.stored_access_token().is_none());
}

#[tokio::test]
async fn startup_with_valid_tokens_authenticates() {
    let ctx = TestContext::authenticated().await;
    ctx.mock_refresh_success("a1").await;

    ctx.hub.startup().await;

    assert!(ctx.hub.session().is_authenticated());
    assert_eq!(ctx.stored_access_token().as_deref(), Some("a1"));
}

#[tokio::test]
async fn logout_clears_tokens_and_state() {
    let ctx = TestContext::authenticated().await;

    ctx.hub.logout();

    assert!(!ctx.hub.session().is_authenticated());
    assert_eq!(ctx.hub.session().state().phase, SessionPhase::LoggedOut);
    assert!(ctx.stored_access_token().is_none());
    assert!(ctx.stored_refresh_token().is_none());
}

#[tokio::test]
async fn session_changes_are_observable() {
    let ctx = TestContext::new().await;
    let mut rx = ctx.hub.session().subscribe();
    assert!(!rx.borrow().is_authenticated);

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
            "refresh": "r1",
        })))
        .mount(&ctx.server)
        .await;
    ctx.hub.session().login("maria", "hunter2").await.expect("login");

    rx.changed().await.expect("state change");
    assert!(rx.borrow().is_authenticated);
}
