//! HTTP transport: the interceptor pipeline in front of the hub API.
//!
//! Every request flows through `send`:
//!
//! ```text
//! build request → attach bearer (read fresh from storage) → send
//!       → on 401, first attempt: coalesced refresh, retry once
//!       → classify response
//! ```
//!
//! The attempt counter is explicit and per-call; a retried request that
//! fails with 401 again propagates [`ApiError::AuthFailure`] without
//! another refresh, so no request can loop. Requests are described by a
//! rebuildable closure over owned data (rather than a cloned request
//! object) so retries can re-serialize bodies, multipart included.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::error::{ApiError, ErrorPayload};
use crate::session::SessionStore;
use crate::storage::StorageHandle;

const BODY_SNIPPET_LEN: usize = 200;

/// Transport handle shared by all stores. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    http: reqwest::Client,
    base: String,
    session: SessionStore,
    storage: StorageHandle,
}

impl Transport {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: &Url,
        session: SessionStore,
        storage: StorageHandle,
    ) -> Self {
        Self {
            inner: Arc::new(TransportInner {
                http,
                base: base_url.as_str().trim_end_matches('/').to_string(),
                session,
                storage,
            }),
        }
    }

    /// Absolute URL for an API path like `/api/items/`.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base)
    }

    /// Run a request through the pipeline and return the raw body text
    /// of a successful response.
    ///
    /// `build` is invoked once per attempt so retried requests pick up
    /// the refreshed credential and a freshly serialized body.
    pub(crate) async fn send<F>(&self, build: F) -> Result<String, ApiError>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            let epoch = self.inner.session.token_epoch();
            let mut request = build(&self.inner.http);

            // Read at call time, not captured: a refresh between attempts
            // must be visible here.
            if let Some(token) = self.inner.storage.access_token() {
                request = request.bearer_auth(token.expose_secret());
            }

            let response = request.send().await?;

            match Self::classify(response).await {
                Err(ApiError::AuthExpired) if attempt == 0 => {
                    attempt += 1;
                    debug!("access credential rejected, refreshing session before retry");
                    // Pinned to the pre-attempt epoch: if another caller
                    // already rotated the tokens, skip the exchange and
                    // just retry with the fresh credential.
                    self.inner.session.refresh_from(epoch).await?;
                }
                Err(ApiError::AuthExpired) => {
                    // Retried and rejected again: the refreshed credential
                    // is no good either. Tear the session down.
                    error!("retried request rejected again, forcing logout");
                    self.inner.session.force_logout();
                    return Err(ApiError::AuthFailure);
                }
                other => return other,
            }
        }
    }

    /// Map a response to the error taxonomy, or hand back its body.
    async fn classify(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let url_path = response.url().path().to_string();
        // Body first, for diagnostics on every branch.
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::AuthExpired),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(url_path)),
            s if s.is_client_error() => Err(ApiError::Validation(ErrorPayload::from_body(
                &body,
                "Request rejected",
            ))),
            s => {
                error!(
                    status = %s,
                    body = %body.chars().take(BODY_SNIPPET_LEN).collect::<String>(),
                    "hub API returned non-success status"
                );
                Err(ApiError::Unexpected {
                    status: s.as_u16(),
                    message: body.chars().take(BODY_SNIPPET_LEN).collect(),
                })
            }
        }
    }

    fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
        match serde_json::from_str(body) {
            Ok(value) => Ok(value),
            Err(e) => {
                error!(
                    error = %e,
                    body = %body.chars().take(BODY_SNIPPET_LEN).collect::<String>(),
                    "failed to parse hub API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Convenience verbs
    // ─────────────────────────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let body = self
            .send(|http| http.get(&url).query(query))
            .await?;
        Self::parse(&body)
    }

    pub(crate) async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let body = self.send(|http| http.post(&url).json(payload)).await?;
        Self::parse(&body)
    }

    pub(crate) async fn patch_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let body = self.send(|http| http.patch(&url).json(payload)).await?;
        Self::parse(&body)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        self.send(|http| http.delete(&url)).await?;
        Ok(())
    }

    /// POST a multipart form. `form` is called once per attempt because
    /// multipart bodies cannot be cloned for retry.
    pub(crate) async fn post_multipart<T, F>(&self, path: &str, form: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::multipart::Form,
    {
        let url = self.url(path);
        let body = self
            .send(|http| http.post(&url).multipart(form()))
            .await?;
        Self::parse(&body)
    }
}
