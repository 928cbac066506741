//! Session store: token lifecycle and refresh coordination.
//!
//! Tokens live in persisted storage (the localStorage analog); this store
//! owns the observable authentication state and the single point where
//! refreshes happen. Concurrent callers hitting an expired credential
//! converge on one refresh HTTP call: the epoch counter advances on every
//! successful refresh, and callers that queued behind the in-flight
//! refresh see the advanced epoch and return without re-exchanging.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use secrecy::ExposeSecret;
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{ApiError, ErrorPayload};
use crate::models::{LoginRequest, TokenPair};
use crate::storage::StorageHandle;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No credentials; nothing has gone wrong.
    #[default]
    LoggedOut,
    /// Valid credentials are stored.
    Authenticated,
    /// The session was torn down because a refresh failed. Consumers
    /// should route to the login entry point.
    ForcedLogout,
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub loading: bool,
    pub phase: SessionPhase,
}

/// Session store. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    http: reqwest::Client,
    base: String,
    storage: StorageHandle,
    state: watch::Sender<SessionState>,
    /// Serializes refresh attempts; see `refresh`.
    refresh_gate: tokio::sync::Mutex<()>,
    /// Bumped on every successful token exchange.
    epoch: AtomicU64,
}

impl SessionStore {
    pub(crate) fn new(http: reqwest::Client, base_url: &Url, storage: StorageHandle) -> Self {
        let initial = SessionState {
            // Stored credentials are provisional until check_status()
            // validates them, but count as "authenticated" for rendering
            // purposes.
            is_authenticated: storage.has_credentials(),
            loading: false,
            phase: if storage.has_credentials() {
                SessionPhase::Authenticated
            } else {
                SessionPhase::LoggedOut
            },
        };

        Self {
            inner: Arc::new(SessionInner {
                http,
                base: base_url.as_str().trim_end_matches('/').to_string(),
                storage,
                state: watch::Sender::new(initial),
                refresh_gate: tokio::sync::Mutex::new(()),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    /// Subscribe to session state changes.
    ///
    /// A transition to [`SessionPhase::ForcedLogout`] is the signal to
    /// discard in-flight application state and return to login.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Whether a session is currently established.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated
    }

    /// Exchange username/password for a token pair.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] with the server payload on
    /// rejected credentials, or a network/parse error.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.set_loading(true);

        let result = self
            .inner
            .http
            .post(format!("{}/api/token/", self.inner.base))
            .json(&LoginRequest { username, password })
            .send()
            .await;

        let outcome = match result {
            Ok(response) => Self::read_token_pair(response).await,
            Err(e) => Err(ApiError::Network(e)),
        };

        match outcome {
            Ok(pair) => {
                self.store_pair(&pair);
                debug!("login succeeded");
                Ok(())
            }
            Err(e) => {
                self.set_loading(false);
                Err(e)
            }
        }
    }

    /// Exchange the stored refresh credential for a new token pair.
    ///
    /// Success replaces both persisted tokens. Any failure - missing or
    /// rejected refresh credential, network error - clears all stored
    /// credentials and flips the session to [`SessionPhase::ForcedLogout`].
    ///
    /// Concurrent calls coalesce: at most one HTTP exchange is in flight,
    /// and callers that waited behind it observe the advanced epoch and
    /// succeed without a second exchange.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthFailure`] when the session could not be
    /// renewed.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let observed = self.inner.epoch.load(Ordering::Acquire);
        self.refresh_from(observed).await
    }

    /// Refresh unless the tokens already rotated past `observed`. The
    /// transport captures the epoch before each attempt, so a 401 that
    /// raced with someone else's refresh skips straight to the retry.
    pub(crate) async fn refresh_from(&self, observed: u64) -> Result<(), ApiError> {
        let _gate = self.inner.refresh_gate.lock().await;

        if self.inner.epoch.load(Ordering::Acquire) != observed {
            debug!("refresh already completed by a concurrent caller");
            return Ok(());
        }

        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<(), ApiError> {
        let Some(refresh_token) = self.inner.storage.refresh_token() else {
            warn!("no refresh credential stored");
            self.force_logout();
            return Err(ApiError::AuthFailure);
        };

        self.set_loading(true);

        let result = self
            .inner
            .http
            .post(format!("{}/api/token/refresh/", self.inner.base))
            .json(&json!({ "refresh": refresh_token.expose_secret() }))
            .send()
            .await;

        let outcome = match result {
            Ok(response) => Self::read_token_pair(response).await,
            Err(e) => Err(ApiError::Network(e)),
        };

        match outcome {
            Ok(pair) => {
                self.store_pair(&pair);
                debug!("session refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "session refresh failed, clearing credentials");
                self.force_logout();
                Err(ApiError::AuthFailure)
            }
        }
    }

    /// Startup probe: if both credentials are present, validate them by
    /// refreshing. Failures are silent - the user simply starts logged
    /// out, with no error surfaced.
    pub async fn check_status(&self) {
        if !self.inner.storage.has_credentials() {
            debug!("no stored credentials at startup");
            return;
        }

        if let Err(e) = self.refresh().await {
            debug!(error = %e, "startup refresh failed, starting logged out");
            // force_logout already ran; downgrade the phase so startup
            // does not look like a mid-session expiry.
            self.inner.state.send_modify(|state| {
                state.phase = SessionPhase::LoggedOut;
            });
        }
    }

    /// Clear credentials and session state. Always succeeds locally;
    /// no network call is involved.
    pub fn logout(&self) {
        self.inner.storage.clear_tokens();
        self.inner.state.send_replace(SessionState {
            is_authenticated: false,
            loading: false,
            phase: SessionPhase::LoggedOut,
        });
    }

    pub(crate) fn force_logout(&self) {
        self.inner.storage.clear_tokens();
        self.inner.state.send_replace(SessionState {
            is_authenticated: false,
            loading: false,
            phase: SessionPhase::ForcedLogout,
        });
    }

    fn store_pair(&self, pair: &TokenPair) {
        // Non-rotating servers omit the refresh token; keep the stored one.
        let refresh = pair.refresh.clone().or_else(|| {
            self.inner
                .storage
                .refresh_token()
                .map(|t| t.expose_secret().to_string())
        });
        match refresh {
            Some(refresh) => self.inner.storage.set_tokens(&pair.access, &refresh),
            // No refresh token from either source: do not invent an
            // empty one that would make the stored pair look complete.
            None => self.inner.storage.set_access_token(&pair.access),
        }

        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        self.inner.state.send_replace(SessionState {
            is_authenticated: true,
            loading: false,
            phase: SessionPhase::Authenticated,
        });
    }

    fn set_loading(&self, loading: bool) {
        self.inner.state.send_modify(|state| state.loading = loading);
    }

    async fn read_token_pair(response: reqwest::Response) -> Result<TokenPair, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Validation(ErrorPayload::from_body(
                &body,
                "Authentication failed",
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Test and diagnostic hook: how many successful exchanges happened.
    #[must_use]
    pub fn token_epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::Acquire)
    }
}
