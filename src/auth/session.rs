use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::models::Account;

use super::credentials::{CredentialStore, StoredCredentials};

/// Token expiry time in minutes.
/// The backend issues short-lived access tokens and does not report a TTL,
/// so expiry is fixed client-side policy.
pub(crate) const TOKEN_TTL_MINUTES: i64 = 15;

/// The access token treated as an opaque identity marker.
/// No decoding of the token's internal structure is performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Snapshot of the session, published to subscribers on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<Identity>,
    /// True until the first load of persisted credentials has completed
    pub initializing: bool,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

struct SessionState {
    credentials: Option<StoredCredentials>,
    initialized: bool,
    /// Bumped on every credential change; the refresh coordinator uses it
    /// to detect a refresh that completed while it waited for the gate.
    epoch: u64,
}

struct SessionInner {
    store: CredentialStore,
    state: RwLock<SessionState>,
    events: watch::Sender<AuthState>,
}

impl SessionInner {
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().expect("session state lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().expect("session state lock poisoned")
    }
}

/// Owns the in-memory session and its durable mirror.
/// Clone is cheap - clones share the same underlying state.
#[derive(Clone)]
pub struct SessionManager {
    http: Client,
    base_url: String,
    inner: Arc<SessionInner>,
}

impl SessionManager {
    pub fn new(http: Client, base_url: impl Into<String>, store: CredentialStore) -> Self {
        let (events, _) = watch::channel(AuthState {
            user: None,
            initializing: true,
        });
        Self {
            http,
            base_url: base_url.into(),
            inner: Arc::new(SessionInner {
                store,
                state: RwLock::new(SessionState {
                    credentials: None,
                    initialized: false,
                    epoch: 0,
                }),
                events,
            }),
        }
    }

    /// Load persisted credentials. Runs once; later calls are no-ops.
    ///
    /// Expiry is not checked against the wall clock here - a stale token is
    /// rejected reactively by the first 401.
    pub fn initialize(&self) {
        {
            let mut state = self.inner.write();
            if state.initialized {
                return;
            }
            state.credentials = self.inner.store.load();
            state.initialized = true;
        }
        self.publish();
    }

    /// Create an account. Registration does not establish a session;
    /// login is a separate step.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Account, ApiError> {
        let url = format!("{}/auth/create", self.base_url);
        let body = serde_json::json!({
            "email": email,
            "username": username,
            "password": password,
        });

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = ApiError::detail_from_body(&body);
            debug!(status = %status, "Registration rejected");
            return Err(match status {
                StatusCode::CONFLICT => ApiError::Conflict(message),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    ApiError::Validation(message)
                }
                _ => ApiError::Request {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        Ok(response.json().await?)
    }

    /// Log in with username and password (form-encoded, per the backend).
    ///
    /// On success the new token/expiry pair is persisted, the in-memory
    /// session replaced, and the new identity published. The login response
    /// also sets the refresh cookie on the shared HTTP client's jar.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, ApiError> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, "Login rejected");
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ApiError::InvalidCredentials
                }
                _ => ApiError::Request {
                    status: status.as_u16(),
                    message: ApiError::detail_from_body(&body),
                },
            });
        }

        let login: LoginResponse = response.json().await?;
        let credentials = StoredCredentials {
            access_token: login.access_token,
            expires_at: Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES),
        };
        let identity = Identity(credentials.access_token.clone());
        self.install_credentials(credentials);
        Ok(identity)
    }

    /// Clear the session locally. The backend is not notified; the refresh
    /// credential simply stops being used. Always succeeds, idempotent.
    pub fn logout(&self) {
        debug!("Logging out");
        self.clear_credentials();
    }

    /// The current identity, if logged in.
    pub fn current_identity(&self) -> Option<Identity> {
        self.inner
            .read()
            .credentials
            .as_ref()
            .map(|c| Identity(c.access_token.clone()))
    }

    /// True once the startup load from the credential store has completed.
    pub fn is_initialized(&self) -> bool {
        self.inner.read().initialized
    }

    /// Subscribe to session changes. The receiver always holds the latest
    /// snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.events.subscribe()
    }

    pub(crate) fn current_credentials(&self) -> Option<StoredCredentials> {
        self.inner.read().credentials.clone()
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.inner.read().epoch
    }

    /// Replace the credential pair: durable store, in-memory session, and
    /// subscribers all see the new value.
    pub(crate) fn install_credentials(&self, credentials: StoredCredentials) {
        if let Err(e) = self.inner.store.save(&credentials) {
            warn!(error = %e, "Failed to persist credentials");
        }
        {
            let mut state = self.inner.write();
            state.credentials = Some(credentials);
            state.epoch += 1;
        }
        self.publish();
    }

    pub(crate) fn clear_credentials(&self) {
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "Failed to clear persisted credentials");
        }
        {
            let mut state = self.inner.write();
            state.credentials = None;
            state.epoch += 1;
        }
        self.publish();
    }

    fn publish(&self) {
        let snapshot = {
            let state = self.inner.read();
            AuthState {
                user: state
                    .credentials
                    .as_ref()
                    .map(|c| Identity(c.access_token.clone())),
                initializing: !state.initialized,
            }
        };
        self.inner.events.send_replace(snapshot);
    }
}
