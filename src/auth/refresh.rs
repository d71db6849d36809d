use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::credentials::StoredCredentials;
use super::session::{SessionManager, TOKEN_TTL_MINUTES};

/// Result of one refresh exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Renewed {
        access_token: String,
        expires_at: DateTime<Utc>,
    },
    /// The refresh credential was rejected
    Denied,
    /// No usable response was obtained
    TransportFailure,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// Exchanges the ambient refresh credential for a new access token.
///
/// The refresh cookie lives in the shared HTTP client's jar; this component
/// never holds it in memory. Concurrent callers coalesce on a single
/// backend request: whoever acquires the gate first performs the exchange,
/// everyone else adopts its result.
///
/// `Denied` and `TransportFailure` both clear the session; callers must not
/// retry the refresh themselves.
pub struct RefreshCoordinator {
    http: Client,
    base_url: String,
    session: SessionManager,
    gate: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new(http: Client, base_url: impl Into<String>, session: SessionManager) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            session,
            gate: Mutex::new(()),
        }
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        let observed = self.session.epoch();
        let _guard = self.gate.lock().await;

        // The session changed while we waited for the gate - a concurrent
        // refresh (or login/logout) already settled things. Adopt that
        // result instead of issuing a duplicate request.
        if self.session.epoch() != observed {
            return match self.session.current_credentials() {
                Some(c) => RefreshOutcome::Renewed {
                    access_token: c.access_token,
                    expires_at: c.expires_at,
                },
                None => RefreshOutcome::Denied,
            };
        }

        let outcome = self.exchange().await;
        match &outcome {
            RefreshOutcome::Renewed {
                access_token,
                expires_at,
            } => {
                debug!("Access token renewed");
                self.session.install_credentials(StoredCredentials {
                    access_token: access_token.clone(),
                    expires_at: *expires_at,
                });
            }
            RefreshOutcome::Denied => {
                warn!("Refresh credential rejected, clearing session");
                self.session.clear_credentials();
            }
            RefreshOutcome::TransportFailure => {
                warn!("Refresh transport failure, clearing session");
                self.session.clear_credentials();
            }
        }
        outcome
    }

    async fn exchange(&self) -> RefreshOutcome {
        let url = format!("{}/auth/refresh", self.base_url);
        let response = match self.http.post(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Refresh request failed");
                return RefreshOutcome::TransportFailure;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "Refresh rejected by backend");
            return RefreshOutcome::Denied;
        }

        match response.json::<RefreshResponse>().await {
            Ok(refresh) => RefreshOutcome::Renewed {
                access_token: refresh.access_token,
                expires_at: Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES),
            },
            Err(e) => {
                warn!(error = %e, "Failed to parse refresh response");
                RefreshOutcome::TransportFailure
            }
        }
    }
}
