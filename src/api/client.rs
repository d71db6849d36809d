//! Authenticated request gateway for the todolink backend.
//!
//! Every backend call goes through [`ApiClient::call`]: the current access
//! token is attached as a bearer header, a 401 triggers one token refresh
//! followed by one retry of the original request, and any further rejection
//! surfaces as [`ApiError::Unauthenticated`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{CredentialStore, RefreshCoordinator, RefreshOutcome, SessionManager};
use crate::config::Config;

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow backend responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Per-request retry state. A 401 may trigger one refresh-and-retry; a 401
/// on the retried attempt is final. Keeping the bound in the type makes the
/// at-most-one-retry rule structural.
enum Attempt {
    Initial,
    RetriedOnce,
}

/// Gateway for authenticated backend calls.
/// Clone is cheap - reqwest::Client uses Arc internally and the session
/// manager shares its state across clones.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionManager,
    refresher: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Build a fully wired client and load any persisted session.
    ///
    /// The cookie jar on the shared HTTP client is the ambient channel for
    /// the refresh credential: the login response sets it, the refresh
    /// request carries it back implicitly.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;

        let store = CredentialStore::new(config.data_dir.clone());
        let session = SessionManager::new(http.clone(), &config.api_base_url, store);
        session.initialize();

        let refresher = Arc::new(RefreshCoordinator::new(
            http.clone(),
            &config.api_base_url,
            session.clone(),
        ));

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            session,
            refresher,
        })
    }

    /// Session operations: login, registration, logout, identity queries,
    /// and the change-notification channel.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Issue an authenticated request, refreshing the access token and
    /// retrying the request once if the backend rejects it.
    pub(crate) async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let mut attempt = Attempt::Initial;
        loop {
            let response = self.send(&method, path, query, body).await?;
            let status = response.status();

            // A first 401 on a live session gets one refresh-and-retry.
            // Any other 401 - logged out, refresh failed, or the retried
            // attempt - falls through to from_status and maps to
            // Unauthenticated there.
            if status == StatusCode::UNAUTHORIZED
                && matches!(attempt, Attempt::Initial)
                && self.session.current_identity().is_some()
            {
                match self.refresher.refresh().await {
                    RefreshOutcome::Renewed { .. } => {
                        debug!(path, "Retrying request after token refresh");
                        attempt = Attempt::RetriedOnce;
                        continue;
                    }
                    outcome => {
                        warn!(path, ?outcome, "Refresh failed, request unauthenticated");
                    }
                }
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::from_status(status, &body));
            }

            return Ok(response);
        }
    }

    /// Build and send one attempt. The token is re-read from the session on
    /// every attempt so a retry picks up the refreshed value. An absent
    /// token still sends the request - the backend is authoritative on
    /// rejecting it.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(identity) = self.session.current_identity() {
            request = request.bearer_auth(identity.as_str());
        }
        request.send().await
    }
}
