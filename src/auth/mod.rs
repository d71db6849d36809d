//! Session and credential management for the todolink backend.
//!
//! This module provides:
//! - `CredentialStore`: durable storage for the access-token/expiry pair
//! - `SessionManager`: login, registration, logout, and session queries
//! - `RefreshCoordinator`: single-flight access-token renewal
//!
//! Access tokens are short-lived (15 minutes); renewal rides on the refresh
//! cookie held by the shared HTTP client. Session changes are published on a
//! watch channel for presentation layers to observe.

pub mod credentials;
pub mod refresh;
pub mod session;

pub use credentials::{CredentialStore, StoredCredentials};
pub use refresh::{RefreshCoordinator, RefreshOutcome};
pub use session::{AuthState, Identity, SessionManager};
