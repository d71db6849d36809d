//! todolink - client library for the todolink todo backend.
//!
//! Handles the full session lifecycle against the backend: registration,
//! login, durable credential storage, transparent access-token refresh with
//! at-most-one retry on a 401, and the todo CRUD surface built on top.
//! Presentation is left entirely to the embedder; session changes are
//! observable through [`SessionManager::subscribe`].
//!
//! # Example
//!
//! ```no_run
//! use todolink::{ApiClient, Config, TodoFilter};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let client = ApiClient::new(&config)?;
//!
//! client.session().login("alice", "Secr3t!23").await?;
//! let todos = client.list_todos(&TodoFilter::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod validate;

pub use api::{ApiClient, ApiError};
pub use auth::{
    AuthState, CredentialStore, Identity, RefreshCoordinator, RefreshOutcome, SessionManager,
    StoredCredentials,
};
pub use config::Config;
pub use models::{Account, Category, SortOrder, Todo, TodoDraft, TodoFilter, TodoPatch};
pub use validate::{validate_registration, validate_todo_draft, FieldError};
