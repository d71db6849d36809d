//! REST gateway for the todolink backend.
//!
//! `ApiClient` attaches the bearer token to every request, renews it through
//! the refresh coordinator on a 401, and retries the original request at
//! most once. The todo CRUD operations are thin wrappers over that gateway.

pub mod client;
pub mod error;
pub mod todos;

pub use client::ApiClient;
pub use error::ApiError;
