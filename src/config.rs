//! Client configuration.
//!
//! The backend base URL comes from the `TODO_API_URL` environment variable
//! (a `.env` file is honored if present). Credentials are persisted under
//! the platform data directory, overridable with `TODO_DATA_DIR`.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application name used for the data directory path
const APP_NAME: &str = "todolink";

/// Environment variable naming the backend base URL
const API_URL_VAR: &str = "TODO_API_URL";

/// Environment variable overriding the credential storage directory
const DATA_DIR_VAR: &str = "TODO_DATA_DIR";

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without a trailing slash
    pub api_base_url: String,
    /// Directory holding the persisted credential pair
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let api_base_url = std::env::var(API_URL_VAR)
            .with_context(|| format!("{} must be set to the backend base URL", API_URL_VAR))?;

        let data_dir = match std::env::var_os(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?
                .join(APP_NAME),
        };

        Ok(Self::new(api_base_url, data_dir))
    }

    /// Build a configuration directly, normalizing the base URL.
    pub fn new(api_base_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        let mut api_base_url = api_base_url.into();
        while api_base_url.ends_with('/') {
            api_base_url.pop();
        }
        Self {
            api_base_url,
            data_dir: data_dir.into(),
        }
    }
}
