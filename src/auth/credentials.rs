use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Credential file name in the data directory
const CREDENTIALS_FILE: &str = "credentials.json";

/// The persisted access-token/expiry pair.
///
/// Both fields are written and cleared together; a token without an expiry
/// (or the reverse) cannot be represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// File-backed store for the credential pair.
///
/// Durable mirror only - the in-memory session owns the live value and
/// consults the store exclusively at startup.
pub struct CredentialStore {
    data_dir: PathBuf,
}

impl CredentialStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Persist the pair, overwriting any prior value.
    pub fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        let path = self.credentials_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create credential directory")?;
        }
        let contents = serde_json::to_string_pretty(credentials)?;
        std::fs::write(path, contents).context("Failed to write credential file")?;
        Ok(())
    }

    /// Read the persisted pair. Missing or corrupt files read as absent.
    pub fn load(&self) -> Option<StoredCredentials> {
        let path = self.credentials_path();
        let contents = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                warn!(error = %e, "Ignoring corrupt credential file");
                None
            }
        }
    }

    /// Remove the persisted pair. Idempotent.
    pub fn clear(&self) -> Result<()> {
        let path = self.credentials_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove credential file"),
        }
    }

    fn credentials_path(&self) -> PathBuf {
        self.data_dir.join(CREDENTIALS_FILE)
    }
}
