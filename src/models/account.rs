use serde::{Deserialize, Serialize};

/// Identity record returned by account creation.
/// Registering does not log the user in; login is a separate step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    pub username: String,
}
