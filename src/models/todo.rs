use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Todo category, wire-encoded the way the backend expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Work,
    Personal,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "WORK",
            Category::Personal => "PERSONAL",
            Category::Other => "OTHER",
        }
    }
}

/// Sort direction for the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A todo record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    /// 1 (lowest) through 10 (highest)
    pub priority: u8,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub categories: Option<Category>,
    pub deadline: DateTime<Utc>,
}

/// Payload for creating a todo. The backend assigns the id.
#[derive(Debug, Clone, Serialize)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub categories: Category,
    pub priority: u8,
    pub deadline: DateTime<Utc>,
}

/// Partial update for a todo. Unset fields are omitted from the wire so the
/// backend leaves them untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

/// Query filter for the list endpoint. Unset values are omitted from the
/// query string entirely.
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub category: Option<Category>,
    pub sort_order: Option<SortOrder>,
    pub search: Option<String>,
}

impl TodoFilter {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(category) = self.category {
            query.push(("category", category.as_str().to_string()));
        }
        if let Some(sort_order) = self.sort_order {
            query.push(("sort_order", sort_order.as_str().to_string()));
        }
        if let Some(ref search) = self.search {
            query.push(("search", search.clone()));
        }
        query
    }
}
