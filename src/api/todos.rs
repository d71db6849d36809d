//! Todo CRUD operations, each a single gateway call.
//!
//! The backend is the sole authority on filtering and sorting; results are
//! returned unmodified.

use reqwest::Method;

use crate::models::{Todo, TodoDraft, TodoFilter, TodoPatch};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Fetch todos matching the filter.
    pub async fn list_todos(&self, filter: &TodoFilter) -> Result<Vec<Todo>, ApiError> {
        let response = self
            .call(Method::GET, "/todos/all-todo", &filter.to_query(), None::<&()>)
            .await?;
        Ok(response.json().await?)
    }

    /// Create a todo; the backend assigns the id.
    pub async fn create_todo(&self, draft: &TodoDraft) -> Result<Todo, ApiError> {
        let response = self
            .call(Method::POST, "/todos/create-todo", &[], Some(draft))
            .await?;
        Ok(response.json().await?)
    }

    /// Apply a partial update and return the updated record.
    pub async fn update_todo(&self, id: &str, patch: &TodoPatch) -> Result<Todo, ApiError> {
        let path = format!("/todos/update-todo/{}", id);
        let response = self.call(Method::PATCH, &path, &[], Some(patch)).await?;
        Ok(response.json().await?)
    }

    /// Delete a todo.
    pub async fn delete_todo(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/todos/delete-todo/{}", id);
        self.call(Method::DELETE, &path, &[], None::<&()>).await?;
        Ok(())
    }
}
