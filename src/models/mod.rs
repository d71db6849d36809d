//! Data models for todolink entities.
//!
//! - `Todo`, `TodoDraft`, `TodoPatch`, `TodoFilter`: the todo record and its
//!   create/update/query shapes
//! - `Category`, `SortOrder`: wire enums
//! - `Account`: the identity record returned by registration

pub mod account;
pub mod todo;

pub use account::Account;
pub use todo::{Category, SortOrder, Todo, TodoDraft, TodoFilter, TodoPatch};
