//! Client-side field validation, mirroring the backend's rules.
//!
//! Pure functions returning field-level errors; an empty result means the
//! input is acceptable. The backend re-validates everything, so these rules
//! exist only to reject obviously bad input before a round trip.

use chrono::{DateTime, Utc};

use crate::models::TodoDraft;

/// Characters counted as "special" for password strength
const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

fn field_error(field: &'static str, message: impl Into<String>) -> FieldError {
    FieldError {
        field,
        message: message.into(),
    }
}

/// Validate registration input.
pub fn validate_registration(email: &str, username: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !is_plausible_email(email) {
        errors.push(field_error("email", "Invalid email address"));
    }
    if username.chars().count() < 6 {
        errors.push(field_error(
            "username",
            "Username must be at least 6 characters",
        ));
    }
    if password.chars().count() < 8 {
        errors.push(field_error(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(field_error(
            "password",
            "Password must contain at least 1 uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(field_error(
            "password",
            "Password must contain at least 1 number",
        ));
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        errors.push(field_error(
            "password",
            "Password must contain at least 1 special character",
        ));
    }
    errors
}

/// Validate a todo draft against the backend's field constraints.
pub fn validate_todo_draft(draft: &TodoDraft) -> Vec<FieldError> {
    validate_todo_fields(
        &draft.title,
        &draft.description,
        draft.priority,
        draft.deadline,
    )
}

/// Validate the individual todo fields; useful for patch forms where only
/// some fields are present.
pub fn validate_todo_fields(
    title: &str,
    description: &str,
    priority: u8,
    deadline: DateTime<Utc>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let title_len = title.chars().count();
    if title_len < 5 {
        errors.push(field_error("title", "Title must be at least 5 characters"));
    } else if title_len > 100 {
        errors.push(field_error("title", "Title must be at most 100 characters"));
    }

    let description_len = description.chars().count();
    if description_len < 20 {
        errors.push(field_error(
            "description",
            "Description must be at least 20 characters",
        ));
    } else if description_len > 200 {
        errors.push(field_error(
            "description",
            "Description must be at most 200 characters",
        ));
    }

    if !(1..=10).contains(&priority) {
        errors.push(field_error(
            "priority",
            "Priority must be between 1 and 10",
        ));
    }

    if deadline <= Utc::now() {
        errors.push(field_error("deadline", "Deadline must be in the future"));
    }

    errors
}

/// local@domain with a dot somewhere in the domain; full address parsing is
/// the backend's job.
fn is_plausible_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
