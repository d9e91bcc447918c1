//! Page controllers, one per console page.
//!
//! A controller owns its list, its view mode and its mount flag. Every
//! mutation is awaited first and the list is refreshed only after it
//! succeeds; failures are reported to the operator once and returned.

pub mod customers;
pub mod dashboard;
pub mod environments;
pub mod licenses;
pub mod logs;
pub mod settings;
pub mod users;

use chrono::{NaiveDate, Utc};
use tracing::error;

use crate::error::{ApiError, ConsoleError};
use crate::middleware::ConsoleState;

/// Log a failed call, show the operator a message and hand back the error.
pub(crate) fn report(state: &ConsoleState, err: ApiError, fallback: &str) -> ConsoleError {
    error!(error = %err, status = ?err.status(), "{}", fallback);
    state.interaction.alert(&err.user_message(fallback));
    ConsoleError::Api(err)
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
