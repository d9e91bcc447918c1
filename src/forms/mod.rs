//! Form state for the create/edit views.
//!
//! Validation runs synchronously on submit. Every invalid field maps to
//! exactly one message, and a field's message is dropped as soon as that
//! field is edited, whether or not the new value is valid. It comes back
//! only on the next submit attempt.

pub mod customer;
pub mod environment;
pub mod license;
pub mod settings;
pub mod user;

use std::collections::BTreeMap;
use std::fmt;

use validator::{ValidationErrors, ValidationErrorsKind};

/// Field name → human-readable message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field` unless one is already present.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge field-level errors reported by `validator`. When a field has
    /// several, a `required` error wins; otherwise the first reported.
    pub fn extend_from(&mut self, errors: &ValidationErrors) {
        for (field, kind) in errors.errors() {
            if let ValidationErrorsKind::Field(list) = kind {
                let chosen = list
                    .iter()
                    .find(|e| e.code == "required")
                    .or_else(|| list.first());
                if let Some(err) = chosen {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    self.add(field.to_string(), message);
                }
            }
        }
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        out.extend_from(errors);
        out
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Non-blocking notices produced by a successful validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormWarning {
    NoCustomerAddons,
}

impl fmt::Display for FormWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormWarning::NoCustomerAddons => {
                f.write_str("add at least one customer addon repository")
            }
        }
    }
}
