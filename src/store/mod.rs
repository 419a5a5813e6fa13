//! Persistence and mutation rules for users and diary entries.
//!
//! Every function that changes more than one row takes either a pool (and
//! opens its own transaction) or a `&mut SqliteConnection` that the caller
//! has already placed inside a transaction.

pub mod entries;
pub mod gratitude;
pub mod tags;
pub mod users;

use crate::error::{AppError, FieldErrors};

/// Collects per-field problems for one request.
#[derive(Debug, Default)]
pub(crate) struct Checks {
    errors: FieldErrors,
}

impl Checks {
    pub(crate) fn length(&mut self, field: &str, value: &str, min: usize, max: Option<usize>) {
        let len = value.chars().count();
        if len < min {
            self.fail(field, format!("must be at least {min} characters"));
        } else if let Some(max) = max.filter(|max| len > *max) {
            self.fail(field, format!("must be at most {max} characters"));
        }
    }

    pub(crate) fn fail(&mut self, field: &str, reason: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| reason.into());
    }

    pub(crate) fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}
