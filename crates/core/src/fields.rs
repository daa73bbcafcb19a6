//! Field normalization and a collector for per-field validation messages.

use crate::error::CoreError;

/// Trim a string field. Empty results become `None`.
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Length in characters, not bytes.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Accumulates one message per offending field. Checks keep running after
/// the first failure.
#[derive(Debug, Default)]
pub struct FieldErrors {
    messages: Vec<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Record `message` when a required value is missing. Returns the value
    /// so callers can keep validating it.
    pub fn require<T>(&mut self, value: Option<T>, message: &str) -> Option<T> {
        if value.is_none() {
            self.push(message);
        }
        value
    }

    pub fn max_len(&mut self, value: Option<&str>, max: usize, message: &str) {
        if let Some(v) = value {
            if char_len(v) > max {
                self.push(message);
            }
        }
    }

    /// Check that `value` is one of `allowed`.
    pub fn one_of(&mut self, value: &str, allowed: &[&str], field: &str) {
        if !allowed.contains(&value) {
            self.push(format!(
                "Invalid {field} '{value}'. Must be one of: {}",
                allowed.join(", ")
            ));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// `Ok(value)` if nothing was recorded, otherwise a validation error.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, CoreError> {
        if self.messages.is_empty() {
            Ok(value())
        } else {
            Err(CoreError::Validation(self.messages))
        }
    }
}
