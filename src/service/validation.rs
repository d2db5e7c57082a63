use crate::error::{Error, FieldError, Result};

/// Collects every field problem in a request before failing.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldError>);

impl Violations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a non-blank value.
    pub fn require_text(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.0.push(FieldError::new(field, format!("{field} is required")));
        }
        self
    }

    /// Like `require_text`, but only when the field was supplied.
    pub fn optional_text(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            if value.trim().is_empty() {
                self.0.push(FieldError::new(field, format!("{field} cannot be empty")));
            }
        }
        self
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.0.push(FieldError::new(field, message));
        }
        self
    }

    pub fn finish(&mut self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(std::mem::take(&mut self.0)))
        }
    }
}
