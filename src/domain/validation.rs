//! Structured submission validation.
//!
//! Validators return `Ok(())` or a list of field-level errors; nothing here
//! knows about HTTP or persistence. Callers merge in errors only they can
//! detect (an unresolvable group reference, say) before deciding the
//! submission failed.

use serde::Serialize;
use thiserror::Error;

/// A single rejected field with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Accumulated validation failures for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize)]
#[error("validation failed: {}", summarize(.0))]
pub struct FieldErrors(Vec<FieldError>);

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl FieldErrors {
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Convert to a result: empty means the submission is acceptable.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Validate post text: required, non-empty after trimming.
pub fn check_post_body(body: &str, errors: &mut FieldErrors) {
    if body.trim().is_empty() {
        errors.push(FieldError::new("text", "post text must not be empty"));
    }
}

/// Validate comment text: required, non-empty after trimming.
pub fn check_comment_body(body: &str, errors: &mut FieldErrors) {
    if body.trim().is_empty() {
        errors.push(FieldError::new("text", "comment text must not be empty"));
    }
}

/// Validate an attached image by filename: the guessed content type must be
/// an `image/*` type.
pub fn check_image_filename(filename: &str, errors: &mut FieldErrors) {
    let guessed = mime_guess::from_path(filename).first();
    let is_image = guessed
        .as_ref()
        .map(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false);

    if !is_image {
        errors.push(FieldError::new(
            "image",
            format!("`{filename}` is not a recognized image type"),
        ));
    }
}
