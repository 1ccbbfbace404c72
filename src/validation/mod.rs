//! Input validation: single-field rules and whole-form pipelines.

mod field;
mod form;

pub use field::{
    sanitize_integer, sanitize_number, validate_field, FieldRule, FieldValue, MIN_PASSWORD_LEN,
};
pub use form::{
    validate_form, CartItemForm, FormKind, FormRecord, LoginForm, ProductForm, RegisterForm,
    ValidCartItem, ValidLogin, ValidProduct, ValidRegister, ValidatedForm,
};

use serde::Serialize;

use crate::error::AppError;

/// Result of validating one field or one form.
///
/// Blocking errors and non-blocking warnings accumulate separately; the
/// accepted value is present exactly when there are no errors, so
/// [`ValidationOutcome::is_valid`] and `errors.is_empty()` cannot disagree.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome<T> {
    value: Option<T>,
    errors: Vec<AppError>,
    warnings: Vec<String>,
}

impl<T> ValidationOutcome<T> {
    /// Accept a value with no errors or warnings.
    #[must_use]
    pub fn accept(value: T) -> Self {
        Self {
            value: Some(value),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Reject with a single error.
    #[must_use]
    pub fn reject(error: AppError) -> Self {
        Self {
            value: None,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    /// Assemble an outcome from accumulated parts. The value is dropped
    /// when any error is present.
    #[must_use]
    pub fn from_parts(value: Option<T>, errors: Vec<AppError>, warnings: Vec<String>) -> Self {
        let value = if errors.is_empty() { value } else { None };
        Self {
            value,
            errors,
            warnings,
        }
    }

    /// Whether the input was accepted. Warnings do not affect this.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        self.value
    }

    #[must_use]
    pub fn errors(&self) -> &[AppError] {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Map the accepted value, keeping errors and warnings.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationOutcome<U> {
        ValidationOutcome {
            value: self.value.map(f),
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}
