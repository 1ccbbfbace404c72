//! Single-field validation rules.
//!
//! Numeric coercion is split off into [`sanitize_number`] and
//! [`sanitize_integer`], which never fail: an unparseable numeric string
//! becomes `0` before any rule runs, so rule failures are always semantic
//! ("negative", "out of range"), never parse failures.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use url::Url;

use super::ValidationOutcome;
use crate::error::{validation_error, ErrorKind};

/// File extensions accepted by the image-URL rule.
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Default minimum password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A typed value produced by an accepting rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Integer(i64),
}

/// Closed set of single-field rules.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Trimmed value must be non-empty.
    Required,
    /// Value must look like an email address.
    Email,
    /// Value must be at least `min_len` characters.
    Password { min_len: usize },
    /// Sanitized number must be zero or greater.
    NonNegativeNumber,
    /// Sanitized number must have no fractional part.
    Integer,
    /// Value must be an http(s) URL ending in an image extension.
    ImageUrl,
    /// Sanitized number must fall inside the business range, inclusive.
    Range { min: Decimal, max: Decimal },
}

/// Coerce a raw string to a decimal. Trims whitespace, drops thousands
/// separators, and falls back to `0` when the rest does not parse.
#[must_use]
pub fn sanitize_number(raw: &str) -> Decimal {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

/// Coerce a raw string to an integer, truncating any fractional part.
/// Falls back to `0` like [`sanitize_number`].
#[must_use]
pub fn sanitize_integer(raw: &str) -> i64 {
    sanitize_number(raw).trunc().to_i64().unwrap_or(0)
}

/// Validate one raw value against one rule.
///
/// Accepts with a typed value or rejects with exactly one error of the
/// rule's corresponding [`ErrorKind`], carrying the field name in context.
#[must_use]
pub fn validate_field(name: &str, raw: &str, rule: &FieldRule) -> ValidationOutcome<FieldValue> {
    match rule {
        FieldRule::Required => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                ValidationOutcome::reject(validation_error(ErrorKind::RequiredFieldMissing, name))
            } else {
                ValidationOutcome::accept(FieldValue::Text(trimmed.to_string()))
            }
        }
        FieldRule::Email => {
            let trimmed = raw.trim();
            if is_email_shaped(trimmed) {
                ValidationOutcome::accept(FieldValue::Text(trimmed.to_string()))
            } else {
                ValidationOutcome::reject(
                    validation_error(ErrorKind::InvalidEmail, name).with_context("value", trimmed),
                )
            }
        }
        FieldRule::Password { min_len } => {
            if raw.chars().count() >= *min_len {
                ValidationOutcome::accept(FieldValue::Text(raw.to_string()))
            } else {
                // The password itself never lands in context.
                ValidationOutcome::reject(
                    validation_error(ErrorKind::InvalidPassword, name)
                        .with_context("min_len", *min_len),
                )
            }
        }
        FieldRule::NonNegativeNumber => {
            let value = sanitize_number(raw);
            if value >= Decimal::ZERO {
                ValidationOutcome::accept(FieldValue::Number(value))
            } else {
                ValidationOutcome::reject(
                    validation_error(ErrorKind::NegativeNumber, name).with_context("value", value),
                )
            }
        }
        FieldRule::Integer => {
            let value = sanitize_number(raw);
            if value.fract().is_zero() {
                ValidationOutcome::accept(FieldValue::Integer(
                    value.trunc().to_i64().unwrap_or(0),
                ))
            } else {
                ValidationOutcome::reject(
                    validation_error(ErrorKind::InvalidInteger, name).with_context("value", value),
                )
            }
        }
        FieldRule::ImageUrl => {
            let trimmed = raw.trim();
            if is_image_url(trimmed) {
                ValidationOutcome::accept(FieldValue::Text(trimmed.to_string()))
            } else {
                ValidationOutcome::reject(
                    validation_error(ErrorKind::InvalidImageUrl, name)
                        .with_context("value", trimmed),
                )
            }
        }
        FieldRule::Range { min, max } => {
            let value = sanitize_number(raw);
            if value >= *min && value <= *max {
                ValidationOutcome::accept(FieldValue::Number(value))
            } else {
                ValidationOutcome::reject(
                    validation_error(ErrorKind::ValueOutOfRange, name)
                        .with_context("value", value)
                        .with_context("min", *min)
                        .with_context("max", *max),
                )
            }
        }
    }
}

/// Minimal email shape check: one `@`, non-empty local part, dotted
/// domain, no whitespace.
fn is_email_shaped(s: &str) -> bool {
    let mut parts = s.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

fn is_image_url(raw: &str) -> bool {
    let Ok(parsed) = Url::parse(raw) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    let path = parsed.path().to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
