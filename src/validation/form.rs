//! Whole-form validation pipelines.
//!
//! Every applicable field is checked independently so the caller receives
//! all blocking errors in one pass; kind-specific cross-field rules run
//! afterwards. Warnings accumulate in a fixed declaration order.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::field::{validate_field, FieldRule, FieldValue, MIN_PASSWORD_LEN};
use super::ValidationOutcome;
use crate::domain::money::Money;
use crate::domain::profit::{assert_profitable, compute_profit, ProfitReport};
use crate::error::{cart_error, validation_error, AppError, ErrorKind};

/// Upper bound for cost and price fields.
const PRICE_LIMIT: Decimal = dec!(99999999);

/// Margin at or below this percentage draws a low-margin warning.
const LOW_MARGIN_WARN_PCT: Decimal = dec!(10);

/// Margin above this percentage draws a competitiveness warning.
const HIGH_MARGIN_WARN_PCT: Decimal = dec!(80);

/// Description length above this draws a warning.
const DESCRIPTION_WARN_LEN: usize = 1000;

/// Quantities above this are legal but draw a warning.
const QUANTITY_WARN_LIMIT: i64 = 99;

/// Raw login input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Raw registration input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    #[serde(default)]
    pub display_name: String,
}

/// Raw product input. Numeric fields arrive as strings straight from an
/// HTTP body and are sanitized before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
}

/// Raw cart item input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartItemForm {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: String,
}

/// Which pipeline a record goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Login,
    Register,
    Product,
    CartItem,
}

/// A raw input record tagged with its form kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormRecord {
    Login(LoginForm),
    Register(RegisterForm),
    Product(ProductForm),
    CartItem(CartItemForm),
}

impl FormRecord {
    #[must_use]
    pub const fn kind(&self) -> FormKind {
        match self {
            Self::Login(_) => FormKind::Login,
            Self::Register(_) => FormKind::Register,
            Self::Product(_) => FormKind::Product,
            Self::CartItem(_) => FormKind::CartItem,
        }
    }
}

/// Accepted login credentials.
#[derive(Debug, Clone, Serialize)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

/// Accepted registration.
#[derive(Debug, Clone, Serialize)]
pub struct ValidRegister {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Accepted product with its profitability report.
#[derive(Debug, Clone, Serialize)]
pub struct ValidProduct {
    pub title: String,
    pub description: String,
    pub cost: Money,
    pub price: Money,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub profit: ProfitReport,
}

/// Accepted cart item.
#[derive(Debug, Clone, Serialize)]
pub struct ValidCartItem {
    pub product_id: String,
    pub quantity: i64,
}

/// An accepted record of any kind.
#[derive(Debug, Clone, Serialize)]
pub enum ValidatedForm {
    Login(ValidLogin),
    Register(ValidRegister),
    Product(ValidProduct),
    CartItem(ValidCartItem),
}

impl ValidatedForm {
    /// Re-serialize to a raw record. Re-validating the result of a
    /// successful validation yields no errors.
    #[must_use]
    pub fn to_record(&self) -> FormRecord {
        match self {
            Self::Login(v) => FormRecord::Login(LoginForm {
                email: v.email.clone(),
                password: v.password.clone(),
            }),
            Self::Register(v) => FormRecord::Register(RegisterForm {
                email: v.email.clone(),
                password: v.password.clone(),
                password_confirm: v.password.clone(),
                display_name: v.display_name.clone(),
            }),
            Self::Product(v) => FormRecord::Product(ProductForm {
                title: v.title.clone(),
                description: v.description.clone(),
                cost: v.cost.amount().to_string(),
                price: v.price.amount().to_string(),
                image_url: v.image_url.clone().unwrap_or_default(),
                category: v.category.clone().unwrap_or_default(),
            }),
            Self::CartItem(v) => FormRecord::CartItem(CartItemForm {
                product_id: v.product_id.clone(),
                quantity: v.quantity.to_string(),
            }),
        }
    }
}

/// Validate a whole record, dispatching on its kind.
#[must_use]
pub fn validate_form(record: &FormRecord) -> ValidationOutcome<ValidatedForm> {
    let outcome = match record {
        FormRecord::Login(form) => validate_login(form).map(ValidatedForm::Login),
        FormRecord::Register(form) => validate_register(form).map(ValidatedForm::Register),
        FormRecord::Product(form) => validate_product(form).map(ValidatedForm::Product),
        FormRecord::CartItem(form) => validate_cart_item(form).map(ValidatedForm::CartItem),
    };
    debug!(
        kind = ?record.kind(),
        errors = outcome.errors().len(),
        warnings = outcome.warnings().len(),
        "validated form"
    );
    outcome
}

/// Run a field's rules in order; the first failure wins for that field.
fn check_field(
    name: &str,
    raw: &str,
    rules: &[FieldRule],
    errors: &mut Vec<AppError>,
) -> Option<FieldValue> {
    let mut accepted = None;
    for rule in rules {
        let outcome = validate_field(name, raw, rule);
        if outcome.is_valid() {
            accepted = outcome.into_value();
        } else {
            errors.extend(outcome.errors().iter().cloned());
            return None;
        }
    }
    accepted
}

fn as_text(value: Option<FieldValue>) -> Option<String> {
    match value {
        Some(FieldValue::Text(s)) => Some(s),
        _ => None,
    }
}

fn as_money(value: Option<FieldValue>, errors: &mut Vec<AppError>) -> Option<Money> {
    match value {
        Some(FieldValue::Number(n)) => match Money::try_new(n) {
            Ok(m) => Some(m),
            Err(e) => {
                errors.push(e);
                None
            }
        },
        _ => None,
    }
}

fn validate_login(form: &LoginForm) -> ValidationOutcome<ValidLogin> {
    let mut errors = Vec::new();

    let email = as_text(check_field(
        "email",
        &form.email,
        &[FieldRule::Required, FieldRule::Email],
        &mut errors,
    ));
    let password = as_text(check_field(
        "password",
        &form.password,
        &[
            FieldRule::Required,
            FieldRule::Password {
                min_len: MIN_PASSWORD_LEN,
            },
        ],
        &mut errors,
    ));

    let value = match (email, password) {
        (Some(email), Some(password)) => Some(ValidLogin { email, password }),
        _ => None,
    };
    ValidationOutcome::from_parts(value, errors, Vec::new())
}

fn validate_register(form: &RegisterForm) -> ValidationOutcome<ValidRegister> {
    let mut errors = Vec::new();

    let email = as_text(check_field(
        "email",
        &form.email,
        &[FieldRule::Required, FieldRule::Email],
        &mut errors,
    ));
    let password = as_text(check_field(
        "password",
        &form.password,
        &[
            FieldRule::Required,
            FieldRule::Password {
                min_len: MIN_PASSWORD_LEN,
            },
        ],
        &mut errors,
    ));
    let confirm = as_text(check_field(
        "password_confirm",
        &form.password_confirm,
        &[FieldRule::Required],
        &mut errors,
    ));
    let display_name = as_text(check_field(
        "display_name",
        &form.display_name,
        &[FieldRule::Required],
        &mut errors,
    ));

    // Confirmation must match once both sides passed their own rules.
    if let (Some(password), Some(_)) = (&password, &confirm) {
        if form.password_confirm != *password {
            errors.push(
                validation_error(ErrorKind::InvalidPassword, "password_confirm")
                    .with_message("password confirmation does not match")
                    .with_context("reason", "do not match"),
            );
        }
    }

    let value = match (email, password, display_name) {
        (Some(email), Some(password), Some(display_name)) if errors.is_empty() => {
            Some(ValidRegister {
                email,
                password,
                display_name,
            })
        }
        _ => None,
    };
    ValidationOutcome::from_parts(value, errors, Vec::new())
}

fn validate_product(form: &ProductForm) -> ValidationOutcome<ValidProduct> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let title = as_text(check_field(
        "title",
        &form.title,
        &[FieldRule::Required],
        &mut errors,
    ));

    let cost_value = check_field(
        "cost",
        &form.cost,
        &[
            FieldRule::NonNegativeNumber,
            FieldRule::Range {
                min: Decimal::ZERO,
                max: PRICE_LIMIT,
            },
        ],
        &mut errors,
    );
    let price_value = check_field(
        "price",
        &form.price,
        &[
            FieldRule::NonNegativeNumber,
            FieldRule::Range {
                min: Decimal::ZERO,
                max: PRICE_LIMIT,
            },
        ],
        &mut errors,
    );

    let cost = as_money(cost_value, &mut errors);
    let price = as_money(price_value, &mut errors);

    let image_url = {
        let trimmed = form.image_url.trim();
        if trimmed.is_empty() {
            None
        } else {
            as_text(check_field(
                "image_url",
                trimmed,
                &[FieldRule::ImageUrl],
                &mut errors,
            ))
        }
    };

    let category = {
        let trimmed = form.category.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    // Cross-field: the profitability gate blocks, margin checks only warn.
    let mut profit = None;
    if let (Some(cost), Some(price)) = (&cost, &price) {
        match assert_profitable(cost, price) {
            Ok(()) => {
                let report = compute_profit(cost, price);
                if price.amount() > Decimal::ZERO {
                    if report.margin_pct() <= LOW_MARGIN_WARN_PCT {
                        warnings.push(format!("low margin ({}%)", report.margin_display()));
                    } else if report.margin_pct() > HIGH_MARGIN_WARN_PCT {
                        warnings.push(format!(
                            "verify competitiveness (margin {}%)",
                            report.margin_display()
                        ));
                    }
                }
                profit = Some(report);
            }
            Err(e) => errors.push(e),
        }
    }

    if form.description.chars().count() > DESCRIPTION_WARN_LEN {
        warnings.push(format!(
            "very long description ({} characters)",
            form.description.chars().count()
        ));
    }

    let value = match (title, cost, price, profit) {
        (Some(title), Some(cost), Some(price), Some(profit)) => Some(ValidProduct {
            title,
            description: form.description.clone(),
            cost,
            price,
            image_url,
            category,
            profit,
        }),
        _ => None,
    };
    ValidationOutcome::from_parts(value, errors, warnings)
}

fn validate_cart_item(form: &CartItemForm) -> ValidationOutcome<ValidCartItem> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let product_id = as_text(check_field(
        "product_id",
        &form.product_id,
        &[FieldRule::Required],
        &mut errors,
    ));

    let quantity = match check_field("quantity", &form.quantity, &[FieldRule::Integer], &mut errors)
    {
        Some(FieldValue::Integer(q)) if q > 0 => {
            if q > QUANTITY_WARN_LIMIT {
                // Large but legal orders still go through.
                warnings.push(format!("large quantity ({q})"));
            }
            Some(q)
        }
        Some(FieldValue::Integer(q)) => {
            errors.push(
                cart_error(ErrorKind::InvalidQuantity)
                    .with_message(format!("quantity must be positive, got {q}"))
                    .with_context("field", "quantity")
                    .with_context("value", q),
            );
            None
        }
        _ => None,
    };

    let value = match (product_id, quantity) {
        (Some(product_id), Some(quantity)) => Some(ValidCartItem {
            product_id,
            quantity,
        }),
        _ => None,
    };
    ValidationOutcome::from_parts(value, errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextValue;

    fn product_form(cost: &str, price: &str) -> ProductForm {
        ProductForm {
            title: "Vintage camera".to_string(),
            description: "Well kept.".to_string(),
            cost: cost.to_string(),
            price: price.to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn valid_product_has_no_errors_or_warnings() {
        let outcome = validate_form(&FormRecord::Product(product_form("1000", "1500")));
        assert!(outcome.is_valid());
        assert!(outcome.warnings().is_empty());

        let Some(ValidatedForm::Product(product)) = outcome.value() else {
            panic!("expected product");
        };
        assert_eq!(product.profit.margin_display(), "33.3");
        assert_eq!(product.profit.roi_display(), "50.0");
    }

    #[test]
    fn ten_percent_margin_warns_low_margin() {
        let outcome = validate_form(&FormRecord::Product(product_form("900", "1000")));
        assert!(outcome.is_valid());
        assert_eq!(outcome.warnings().len(), 1);
        assert!(outcome.warnings()[0].contains("low margin"));
    }

    #[test]
    fn very_high_margin_warns_competitiveness() {
        let outcome = validate_form(&FormRecord::Product(product_form("100", "1000")));
        assert!(outcome.is_valid());
        assert_eq!(outcome.warnings().len(), 1);
        assert!(outcome.warnings()[0].contains("verify competitiveness"));
    }

    #[test]
    fn cost_at_or_above_price_blocks_submission() {
        let outcome = validate_form(&FormRecord::Product(product_form("1500", "1000")));
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(
            outcome.errors()[0].kind(),
            ErrorKind::CostGreaterThanPrice
        );
    }

    #[test]
    fn all_field_errors_are_collected_at_once() {
        let form = ProductForm {
            title: String::new(),
            cost: "-100".to_string(),
            price: "-200".to_string(),
            ..ProductForm::default()
        };
        let outcome = validate_form(&FormRecord::Product(form));
        assert_eq!(outcome.errors().len(), 3);
    }

    #[test]
    fn long_description_warns_but_does_not_block() {
        let mut form = product_form("1000", "1500");
        form.description = "あ".repeat(1001);
        let outcome = validate_form(&FormRecord::Product(form));
        assert!(outcome.is_valid());
        assert_eq!(outcome.warnings().len(), 1);
        assert!(outcome.warnings()[0].contains("very long description"));
    }

    #[test]
    fn login_collects_errors_for_every_field() {
        let outcome = validate_form(&FormRecord::Login(LoginForm {
            email: "bad-email".to_string(),
            password: "x".to_string(),
        }));
        assert_eq!(outcome.errors().len(), 2);
        assert_eq!(outcome.errors()[0].kind(), ErrorKind::InvalidEmail);
        assert_eq!(outcome.errors()[1].kind(), ErrorKind::InvalidPassword);
    }

    #[test]
    fn register_rejects_mismatched_confirmation() {
        let outcome = validate_form(&FormRecord::Register(RegisterForm {
            email: "user@example.com".to_string(),
            password: "secret1".to_string(),
            password_confirm: "secret2".to_string(),
            display_name: "Taro".to_string(),
        }));
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors()[0].kind(), ErrorKind::InvalidPassword);
        assert_eq!(
            outcome.errors()[0].context_value("reason"),
            Some(&ContextValue::Str("do not match".to_string()))
        );
    }

    #[test]
    fn cart_quantity_must_be_positive() {
        let outcome = validate_form(&FormRecord::CartItem(CartItemForm {
            product_id: "prod-1".to_string(),
            quantity: "0".to_string(),
        }));
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors()[0].kind(), ErrorKind::InvalidQuantity);
    }

    #[test]
    fn large_cart_quantity_warns_but_succeeds() {
        let outcome = validate_form(&FormRecord::CartItem(CartItemForm {
            product_id: "prod-1".to_string(),
            quantity: "100".to_string(),
        }));
        assert!(outcome.is_valid());
        assert_eq!(outcome.warnings().len(), 1);

        let Some(ValidatedForm::CartItem(item)) = outcome.value() else {
            panic!("expected cart item");
        };
        assert_eq!(item.quantity, 100);
    }

    #[test]
    fn fractional_cart_quantity_is_an_integer_error() {
        let outcome = validate_form(&FormRecord::CartItem(CartItemForm {
            product_id: "prod-1".to_string(),
            quantity: "1.5".to_string(),
        }));
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors()[0].kind(), ErrorKind::InvalidInteger);
    }

    #[test]
    fn revalidating_accepted_output_stays_clean() {
        let records = [
            FormRecord::Product(product_form("1000", "1500")),
            FormRecord::Login(LoginForm {
                email: "user@example.com".to_string(),
                password: "secret1".to_string(),
            }),
            FormRecord::CartItem(CartItemForm {
                product_id: "prod-1".to_string(),
                quantity: "3".to_string(),
            }),
        ];

        for record in records {
            let first = validate_form(&record);
            assert!(first.is_valid());
            let round_trip = first.value().unwrap().to_record();
            let second = validate_form(&round_trip);
            assert!(second.is_valid(), "round trip failed for {record:?}");
        }
    }
}
