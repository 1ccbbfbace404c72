//! Monetary amounts as non-negative decimals with a currency tag.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

/// Supported currencies. The surrounding application is yen-denominated,
/// so `Jpy` is the default tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Jpy,
    Usd,
}

/// A non-negative monetary amount.
///
/// Negative amounts are rejected at construction with a
/// [`ErrorKind::NegativeNumber`] validation error; they are never silently
/// clamped. `Decimal` guarantees the amount is finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MoneyParts")]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Create an amount in the default currency.
    ///
    /// # Errors
    /// Returns [`ErrorKind::NegativeNumber`] if `amount < 0`.
    pub fn try_new(amount: Decimal) -> Result<Self, AppError> {
        Self::try_with_currency(amount, Currency::default())
    }

    /// Create an amount in an explicit currency.
    ///
    /// # Errors
    /// Returns [`ErrorKind::NegativeNumber`] if `amount < 0`.
    pub fn try_with_currency(amount: Decimal, currency: Currency) -> Result<Self, AppError> {
        if amount < Decimal::ZERO {
            return Err(AppError::new(ErrorKind::NegativeNumber)
                .with_message(format!("monetary amount must be non-negative, got {amount}"))
                .with_context("amount", amount));
        }
        Ok(Self { amount, currency })
    }

    /// Zero in the default currency.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            amount: Decimal::ZERO,
            currency: Currency::default(),
        }
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

/// Wire shape for `Money`; deserialization funnels through `try_with_currency`
/// so a negative amount read from JSON is rejected like any other input.
#[derive(Deserialize)]
struct MoneyParts {
    amount: Decimal,
    #[serde(default)]
    currency: Currency,
}

impl TryFrom<MoneyParts> for Money {
    type Error = AppError;

    fn try_from(parts: MoneyParts) -> Result<Self, Self::Error> {
        Self::try_with_currency(parts.amount, parts.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn accepts_zero_and_positive_amounts() {
        assert!(Money::try_new(dec!(0)).is_ok());
        assert!(Money::try_new(dec!(1980.50)).is_ok());
    }

    #[test]
    fn rejects_negative_amounts() {
        let err = Money::try_new(dec!(-1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NegativeNumber);
    }

    #[test]
    fn default_currency_is_jpy() {
        let m = Money::try_new(dec!(100)).unwrap();
        assert_eq!(m.currency(), Currency::Jpy);
    }

    #[test]
    fn deserialization_rejects_negative_amounts() {
        let result: Result<Money, _> = serde_json::from_str(r#"{"amount": "-5"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn deserialization_accepts_bare_numbers() {
        let m: Money = serde_json::from_str(r#"{"amount": 1200}"#).unwrap();
        assert_eq!(m.amount(), dec!(1200));
        assert_eq!(m.currency(), Currency::Jpy);
    }
}
