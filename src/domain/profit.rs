//! Profitability metrics for a (cost, price) pair.
//!
//! Two entry points with deliberately different failure behavior:
//!
//! - [`compute_profit`] is total. It always returns a report, including a
//!   negative-profit one, so a UI can show live numbers while the user types.
//! - [`assert_profitable`] is the submission gate. It fails with
//!   [`ErrorKind::CostGreaterThanPrice`] when a positive cost meets a
//!   positive price it cannot beat.

use rust_decimal::Decimal;
use serde::Serialize;

use super::money::Money;
use crate::error::{profit_error, AppError, ErrorKind};

/// Derived profitability metrics for one (cost, price) pair.
///
/// Stored values are unrounded; rounding happens only in the `*_display`
/// formatting methods so repeated recalculation never compounds error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfitReport {
    profit: Decimal,
    margin_pct: Decimal,
    roi_pct: Decimal,
    is_profitable: bool,
}

impl ProfitReport {
    /// Profit in currency units. May be negative.
    #[must_use]
    pub const fn profit(&self) -> Decimal {
        self.profit
    }

    /// Profit as a percentage of selling price. `0` when price is zero.
    #[must_use]
    pub const fn margin_pct(&self) -> Decimal {
        self.margin_pct
    }

    /// Profit as a percentage of cost. `0` when cost is zero.
    #[must_use]
    pub const fn roi_pct(&self) -> Decimal {
        self.roi_pct
    }

    #[must_use]
    pub const fn is_profitable(&self) -> bool {
        self.is_profitable
    }

    /// Profit formatted to two decimal places.
    #[must_use]
    pub fn profit_display(&self) -> String {
        format!("{:.2}", self.profit)
    }

    /// Margin formatted to one decimal place.
    #[must_use]
    pub fn margin_display(&self) -> String {
        format!("{:.1}", self.margin_pct)
    }

    /// ROI formatted to one decimal place.
    #[must_use]
    pub fn roi_display(&self) -> String {
        format!("{:.1}", self.roi_pct)
    }
}

/// Compute profit, margin, and ROI for a (cost, price) pair.
///
/// Total: zero price and zero cost are the "empty form" state and produce an
/// all-zero, not-profitable report rather than an error. Divisions by zero
/// are replaced by the documented `0` sentinels.
#[must_use]
pub fn compute_profit(cost: &Money, price: &Money) -> ProfitReport {
    let profit = price.amount() - cost.amount();

    let margin_pct = if price.amount() > Decimal::ZERO {
        profit / price.amount() * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let roi_pct = if cost.amount() > Decimal::ZERO {
        profit / cost.amount() * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    ProfitReport {
        profit,
        margin_pct,
        roi_pct,
        is_profitable: profit > Decimal::ZERO,
    }
}

/// Gate a (cost, price) pair for submission.
///
/// # Errors
/// Fails with [`ErrorKind::CostGreaterThanPrice`] iff both values are
/// positive and cost is not strictly below price. Zero on either side is
/// left to field validation.
pub fn assert_profitable(cost: &Money, price: &Money) -> Result<(), AppError> {
    if cost.amount() > Decimal::ZERO
        && price.amount() > Decimal::ZERO
        && cost.amount() >= price.amount()
    {
        return Err(profit_error(ErrorKind::CostGreaterThanPrice)
            .with_message(format!(
                "cost {} is not below price {}",
                cost.amount(),
                price.amount()
            ))
            .with_context("cost", cost.amount())
            .with_context("price", price.amount()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(amount: Decimal) -> Money {
        Money::try_new(amount).unwrap()
    }

    #[test]
    fn profit_is_price_minus_cost() {
        let report = compute_profit(&money(dec!(1000)), &money(dec!(1500)));
        assert_eq!(report.profit(), dec!(500));
        assert!(report.is_profitable());
    }

    #[test]
    fn margin_and_roi_for_typical_pair() {
        let report = compute_profit(&money(dec!(1000)), &money(dec!(1500)));
        assert_eq!(report.margin_display(), "33.3");
        assert_eq!(report.roi_display(), "50.0");
    }

    #[test]
    fn zero_price_reports_zero_margin() {
        let report = compute_profit(&money(dec!(100)), &money(dec!(0)));
        assert_eq!(report.margin_pct(), Decimal::ZERO);
        assert_eq!(report.profit(), dec!(-100));
    }

    #[test]
    fn zero_cost_reports_zero_roi() {
        let report = compute_profit(&money(dec!(0)), &money(dec!(100)));
        assert_eq!(report.roi_pct(), Decimal::ZERO);
        assert_eq!(report.margin_pct(), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn empty_form_state_is_all_zero_and_not_profitable() {
        let report = compute_profit(&Money::zero(), &Money::zero());
        assert_eq!(report.profit(), Decimal::ZERO);
        assert_eq!(report.margin_pct(), Decimal::ZERO);
        assert_eq!(report.roi_pct(), Decimal::ZERO);
        assert!(!report.is_profitable());
    }

    #[test]
    fn report_still_returned_when_cost_exceeds_price() {
        let report = compute_profit(&money(dec!(1200)), &money(dec!(1000)));
        assert_eq!(report.profit(), dec!(-200));
        assert!(!report.is_profitable());
    }

    #[test]
    fn gate_fails_iff_cost_at_or_above_price_and_both_positive() {
        let err = assert_profitable(&money(dec!(1200)), &money(dec!(1000))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CostGreaterThanPrice);

        // Equality also fails the gate.
        assert!(assert_profitable(&money(dec!(1000)), &money(dec!(1000))).is_err());

        // Zero on either side is not the gate's concern.
        assert!(assert_profitable(&Money::zero(), &Money::zero()).is_ok());
        assert!(assert_profitable(&money(dec!(100)), &Money::zero()).is_ok());
        assert!(assert_profitable(&Money::zero(), &money(dec!(100))).is_ok());

        assert!(assert_profitable(&money(dec!(999)), &money(dec!(1000))).is_ok());
    }

    #[test]
    fn display_rounding_does_not_touch_stored_values() {
        let report = compute_profit(&money(dec!(3)), &money(dec!(10)));
        assert_eq!(report.profit_display(), "7.00");
        assert_eq!(report.margin_pct(), dec!(70));
        // 7/3 * 100 keeps full precision internally.
        assert_eq!(report.roi_display(), "233.3");
        assert!(report.roi_pct() > dec!(233.3));
    }
}
