use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use sedori_engine::domain::{assert_profitable, compute_profit, Money};
use sedori_engine::error::ErrorKind;

fn money(amount: Decimal) -> Money {
    Money::try_new(amount).expect("non-negative amount")
}

#[test]
fn profit_identity_holds_across_inputs() {
    let pairs = [
        (dec!(0), dec!(0)),
        (dec!(0), dec!(100)),
        (dec!(100), dec!(0)),
        (dec!(1000), dec!(1500)),
        (dec!(1500), dec!(1000)),
        (dec!(0.01), dec!(99999999)),
    ];

    for (cost, price) in pairs {
        let report = compute_profit(&money(cost), &money(price));
        assert_eq!(report.profit(), price - cost, "cost={cost} price={price}");
        if price == Decimal::ZERO {
            assert_eq!(report.margin_pct(), Decimal::ZERO);
        }
        if cost == Decimal::ZERO {
            assert_eq!(report.roi_pct(), Decimal::ZERO);
        }
    }
}

#[test]
fn gate_fails_exactly_when_positive_cost_meets_positive_price_at_or_below_it() {
    // Failing side of the iff.
    for (cost, price) in [(dec!(1000), dec!(1000)), (dec!(1001), dec!(1000))] {
        let err = assert_profitable(&money(cost), &money(price)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CostGreaterThanPrice);
        assert_eq!(err.http_status(), 422);
    }

    // Passing side: strict inequality or a zero on either side.
    for (cost, price) in [
        (dec!(999), dec!(1000)),
        (dec!(0), dec!(0)),
        (dec!(0), dec!(1000)),
        (dec!(1000), dec!(0)),
    ] {
        assert!(
            assert_profitable(&money(cost), &money(price)).is_ok(),
            "cost={cost} price={price}"
        );
    }
}

#[test]
fn gate_error_carries_both_numbers_in_context() {
    let err = assert_profitable(&money(dec!(1200)), &money(dec!(1000))).unwrap_err();
    assert!(err.context_value("cost").is_some());
    assert!(err.context_value("price").is_some());
    assert!(!err.user_message().ja.is_empty());
}

#[test]
fn report_survives_repeated_recalculation_without_drift() {
    let cost = money(dec!(3));
    let price = money(dec!(7));

    let first = compute_profit(&cost, &price);
    let second = compute_profit(&cost, &price);
    assert_eq!(first, second);
    // Display rounding is not baked into the stored values.
    assert_eq!(first.margin_display(), "57.1");
    assert_ne!(first.margin_pct(), dec!(57.1));
}

#[test]
fn negative_money_is_rejected_at_construction() {
    let err = Money::try_new(dec!(-0.01)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NegativeNumber);
}
