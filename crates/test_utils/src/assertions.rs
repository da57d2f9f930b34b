//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful failure
//! messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_reclamation::ReclamationHistory;

/// Asserts currency and amount, ignoring trailing zeros
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount().normalize(),
        expected.amount().normalize(),
        "Amount mismatch: actual={}, expected={}",
        actual.amount(),
        expected.amount()
    );
}

/// Asserts a ratio lies in [0, 1] with at most four decimal places
pub fn assert_rate(rate: Decimal) {
    assert!(
        rate >= Decimal::ZERO && rate <= Decimal::ONE,
        "Rate out of bounds: {}",
        rate
    );
    assert!(rate.normalize().scale() <= 4, "Rate not rounded to 4 places: {}", rate);
}

/// Asserts history timestamps of one reclamation strictly increase
pub fn assert_history_ordered(entries: &[ReclamationHistory]) {
    for pair in entries.windows(2) {
        assert_eq!(
            pair[0].reclamation_id, pair[1].reclamation_id,
            "History mixes reclamations"
        );
        assert!(
            pair[0].changed_at < pair[1].changed_at,
            "History not strictly increasing: {} then {}",
            pair[0].changed_at,
            pair[1].changed_at
        );
    }
}
