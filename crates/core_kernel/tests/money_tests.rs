//! Tests for Money and Rate through the crate-root exports

use core_kernel::{Currency, Money, MoneyError, Rate};
use rust_decimal_macros::dec;

mod rate {
    use super::*;

    #[test]
    fn test_vat_rate_from_percentage() {
        let vat = Rate::from_percentage(dec!(20));
        assert_eq!(vat.as_decimal(), dec!(0.20));
        assert_eq!(vat.as_percentage(), dec!(20));
        assert_eq!(vat.to_string(), "20%");
    }

    #[test]
    fn test_vat_applied_to_labour() {
        let labour = Money::new(dec!(135.00), Currency::EUR);
        let vat = Rate::from_percentage(dec!(20)).apply(&labour);

        assert_eq!(vat.amount(), dec!(27.00));
        assert_eq!(vat.currency(), Currency::EUR);
    }

    #[test]
    fn test_zero_rate_yields_zero() {
        let amount = Money::new(dec!(99.99), Currency::EUR);
        assert!(Rate::new(dec!(0)).apply(&amount).is_zero());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_new_keeps_four_decimal_places() {
        let m = Money::new(dec!(12.345678), Currency::EUR);
        assert_eq!(m.amount(), dec!(12.3457));
        assert_eq!(m.round_to_currency().amount(), dec!(12.35));
    }

    #[test]
    fn test_sum_rejects_mixed_currencies() {
        let amounts = [
            Money::new(dec!(10), Currency::EUR),
            Money::new(dec!(10), Currency::CHF),
        ];
        assert!(matches!(
            Money::sum(Currency::EUR, &amounts),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn test_subtraction_can_go_negative() {
        let a = Money::new(dec!(5), Currency::EUR);
        let b = Money::new(dec!(7.5), Currency::EUR);
        assert!(a.checked_sub(&b).unwrap().is_negative());
    }
}
