//! Tests for domain_intervention

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, PartId, ReclamationId, TechnicianId};
use domain_intervention::{
    Intervention, InterventionError, InterventionStatus, PartUsage, ScheduleIntervention,
};

fn schedule(under_warranty: bool) -> Intervention {
    let at = Utc.with_ymd_and_hms(2024, 2, 5, 8, 0, 0).unwrap();
    Intervention::schedule(
        ScheduleIntervention {
            reclamation_id: ReclamationId::new_v7(),
            technician_id: TechnicianId::new_v7(),
            scheduled_at: at + Duration::days(1),
            hourly_rate: Money::new(dec!(60), Currency::EUR),
            under_warranty,
        },
        at,
    )
    .unwrap()
}

#[test]
fn test_full_visit_records_timestamps() {
    let mut i = schedule(false);
    let start = Utc.with_ymd_and_hms(2024, 2, 6, 9, 0, 0).unwrap();
    i.start(start).unwrap();
    i.complete("Résistance remplacée", dec!(1.25), start + Duration::minutes(75))
        .unwrap();

    assert_eq!(i.status, InterventionStatus::Completed);
    assert_eq!(i.started_at, Some(start));
    assert_eq!(i.duration(), Some(Duration::minutes(75)));
    assert_eq!(i.total_cost().unwrap().amount(), dec!(75));
}

#[test]
fn test_cancel_with_reason() {
    let mut i = schedule(false);
    i.cancel(Some("client absent"), Utc::now()).unwrap();
    assert_eq!(i.status, InterventionStatus::Cancelled);
    assert_eq!(i.report.as_deref(), Some("Cancelled: client absent"));
    assert!(i.start(Utc::now()).is_err());
}

#[test]
fn test_blank_report_rejected() {
    let mut i = schedule(false);
    i.start(Utc::now()).unwrap();
    assert!(matches!(
        i.complete("  ", dec!(1), Utc::now()),
        Err(InterventionError::Validation(_))
    ));
    assert_eq!(i.status, InterventionStatus::InProgress);
}

#[test]
fn test_negative_hours_rejected() {
    let mut i = schedule(false);
    i.start(Utc::now()).unwrap();
    assert!(i.complete("ok", dec!(-1), Utc::now()).is_err());
}

#[test]
fn test_status_parses_from_str() {
    assert_eq!("in_progress".parse::<InterventionStatus>().unwrap(), InterventionStatus::InProgress);
    assert!("done".parse::<InterventionStatus>().is_err());
}

proptest! {
    #[test]
    fn prop_total_is_labour_plus_parts(
        hours_tenths in 0i64..200,
        quantities in proptest::collection::vec(1u32..10, 0..5),
        warranty in any::<bool>(),
    ) {
        let mut i = schedule(warranty);
        i.start(Utc::now()).unwrap();
        let unit = Money::new(dec!(7.30), Currency::EUR);
        for q in &quantities {
            i.add_part(PartUsage::new(PartId::new_v7(), *q, unit), Utc::now()).unwrap();
        }
        let hours = Decimal::new(hours_tenths, 1);
        i.complete("ok", hours, Utc::now()).unwrap();

        let parts: u32 = quantities.iter().sum();
        let expected = if warranty {
            Decimal::ZERO
        } else {
            dec!(60) * hours + dec!(7.30) * Decimal::from(parts)
        };
        prop_assert_eq!(i.total_cost().unwrap().amount(), expected);
    }
}
