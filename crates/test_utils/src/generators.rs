//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};
use domain_reclamation::{Priority, Reclamation, ReclamationStatus, TransitionRequest};

use crate::builders::ReclamationBuilder;

pub fn priority_strategy() -> impl Strategy<Value = Priority> {
    proptest::sample::select(Priority::ALL.to_vec())
}

pub fn status_strategy() -> impl Strategy<Value = ReclamationStatus> {
    proptest::sample::select(ReclamationStatus::ALL.to_vec())
}

/// Instants spread over 2023-2025, whole seconds
pub fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    (0i64..3 * 365 * 24 * 3600).prop_map(move |secs| start + Duration::seconds(secs))
}

/// Any transition request, including ones the lifecycle rejects
pub fn transition_request_strategy() -> impl Strategy<Value = TransitionRequest> {
    (
        proptest::option::of(status_strategy()),
        proptest::option::of(priority_strategy()),
        proptest::option::of("[a-z ]{0,20}"),
    )
        .prop_map(|(new_status, new_priority, comment)| TransitionRequest {
            new_status,
            new_priority,
            comment,
        })
}

/// Live reclamation in any status and priority
pub fn reclamation_strategy() -> impl Strategy<Value = Reclamation> {
    (status_strategy(), priority_strategy(), instant_strategy(), 0i64..400).prop_map(
        |(status, priority, created_at, hours)| {
            ReclamationBuilder::new()
                .title("Panne générée")
                .status(status)
                .priority(priority)
                .created_at(created_at)
                .resolved_after_hours(hours)
                .build()
        },
    )
}

/// Non-negative EUR amounts with cents
pub fn eur_money_strategy() -> impl Strategy<Value = Money> {
    (0i64..10_000_000).prop_map(|minor| Money::from_minor(minor, Currency::EUR))
}

/// Labour hours in quarter-hour steps, up to 40h
pub fn labour_hours_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=160).prop_map(|quarters| Decimal::new(quarters * 25, 2))
}
