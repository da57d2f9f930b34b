//! Pre-built Test Fixtures
//!
//! Fixed instants and amounts keep assertions predictable; `FakeData` fills
//! in names and contact details nobody asserts on.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::address::en::{CityName, StreetName, ZipCode};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, FixedClock, Money, Timezone};
use domain_client::Address;

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Mid-March 2024, noon UTC; the "now" of most scenarios
    pub fn reference_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    /// First instant of March 2024 in Paris (23:00 UTC the day before)
    pub fn paris_month_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 29, 23, 0, 0).unwrap()
    }

    /// `reference_now` shifted by whole hours
    pub fn hours_from_now(hours: i64) -> DateTime<Utc> {
        Self::reference_now() + chrono::Duration::hours(hours)
    }

    pub fn paris() -> Timezone {
        Timezone::default()
    }

    /// Clock frozen at `reference_now`
    pub fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Self::reference_now()))
    }
}

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::EUR)
    }

    pub fn eur_100() -> Money {
        Self::eur(dec!(100.00))
    }

    /// Standard technician rate
    pub fn hourly_rate() -> Money {
        Self::eur(dec!(45.00))
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Randomised but well-formed contact data
pub struct FakeData;

impl FakeData {
    pub fn name() -> String {
        Name().fake()
    }

    pub fn email() -> String {
        SafeEmail().fake::<String>().to_lowercase()
    }

    /// French-style mobile number
    pub fn phone() -> String {
        format!("06{:08}", (0u32..100_000_000).fake::<u32>())
    }

    pub fn address() -> Address {
        Address::new(
            format!("{} {}", (1u32..200).fake::<u32>(), StreetName().fake::<String>()),
            CityName().fake::<String>(),
            ZipCode().fake::<String>(),
            "France",
        )
    }

    /// Short problem description usable as a reclamation title
    pub fn title() -> String {
        let sentence: String = Sentence(2..6).fake();
        sentence.chars().take(120).collect()
    }
}
