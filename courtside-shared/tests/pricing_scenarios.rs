/// Scenario tests for the pricing engine against realistic rule sets
///
/// These mirror how admins actually lay out pricing: a broad weekday base,
/// an evening peak override, and weekend rates, checked across a whole
/// week of bookable hours.

use chrono::NaiveDate;
use courtside_shared::models::court::Court;
use courtside_shared::models::pricing_rule::PricingRule;
use courtside_shared::pricing::{self, PricingError};
use mongodb::bson::{oid::ObjectId, DateTime};

fn rule(day_start: u8, day_end: u8, hour_start: u8, hour_end: u8, rate: i64) -> PricingRule {
    let now = DateTime::now();
    PricingRule {
        id: ObjectId::new(),
        court_id: ObjectId::new(),
        day_start,
        day_end,
        hour_start,
        hour_end,
        rate,
        label: None,
        created_at: now,
        updated_at: now,
    }
}

/// Weekday base, weekday evening peak, flat weekend: the standard layout.
fn standard_rules() -> Vec<PricingRule> {
    vec![
        rule(1, 5, 8, 23, 150_000),  // weekday base
        rule(1, 5, 17, 22, 200_000), // weekday evening peak
        rule(6, 6, 8, 23, 250_000),  // Saturday
        rule(0, 0, 8, 23, 250_000),  // Sunday
    ]
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn weekday_daytime_uses_base_rate() {
    // 2024-03-06 is a Wednesday.
    let q = pricing::quote(&standard_rules(), date(2024, 3, 6), &[9, 10]).unwrap();
    assert_eq!(q.total, 300_000);
}

#[test]
fn weekday_evening_uses_peak_rate() {
    let rules = standard_rules();
    let wednesday = date(2024, 3, 6);

    // 16:00 still at base, 17:00-21:00 at peak, 22:00 back to base.
    assert_eq!(pricing::resolve_rate(&rules, wednesday, 16), Some(150_000));
    assert_eq!(pricing::resolve_rate(&rules, wednesday, 17), Some(200_000));
    assert_eq!(pricing::resolve_rate(&rules, wednesday, 21), Some(200_000));
    assert_eq!(pricing::resolve_rate(&rules, wednesday, 22), Some(150_000));
}

#[test]
fn weekend_days_use_weekend_rate_all_day() {
    let rules = standard_rules();

    // 2024-03-09 is a Saturday, -03-10 a Sunday.
    for d in [date(2024, 3, 9), date(2024, 3, 10)] {
        assert_eq!(pricing::resolve_rate(&rules, d, 10), Some(250_000));
        assert_eq!(pricing::resolve_rate(&rules, d, 19), Some(250_000));
    }
}

#[test]
fn booking_spanning_peak_boundary_mixes_rates() {
    let q = pricing::quote(&standard_rules(), date(2024, 3, 6), &[16, 17]).unwrap();
    assert_eq!(q.total, 150_000 + 200_000);
    assert_eq!(q.slots[0].rate, 150_000);
    assert_eq!(q.slots[1].rate, 200_000);
}

#[test]
fn hours_before_opening_rule_are_unpriced() {
    let err = pricing::quote(&standard_rules(), date(2024, 3, 6), &[7]).unwrap_err();
    assert_eq!(err, PricingError::UnpricedSlots(vec![7]));
}

#[test]
fn every_bookable_hour_of_the_week_is_priced() {
    // With the standard layout, a court open 08:00-23:00 has a rate for
    // every slot on every day; a gap would strand bookable hours.
    let rules = standard_rules();
    let now = DateTime::now();
    let court = Court {
        id: ObjectId::new(),
        name: "Court A".to_string(),
        description: None,
        open_time: "08:00".to_string(),
        close_time: "23:00".to_string(),
        surface: None,
        active: true,
        created_at: now,
        updated_at: now,
    };

    // 2024-03-03 is a Sunday; the following seven days cover every weekday.
    for offset in 0..7 {
        let d = date(2024, 3, 3 + offset);
        for slot in court.slot_hours() {
            assert!(
                pricing::resolve_rate(&rules, d, slot).is_some(),
                "slot {} on {} has no rate",
                slot,
                d
            );
        }
    }
}
