/// Pricing-rule resolution and reservation quoting
///
/// Given a court's pricing rules, a date, and a set of hourly slots, this
/// module resolves the applicable hourly rate for every slot and sums the
/// reservation total.
///
/// # Resolution
///
/// A rule applies to slot `h` on date `d` when its inclusive weekday range
/// contains `weekday(d)` (0 = Sunday) and its half-open hour range contains
/// `h`. Rules may overlap; the most specific one wins:
///
/// 1. narrower hour span
/// 2. then narrower day span
/// 3. then the most recently updated rule
///
/// This lets an admin lay down a broad weekday rule and punch out a narrow
/// peak-hours override without deleting anything. A slot no rule covers has
/// no price, and quoting a set containing one fails rather than guessing.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use courtside_shared::models::pricing_rule::PricingRule;
/// use courtside_shared::pricing;
/// use mongodb::bson::{oid::ObjectId, DateTime};
///
/// let base = PricingRule {
///     id: ObjectId::new(),
///     court_id: ObjectId::new(),
///     day_start: 1,
///     day_end: 5,
///     hour_start: 8,
///     hour_end: 23,
///     rate: 150_000,
///     label: None,
///     created_at: DateTime::now(),
///     updated_at: DateTime::now(),
/// };
///
/// // A Wednesday
/// let date = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
/// let quote = pricing::quote(&[base], date, &[19, 20]).unwrap();
/// assert_eq!(quote.total, 300_000);
/// ```

use chrono::{Datelike, NaiveDate};
use mongodb::bson::oid::ObjectId;
use std::cmp::Reverse;

use crate::models::pricing_rule::PricingRule;

/// Error produced while quoting a slot set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// No slots were requested
    #[error("no slots requested")]
    EmptySlots,

    /// A slot hour outside 0..24 was requested
    #[error("invalid slot hour {0}")]
    InvalidSlot(u8),

    /// No rule covers these slots on the requested date
    #[error("no pricing rule covers slots {0:?}")]
    UnpricedSlots(Vec<u8>),
}

/// Resolved rate for one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotQuote {
    /// Slot hour
    pub slot: u8,

    /// Hourly rate in rupiah
    pub rate: i64,

    /// Rule that supplied the rate
    pub rule_id: ObjectId,
}

/// Full quote for a slot set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Per-slot rates, in slot order
    pub slots: Vec<SlotQuote>,

    /// Sum of the per-slot rates, rupiah
    pub total: i64,
}

/// Weekday index of a date, 0 = Sunday through 6 = Saturday
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Sorts and deduplicates a requested slot list
pub fn normalize_slots(slots: &[u8]) -> Vec<u8> {
    let mut slots = slots.to_vec();
    slots.sort_unstable();
    slots.dedup();
    slots
}

/// Resolves the winning rule for one slot on one weekday
///
/// Returns `None` when no rule covers the slot.
pub fn resolve_rule<'a>(
    rules: &'a [PricingRule],
    dow: u8,
    slot: u8,
) -> Option<&'a PricingRule> {
    rules
        .iter()
        .filter(|r| r.applies(dow, slot))
        .min_by_key(|r| (r.hour_span(), r.day_span(), Reverse(r.updated_at)))
}

/// Resolves the hourly rate for one slot on one date
pub fn resolve_rate(rules: &[PricingRule], date: NaiveDate, slot: u8) -> Option<i64> {
    resolve_rule(rules, weekday_index(date), slot).map(|r| r.rate)
}

/// Quotes a slot set against a court's rules
///
/// Slots are normalized (sorted, deduplicated) before quoting. Fails when
/// the set is empty, contains an hour outside 0..24, or contains slots no
/// rule covers; the uncovered slots are all reported at once.
pub fn quote(
    rules: &[PricingRule],
    date: NaiveDate,
    slots: &[u8],
) -> Result<Quote, PricingError> {
    let slots = normalize_slots(slots);
    if slots.is_empty() {
        return Err(PricingError::EmptySlots);
    }
    if let Some(&bad) = slots.iter().find(|s| **s >= 24) {
        return Err(PricingError::InvalidSlot(bad));
    }

    let dow = weekday_index(date);
    let mut quoted = Vec::with_capacity(slots.len());
    let mut unpriced = Vec::new();

    for &slot in &slots {
        match resolve_rule(rules, dow, slot) {
            Some(rule) => quoted.push(SlotQuote {
                slot,
                rate: rule.rate,
                rule_id: rule.id,
            }),
            None => unpriced.push(slot),
        }
    }

    if !unpriced.is_empty() {
        return Err(PricingError::UnpricedSlots(unpriced));
    }

    let total = quoted.iter().map(|q| q.rate).sum();
    Ok(Quote {
        slots: quoted,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::DateTime;

    fn rule(
        day_start: u8,
        day_end: u8,
        hour_start: u8,
        hour_end: u8,
        rate: i64,
    ) -> PricingRule {
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

    // 2024-03-04 is a Monday; -03-06 a Wednesday; -03-09 a Saturday; -03-10 a Sunday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }
    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }
    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_weekday_index_is_sunday_based() {
        assert_eq!(weekday_index(sunday()), 0);
        assert_eq!(weekday_index(monday()), 1);
        assert_eq!(weekday_index(saturday()), 6);
    }

    #[test]
    fn test_single_rule_quote() {
        let rules = vec![rule(0, 6, 0, 24, 150_000)];
        let q = quote(&rules, monday(), &[10, 11, 12]).unwrap();
        assert_eq!(q.total, 450_000);
        assert_eq!(q.slots.len(), 3);
        assert!(q.slots.iter().all(|s| s.rate == 150_000));
    }

    #[test]
    fn test_slots_are_normalized() {
        let rules = vec![rule(0, 6, 0, 24, 100_000)];
        let q = quote(&rules, monday(), &[12, 10, 12, 10]).unwrap();
        assert_eq!(q.slots.iter().map(|s| s.slot).collect::<Vec<_>>(), vec![10, 12]);
        assert_eq!(q.total, 200_000);
    }

    #[test]
    fn test_weekend_rule_only_matches_weekend() {
        let weekend = rule(6, 6, 8, 22, 250_000);
        let rules = vec![weekend];

        assert_eq!(resolve_rate(&rules, saturday(), 10), Some(250_000));
        assert_eq!(resolve_rate(&rules, monday(), 10), None);
    }

    #[test]
    fn test_narrower_hour_span_wins() {
        let base = rule(1, 5, 8, 23, 150_000);
        let peak = rule(1, 5, 17, 22, 200_000);
        let rules = vec![base, peak];

        // Daytime slot: only the base rule applies.
        assert_eq!(resolve_rate(&rules, monday(), 10), Some(150_000));
        // Evening slot: both apply, the narrower peak override wins.
        assert_eq!(resolve_rate(&rules, monday(), 19), Some(200_000));
    }

    #[test]
    fn test_narrower_day_span_breaks_hour_ties() {
        let all_week = rule(0, 6, 8, 22, 150_000);
        let friday = rule(5, 5, 8, 22, 180_000);
        let rules = vec![all_week, friday];

        let friday_date = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(weekday_index(friday_date), 5);
        assert_eq!(resolve_rate(&rules, friday_date, 10), Some(180_000));
        assert_eq!(resolve_rate(&rules, monday(), 10), Some(150_000));
    }

    #[test]
    fn test_equal_spans_newest_update_wins() {
        let mut old = rule(0, 6, 8, 22, 100_000);
        let mut new = rule(0, 6, 8, 22, 120_000);
        old.updated_at = DateTime::from_millis(1_000);
        new.updated_at = DateTime::from_millis(2_000);

        // Order in the slice must not matter.
        assert_eq!(resolve_rate(&[old.clone(), new.clone()], monday(), 10), Some(120_000));
        assert_eq!(resolve_rate(&[new, old], monday(), 10), Some(120_000));
    }

    #[test]
    fn test_mixed_rates_sum() {
        let base = rule(1, 5, 8, 23, 150_000);
        let peak = rule(1, 5, 17, 22, 200_000);
        let rules = vec![base, peak];

        // 16:00 at base rate, 17:00 and 18:00 at peak rate.
        let q = quote(&rules, monday(), &[16, 17, 18]).unwrap();
        assert_eq!(q.total, 150_000 + 200_000 + 200_000);
    }

    #[test]
    fn test_unpriced_slots_reported() {
        let rules = vec![rule(1, 5, 8, 17, 150_000)];
        let err = quote(&rules, monday(), &[16, 17, 18]).unwrap_err();
        assert_eq!(err, PricingError::UnpricedSlots(vec![17, 18]));
    }

    #[test]
    fn test_no_rules_means_everything_unpriced() {
        let err = quote(&[], monday(), &[10]).unwrap_err();
        assert_eq!(err, PricingError::UnpricedSlots(vec![10]));
    }

    #[test]
    fn test_empty_slot_set_rejected() {
        let rules = vec![rule(0, 6, 0, 24, 150_000)];
        assert_eq!(quote(&rules, monday(), &[]).unwrap_err(), PricingError::EmptySlots);
    }

    #[test]
    fn test_out_of_range_slot_rejected() {
        let rules = vec![rule(0, 6, 0, 24, 150_000)];
        assert_eq!(
            quote(&rules, monday(), &[10, 24]).unwrap_err(),
            PricingError::InvalidSlot(24)
        );
    }
}
