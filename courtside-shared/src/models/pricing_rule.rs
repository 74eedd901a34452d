/// Pricing rule model and collection operations
///
/// A pricing rule attaches an hourly rate to a court for a day-of-week range
/// and an hour range:
///
/// - `day_start..=day_end`: inclusive, 0 = Sunday through 6 = Saturday
/// - `hour_start..hour_end`: half-open, 0 through 24
///
/// Rules may overlap; resolution lives in [`crate::pricing`]. Rates are in
/// rupiah per hour.
///
/// # Example
///
/// A court that costs 150k on weekday daytimes and 200k on weekday evenings:
///
/// ```text
/// { day_start: 1, day_end: 5, hour_start: 8,  hour_end: 17, rate: 150_000 }
/// { day_start: 1, day_end: 5, hour_start: 17, hour_end: 23, rate: 200_000 }
/// ```

use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Database,
};
use serde::{Deserialize, Serialize};

/// Collection name for pricing rules
pub const COLLECTION: &str = "pricing_rules";

/// Pricing rule document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRule {
    /// Document id
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Court this rule prices
    pub court_id: ObjectId,

    /// First weekday the rule covers (0 = Sunday)
    pub day_start: u8,

    /// Last weekday the rule covers, inclusive
    pub day_end: u8,

    /// First hour the rule covers
    pub hour_start: u8,

    /// One past the last hour the rule covers
    pub hour_end: u8,

    /// Hourly rate in rupiah
    pub rate: i64,

    /// Optional admin-facing label (e.g. "weekend peak")
    pub label: Option<String>,

    /// When the rule was created
    pub created_at: DateTime,

    /// When the rule was last updated
    pub updated_at: DateTime,
}

/// Input for creating a pricing rule
#[derive(Debug, Clone)]
pub struct CreatePricingRule {
    pub court_id: ObjectId,
    pub day_start: u8,
    pub day_end: u8,
    pub hour_start: u8,
    pub hour_end: u8,
    pub rate: i64,
    pub label: Option<String>,
}

/// Pricing rule patch; only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdatePricingRule {
    pub day_start: Option<u8>,
    pub day_end: Option<u8>,
    pub hour_start: Option<u8>,
    pub hour_end: Option<u8>,
    pub rate: Option<i64>,
    pub label: Option<String>,
}

impl PricingRule {
    fn collection(db: &Database) -> mongodb::Collection<PricingRule> {
        db.collection::<PricingRule>(COLLECTION)
    }

    /// Number of weekdays the rule covers
    pub fn day_span(&self) -> u8 {
        self.day_end.saturating_sub(self.day_start) + 1
    }

    /// Number of hours the rule covers
    pub fn hour_span(&self) -> u8 {
        self.hour_end.saturating_sub(self.hour_start)
    }

    /// Whether the rule covers weekday `dow` (0 = Sunday)
    pub fn applies_on(&self, dow: u8) -> bool {
        self.day_start <= dow && dow <= self.day_end
    }

    /// Whether the rule covers slot `hour`
    pub fn applies_to_slot(&self, hour: u8) -> bool {
        self.hour_start <= hour && hour < self.hour_end
    }

    /// Whether the rule covers slot `hour` on weekday `dow`
    pub fn applies(&self, dow: u8, hour: u8) -> bool {
        self.applies_on(dow) && self.applies_to_slot(hour)
    }

    /// Creates a new pricing rule
    pub async fn create(
        db: &Database,
        data: CreatePricingRule,
    ) -> mongodb::error::Result<PricingRule> {
        let now = DateTime::now();
        let rule = PricingRule {
            id: ObjectId::new(),
            court_id: data.court_id,
            day_start: data.day_start,
            day_end: data.day_end,
            hour_start: data.hour_start,
            hour_end: data.hour_end,
            rate: data.rate,
            label: data.label,
            created_at: now,
            updated_at: now,
        };

        Self::collection(db).insert_one(&rule, None).await?;
        Ok(rule)
    }

    /// Finds a rule by id
    pub async fn find_by_id(
        db: &Database,
        id: ObjectId,
    ) -> mongodb::error::Result<Option<PricingRule>> {
        Self::collection(db).find_one(doc! { "_id": id }, None).await
    }

    /// Lists the rules for a court, oldest first
    pub async fn list_for_court(
        db: &Database,
        court_id: ObjectId,
    ) -> mongodb::error::Result<Vec<PricingRule>> {
        let options = FindOptions::builder().sort(doc! { "created_at": 1 }).build();

        let mut cursor = Self::collection(db)
            .find(doc! { "court_id": court_id }, options)
            .await?;
        let mut rules = Vec::new();
        while let Some(rule) = cursor.try_next().await? {
            rules.push(rule);
        }
        Ok(rules)
    }

    /// Applies a patch and returns the updated document
    pub async fn update(
        db: &Database,
        id: ObjectId,
        patch: UpdatePricingRule,
    ) -> mongodb::error::Result<Option<PricingRule>> {
        let mut set = doc! { "updated_at": DateTime::now() };
        if let Some(day_start) = patch.day_start {
            set.insert("day_start", day_start as i32);
        }
        if let Some(day_end) = patch.day_end {
            set.insert("day_end", day_end as i32);
        }
        if let Some(hour_start) = patch.hour_start {
            set.insert("hour_start", hour_start as i32);
        }
        if let Some(hour_end) = patch.hour_end {
            set.insert("hour_end", hour_end as i32);
        }
        if let Some(rate) = patch.rate {
            set.insert("rate", rate);
        }
        if let Some(label) = patch.label {
            set.insert("label", label);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Self::collection(db)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await
    }

    /// Deletes a rule; returns whether a document was removed
    pub async fn delete(db: &Database, id: ObjectId) -> mongodb::error::Result<bool> {
        let result = Self::collection(db).delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count == 1)
    }

    /// Deletes all rules for a court (used when the court is removed)
    pub async fn delete_for_court(
        db: &Database,
        court_id: ObjectId,
    ) -> mongodb::error::Result<u64> {
        let result = Self::collection(db)
            .delete_many(doc! { "court_id": court_id }, None)
            .await?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(day_start: u8, day_end: u8, hour_start: u8, hour_end: u8) -> PricingRule {
        let now = DateTime::now();
        PricingRule {
            id: ObjectId::new(),
            court_id: ObjectId::new(),
            day_start,
            day_end,
            hour_start,
            hour_end,
            rate: 150_000,
            label: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_day_range_is_inclusive() {
        let r = rule(1, 5, 8, 22);
        assert!(!r.applies_on(0));
        assert!(r.applies_on(1));
        assert!(r.applies_on(5));
        assert!(!r.applies_on(6));
        assert_eq!(r.day_span(), 5);
    }

    #[test]
    fn test_hour_range_is_half_open() {
        let r = rule(0, 6, 17, 22);
        assert!(!r.applies_to_slot(16));
        assert!(r.applies_to_slot(17));
        assert!(r.applies_to_slot(21));
        assert!(!r.applies_to_slot(22));
        assert_eq!(r.hour_span(), 5);
    }

    #[test]
    fn test_single_day_rule() {
        let r = rule(6, 6, 0, 24);
        assert!(r.applies(6, 0));
        assert!(r.applies(6, 23));
        assert!(!r.applies(5, 10));
        assert_eq!(r.day_span(), 1);
        assert_eq!(r.hour_span(), 24);
    }
}
