/// Pricing rule endpoints
///
/// Admin CRUD plus the public quote endpoint.
///
/// # Endpoints
///
/// - `GET    /v1/courts/:id/quote?date=&slots=` - Price a slot set (public)
/// - `GET    /v1/admin/courts/:id/pricing-rules` - Rules for a court
/// - `POST   /v1/admin/courts/:id/pricing-rules` - Create rule
/// - `PUT    /v1/admin/pricing-rules/:id` - Update rule
/// - `DELETE /v1/admin/pricing-rules/:id` - Delete rule

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::parse_object_id,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use courtside_shared::{
    models::{
        court::Court,
        pricing_rule::{CreatePricingRule, PricingRule, UpdatePricingRule},
    },
    pricing,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Pricing rule representation returned by the API
#[derive(Debug, Serialize)]
pub struct PricingRuleResponse {
    /// Rule ID (ObjectId hex)
    pub id: String,

    /// Court the rule prices (ObjectId hex)
    pub court_id: String,

    /// First weekday covered (0 = Sunday)
    pub day_start: u8,

    /// Last weekday covered, inclusive
    pub day_end: u8,

    /// First hour covered
    pub hour_start: u8,

    /// One past the last hour covered
    pub hour_end: u8,

    /// Hourly rate in rupiah
    pub rate: i64,

    /// Admin-facing label
    pub label: Option<String>,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<PricingRule> for PricingRuleResponse {
    fn from(rule: PricingRule) -> Self {
        Self {
            id: rule.id.to_hex(),
            court_id: rule.court_id.to_hex(),
            day_start: rule.day_start,
            day_end: rule.day_end,
            hour_start: rule.hour_start,
            hour_end: rule.hour_end,
            rate: rule.rate,
            label: rule.label,
            created_at: rule.created_at.to_chrono(),
        }
    }
}

/// Create pricing rule request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePricingRuleRequest {
    /// First weekday covered (0 = Sunday)
    #[validate(range(max = 6, message = "Days run 0 (Sunday) to 6 (Saturday)"))]
    pub day_start: u8,

    /// Last weekday covered, inclusive
    #[validate(range(max = 6, message = "Days run 0 (Sunday) to 6 (Saturday)"))]
    pub day_end: u8,

    /// First hour covered
    #[validate(range(max = 24, message = "Hours run 0 to 24"))]
    pub hour_start: u8,

    /// One past the last hour covered
    #[validate(range(max = 24, message = "Hours run 0 to 24"))]
    pub hour_end: u8,

    /// Hourly rate in rupiah
    #[validate(range(min = 1, message = "Rate must be positive"))]
    pub rate: i64,

    /// Admin-facing label
    #[validate(length(max = 100, message = "Label must be at most 100 characters"))]
    pub label: Option<String>,
}

/// Update pricing rule request; all fields optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePricingRuleRequest {
    #[validate(range(max = 6, message = "Days run 0 (Sunday) to 6 (Saturday)"))]
    pub day_start: Option<u8>,

    #[validate(range(max = 6, message = "Days run 0 (Sunday) to 6 (Saturday)"))]
    pub day_end: Option<u8>,

    #[validate(range(max = 24, message = "Hours run 0 to 24"))]
    pub hour_start: Option<u8>,

    #[validate(range(max = 24, message = "Hours run 0 to 24"))]
    pub hour_end: Option<u8>,

    #[validate(range(min = 1, message = "Rate must be positive"))]
    pub rate: Option<i64>,

    #[validate(length(max = 100, message = "Label must be at most 100 characters"))]
    pub label: Option<String>,
}

/// Quote query
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    /// Date to price, `"YYYY-MM-DD"`
    pub date: NaiveDate,

    /// Comma-separated slot hours, e.g. `18,19,20`
    pub slots: String,
}

/// One slot of a quote
#[derive(Debug, Serialize)]
pub struct SlotQuoteResponse {
    /// Slot hour
    pub slot: u8,

    /// Hourly rate in rupiah
    pub rate: i64,

    /// Rule that supplied the rate (ObjectId hex)
    pub rule_id: String,
}

/// Quote response
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    /// Court ID (ObjectId hex)
    pub court_id: String,

    /// Date priced
    pub date: NaiveDate,

    /// Per-slot rates
    pub slots: Vec<SlotQuoteResponse>,

    /// Reservation total in rupiah
    pub total: i64,
}

/// Cross-field range checks shared by create and update
fn validate_rule_ranges(
    day_start: u8,
    day_end: u8,
    hour_start: u8,
    hour_end: u8,
) -> Result<(), ApiError> {
    if day_end < day_start {
        return Err(ApiError::validation(
            "day_end",
            "Must be at or after day_start",
        ));
    }
    if hour_end <= hour_start {
        return Err(ApiError::validation("hour_end", "Must be after hour_start"));
    }
    Ok(())
}

/// Parses a comma-separated slot list from a query string
fn parse_slot_list(raw: &str) -> Result<Vec<u8>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>()
                .map_err(|_| ApiError::BadRequest(format!("Invalid slot '{}'", s)))
        })
        .collect()
}

/// Rules for a court (admin)
pub async fn list_rules(
    State(state): State<AppState>,
    Path(court_id): Path<String>,
) -> ApiResult<Json<Vec<PricingRuleResponse>>> {
    let court_id = parse_object_id(&court_id, "court")?;
    Court::find_by_id(&state.db, court_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Court not found".to_string()))?;

    let rules = PricingRule::list_for_court(&state.db, court_id).await?;
    Ok(Json(rules.into_iter().map(Into::into).collect()))
}

/// Create a pricing rule for a court (admin)
pub async fn create_rule(
    State(state): State<AppState>,
    Path(court_id): Path<String>,
    Json(req): Json<CreatePricingRuleRequest>,
) -> ApiResult<Json<PricingRuleResponse>> {
    req.validate()?;
    validate_rule_ranges(req.day_start, req.day_end, req.hour_start, req.hour_end)?;

    let court_id = parse_object_id(&court_id, "court")?;
    Court::find_by_id(&state.db, court_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Court not found".to_string()))?;

    let rule = PricingRule::create(
        &state.db,
        CreatePricingRule {
            court_id,
            day_start: req.day_start,
            day_end: req.day_end,
            hour_start: req.hour_start,
            hour_end: req.hour_end,
            rate: req.rate,
            label: req.label,
        },
    )
    .await?;

    tracing::info!(rule_id = %rule.id, court_id = %court_id, rate = rule.rate, "pricing rule created");

    Ok(Json(rule.into()))
}

/// Update a pricing rule (admin)
///
/// Ranges are validated against the resulting combination.
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePricingRuleRequest>,
) -> ApiResult<Json<PricingRuleResponse>> {
    req.validate()?;

    let id = parse_object_id(&id, "pricing rule")?;
    let existing = PricingRule::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pricing rule not found".to_string()))?;

    validate_rule_ranges(
        req.day_start.unwrap_or(existing.day_start),
        req.day_end.unwrap_or(existing.day_end),
        req.hour_start.unwrap_or(existing.hour_start),
        req.hour_end.unwrap_or(existing.hour_end),
    )?;

    let rule = PricingRule::update(
        &state.db,
        id,
        UpdatePricingRule {
            day_start: req.day_start,
            day_end: req.day_end,
            hour_start: req.hour_start,
            hour_end: req.hour_end,
            rate: req.rate,
            label: req.label,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Pricing rule not found".to_string()))?;

    Ok(Json(rule.into()))
}

/// Delete a pricing rule (admin)
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_object_id(&id, "pricing rule")?;
    let deleted = PricingRule::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Pricing rule not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Price a slot set for a court and date (public)
///
/// This is the quote the booking flow shows before checkout; reservation
/// creation runs the same resolution, so the numbers always agree.
pub async fn quote_slots(
    State(state): State<AppState>,
    Path(court_id): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> ApiResult<Json<QuoteResponse>> {
    let court_id = parse_object_id(&court_id, "court")?;
    Court::find_by_id(&state.db, court_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Court not found".to_string()))?;

    let slots = parse_slot_list(&query.slots)?;
    let rules = PricingRule::list_for_court(&state.db, court_id).await?;
    let quote = pricing::quote(&rules, query.date, &slots)?;

    Ok(Json(QuoteResponse {
        court_id: court_id.to_hex(),
        date: query.date,
        slots: quote
            .slots
            .into_iter()
            .map(|s| SlotQuoteResponse {
                slot: s.slot,
                rate: s.rate,
                rule_id: s.rule_id.to_hex(),
            })
            .collect(),
        total: quote.total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slot_list() {
        assert_eq!(parse_slot_list("18,19,20").unwrap(), vec![18, 19, 20]);
        assert_eq!(parse_slot_list(" 8 , 9 ").unwrap(), vec![8, 9]);
        assert_eq!(parse_slot_list("7").unwrap(), vec![7]);

        assert!(parse_slot_list("a,b").is_err());
        assert!(parse_slot_list("18,-1").is_err());
        assert!(parse_slot_list("300").is_err());
    }

    #[test]
    fn test_rule_range_validation() {
        assert!(validate_rule_ranges(1, 5, 8, 22).is_ok());
        assert!(validate_rule_ranges(3, 3, 0, 24).is_ok());

        assert!(validate_rule_ranges(5, 1, 8, 22).is_err());
        assert!(validate_rule_ranges(1, 5, 22, 8).is_err());
        assert!(validate_rule_ranges(1, 5, 10, 10).is_err());
    }
}
