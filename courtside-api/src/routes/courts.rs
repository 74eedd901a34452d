/// Court endpoints
///
/// Public browsing plus the admin CRUD surface.
///
/// # Endpoints
///
/// - `GET    /v1/courts` - Active courts
/// - `GET    /v1/courts/:id` - Court detail
/// - `GET    /v1/courts/:id/availability?date=` - Per-slot price and taken flags
/// - `GET    /v1/admin/courts` - All courts, including deactivated
/// - `POST   /v1/admin/courts` - Create court
/// - `PUT    /v1/admin/courts/:id` - Update court
/// - `DELETE /v1/admin/courts/:id` - Delete court (refused with upcoming bookings)

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
        court::{minutes_from_midnight, Court, CreateCourt, UpdateCourt},
        pricing_rule::PricingRule,
        reservation::Reservation,
    },
    pricing,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Court representation returned by the API
#[derive(Debug, Serialize)]
pub struct CourtResponse {
    /// Court ID (ObjectId hex)
    pub id: String,

    /// Court name
    pub name: String,

    /// Description
    pub description: Option<String>,

    /// Opening time, `"HH:MM"`
    pub open_time: String,

    /// Closing time, `"HH:MM"`
    pub close_time: String,

    /// Playing surface label
    pub surface: Option<String>,

    /// Whether the court is bookable
    pub active: bool,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<Court> for CourtResponse {
    fn from(court: Court) -> Self {
        Self {
            id: court.id.to_hex(),
            name: court.name,
            description: court.description,
            open_time: court.open_time,
            close_time: court.close_time,
            surface: court.surface,
            active: court.active,
            created_at: court.created_at.to_chrono(),
        }
    }
}

/// Create court request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourtRequest {
    /// Court name (unique)
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Description
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    /// Opening time, `"HH:MM"`
    pub open_time: String,

    /// Closing time, `"HH:MM"`, after `open_time`
    pub close_time: String,

    /// Playing surface label
    #[validate(length(max = 50, message = "Surface must be at most 50 characters"))]
    pub surface: Option<String>,
}

/// Update court request; all fields optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCourtRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub open_time: Option<String>,

    pub close_time: Option<String>,

    #[validate(length(max = 50, message = "Surface must be at most 50 characters"))]
    pub surface: Option<String>,

    pub active: Option<bool>,
}

/// Availability query
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Date to check, `"YYYY-MM-DD"`
    pub date: NaiveDate,
}

/// One hourly slot in an availability response
#[derive(Debug, Serialize)]
pub struct SlotAvailability {
    /// Slot hour; covers `[slot:00, slot+1:00)`
    pub slot: u8,

    /// Hourly rate in rupiah, absent when no pricing rule covers the slot
    pub rate: Option<i64>,

    /// Whether an existing booking blocks the slot
    pub taken: bool,

    /// Bookable: court active, priced, and not taken
    pub available: bool,
}

/// Availability response
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Court ID (ObjectId hex)
    pub court_id: String,

    /// Date checked
    pub date: NaiveDate,

    /// Per-slot availability over the court's opening hours
    pub slots: Vec<SlotAvailability>,
}

/// Validates an open/close time pair
fn validate_times(open_time: &str, close_time: &str) -> Result<(), ApiError> {
    let open = minutes_from_midnight(open_time)
        .ok_or_else(|| ApiError::validation("open_time", "Expected HH:MM"))?;
    let close = minutes_from_midnight(close_time)
        .ok_or_else(|| ApiError::validation("close_time", "Expected HH:MM"))?;

    if close <= open {
        return Err(ApiError::validation(
            "close_time",
            "Must be after open_time",
        ));
    }
    Ok(())
}

/// Active courts (public listing)
pub async fn list_courts(State(state): State<AppState>) -> ApiResult<Json<Vec<CourtResponse>>> {
    let courts = Court::list(&state.db, false).await?;
    Ok(Json(courts.into_iter().map(Into::into).collect()))
}

/// All courts, including deactivated (admin listing)
pub async fn list_all_courts(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CourtResponse>>> {
    let courts = Court::list(&state.db, true).await?;
    Ok(Json(courts.into_iter().map(Into::into).collect()))
}

/// Court detail
pub async fn get_court(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CourtResponse>> {
    let id = parse_object_id(&id, "court")?;
    let court = Court::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Court not found".to_string()))?;

    Ok(Json(court.into()))
}

/// Per-slot availability for one date
///
/// Combines the court's opening hours, its pricing rules, and existing
/// bookings into one view the booking UI can render directly.
pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let id = parse_object_id(&id, "court")?;
    let court = Court::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Court not found".to_string()))?;

    let rules = PricingRule::list_for_court(&state.db, court.id).await?;
    let taken = Reservation::taken_slots(&state.db, court.id, query.date).await?;

    let slots = court
        .slot_hours()
        .into_iter()
        .map(|slot| {
            let rate = pricing::resolve_rate(&rules, query.date, slot);
            let is_taken = taken.contains(&slot);
            SlotAvailability {
                slot,
                rate,
                taken: is_taken,
                available: court.active && rate.is_some() && !is_taken,
            }
        })
        .collect();

    Ok(Json(AvailabilityResponse {
        court_id: court.id.to_hex(),
        date: query.date,
        slots,
    }))
}

/// Create a court (admin)
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Name already taken
pub async fn create_court(
    State(state): State<AppState>,
    Json(req): Json<CreateCourtRequest>,
) -> ApiResult<Json<CourtResponse>> {
    req.validate()?;
    validate_times(&req.open_time, &req.close_time)?;

    let court = Court::create(
        &state.db,
        CreateCourt {
            name: req.name,
            description: req.description,
            open_time: req.open_time,
            close_time: req.close_time,
            surface: req.surface,
        },
    )
    .await?;

    tracing::info!(court_id = %court.id, name = %court.name, "court created");

    Ok(Json(court.into()))
}

/// Update a court (admin)
///
/// Opening hours are validated against the resulting combination, so
/// patching just one of the two times cannot invert the window.
pub async fn update_court(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourtRequest>,
) -> ApiResult<Json<CourtResponse>> {
    req.validate()?;

    let id = parse_object_id(&id, "court")?;
    let existing = Court::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Court not found".to_string()))?;

    let effective_open = req.open_time.as_deref().unwrap_or(&existing.open_time);
    let effective_close = req.close_time.as_deref().unwrap_or(&existing.close_time);
    validate_times(effective_open, effective_close)?;

    let court = Court::update(
        &state.db,
        id,
        UpdateCourt {
            name: req.name,
            description: req.description,
            open_time: req.open_time,
            close_time: req.close_time,
            surface: req.surface,
            active: req.active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Court not found".to_string()))?;

    Ok(Json(court.into()))
}

/// Delete a court and its pricing rules (admin)
///
/// # Errors
///
/// - `409 Conflict`: The court has pending or paid bookings today or later
pub async fn delete_court(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_object_id(&id, "court")?;
    Court::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Court not found".to_string()))?;

    let today = Utc::now().date_naive();
    if Reservation::court_has_upcoming(&state.db, id, today).await? {
        return Err(ApiError::Conflict(
            "Court has upcoming reservations".to_string(),
        ));
    }

    let rules_removed = PricingRule::delete_for_court(&state.db, id).await?;
    Court::delete(&state.db, id).await?;

    tracing::info!(court_id = %id, rules_removed, "court deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
