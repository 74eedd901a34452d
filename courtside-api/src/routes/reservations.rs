/// Reservation endpoints
///
/// # Endpoints
///
/// - `POST /v1/reservations` - Book slots (priced by the rule engine)
/// - `GET  /v1/reservations` - Own reservations
/// - `GET  /v1/reservations/:id` - Reservation detail (owner or admin)
/// - `POST /v1/reservations/:id/cancel` - Cancel a pending reservation
/// - `GET  /v1/admin/reservations` - All reservations with filters

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::parse_object_id,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use courtside_shared::{
    auth::middleware::AuthContext,
    models::{
        court::Court,
        pricing_rule::PricingRule,
        reservation::{
            CreateReservation, Reservation, ReservationFilter, ReservationStatus,
        },
    },
    pricing,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Reservation representation returned by the API
#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    /// Reservation ID (ObjectId hex)
    pub id: String,

    /// Booking user (ObjectId hex)
    pub user_id: String,

    /// Booked court (ObjectId hex)
    pub court_id: String,

    /// Booking date
    pub date: NaiveDate,

    /// Booked slot hours
    pub slots: Vec<u8>,

    /// Lifecycle status
    pub status: ReservationStatus,

    /// Total amount in rupiah
    pub total_amount: i64,

    /// Merchant reference of the covering payment
    pub payment_ref: Option<String>,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id.to_hex(),
            user_id: r.user_id.to_hex(),
            court_id: r.court_id.to_hex(),
            date: r.date,
            slots: r.slots,
            status: r.status,
            total_amount: r.total_amount,
            payment_ref: r.payment_ref,
            created_at: r.created_at.to_chrono(),
        }
    }
}

/// Create reservation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationRequest {
    /// Court to book (ObjectId hex)
    pub court_id: String,

    /// Booking date, `"YYYY-MM-DD"`
    pub date: NaiveDate,

    /// Slot hours to book
    #[validate(length(min = 1, max = 12, message = "Book between 1 and 12 slots"))]
    pub slots: Vec<u8>,
}

/// Admin listing query
#[derive(Debug, Deserialize)]
pub struct ListReservationsQuery {
    /// Filter by court (ObjectId hex)
    pub court_id: Option<String>,

    /// Filter by date
    pub date: Option<NaiveDate>,

    /// Filter by status
    pub status: Option<String>,

    /// Page number, 1-based
    pub page: Option<u64>,

    /// Page size (max 100)
    pub per_page: Option<i64>,
}

/// Book slots on a court
///
/// Validates the slots against the court's opening hours and existing
/// bookings, then prices them with the rule engine. The reservation is
/// created `pending`; payment moves it on.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed, slots outside opening
///   hours, or slots no pricing rule covers
/// - `409 Conflict`: Slots already booked
pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateReservationRequest>,
) -> ApiResult<Json<ReservationResponse>> {
    req.validate()?;

    let court_id = parse_object_id(&req.court_id, "court")?;
    let court = Court::find_by_id(&state.db, court_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Court not found".to_string()))?;

    if !court.active {
        return Err(ApiError::BadRequest(
            "Court is not open for booking".to_string(),
        ));
    }

    let today = Utc::now().date_naive();
    if req.date < today {
        return Err(ApiError::validation("date", "Cannot book past dates"));
    }

    let slots = pricing::normalize_slots(&req.slots);

    let outside: Vec<u8> = slots
        .iter()
        .copied()
        .filter(|s| !court.contains_slot(*s))
        .collect();
    if !outside.is_empty() {
        return Err(ApiError::validation(
            "slots",
            format!(
                "Slots {:?} are outside opening hours {}-{}",
                outside, court.open_time, court.close_time
            ),
        ));
    }

    let conflicts =
        Reservation::conflicting_slots(&state.db, court.id, req.date, &slots).await?;
    if !conflicts.is_empty() {
        return Err(ApiError::Conflict(format!(
            "Slots {:?} are already booked",
            conflicts
        )));
    }

    let rules = PricingRule::list_for_court(&state.db, court.id).await?;
    let quote = pricing::quote(&rules, req.date, &slots)?;

    let reservation = Reservation::create(
        &state.db,
        CreateReservation {
            user_id: auth.user_id,
            court_id: court.id,
            date: req.date,
            slots,
            total_amount: quote.total,
        },
    )
    .await?;

    tracing::info!(
        reservation_id = %reservation.id,
        court_id = %court.id,
        total = reservation.total_amount,
        "reservation created"
    );

    Ok(Json(reservation.into()))
}

/// Own reservations, newest first
pub async fn list_own_reservations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ReservationResponse>>> {
    let reservations = Reservation::list_for_user(&state.db, auth.user_id).await?;
    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}

/// Reservation detail (owner or admin)
pub async fn get_reservation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReservationResponse>> {
    let id = parse_object_id(&id, "reservation")?;
    let reservation = Reservation::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reservation not found".to_string()))?;

    if reservation.user_id != auth.user_id && !auth.is_admin() {
        return Err(ApiError::Forbidden(
            "Not your reservation".to_string(),
        ));
    }

    Ok(Json(reservation.into()))
}

/// Cancel a pending reservation (owner or admin)
///
/// # Errors
///
/// - `409 Conflict`: Reservation is not pending
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReservationResponse>> {
    let id = parse_object_id(&id, "reservation")?;
    let mut reservation = Reservation::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reservation not found".to_string()))?;

    if reservation.user_id != auth.user_id && !auth.is_admin() {
        return Err(ApiError::Forbidden(
            "Not your reservation".to_string(),
        ));
    }

    if reservation.status != ReservationStatus::Pending {
        return Err(ApiError::Conflict(
            "Only pending reservations can be canceled".to_string(),
        ));
    }

    Reservation::update_status(&state.db, id, ReservationStatus::Canceled).await?;
    reservation.status = ReservationStatus::Canceled;

    tracing::info!(reservation_id = %id, "reservation canceled");

    Ok(Json(reservation.into()))
}

/// All reservations with optional filters (admin)
pub async fn list_all_reservations(
    State(state): State<AppState>,
    Query(query): Query<ListReservationsQuery>,
) -> ApiResult<Json<Vec<ReservationResponse>>> {
    let court_id = query
        .court_id
        .as_deref()
        .map(|id| parse_object_id(id, "court"))
        .transpose()?;

    let status = query
        .status
        .as_deref()
        .map(|s| {
            ReservationStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown status '{}'", s)))
        })
        .transpose()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let skip = (page - 1) * per_page as u64;

    let reservations = Reservation::list(
        &state.db,
        ReservationFilter {
            court_id,
            date: query.date,
            status,
        },
        skip,
        per_page,
    )
    .await?;

    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}
