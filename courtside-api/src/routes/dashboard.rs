/// Admin dashboard endpoint
///
/// `GET /v1/admin/dashboard/summary` - one aggregate snapshot for the
/// dashboard landing page: entity counts, reservation breakdown, revenue,
/// the monthly revenue series, and the busiest courts.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use courtside_shared::models::{
    court::Court,
    reservation::Reservation,
    user::User,
};
use serde::Serialize;

/// Reservation counts by status
#[derive(Debug, Default, Serialize)]
pub struct StatusBreakdown {
    pub pending: i64,
    pub paid: i64,
    pub canceled: i64,
    pub expired: i64,
}

/// One month of the revenue series
#[derive(Debug, Serialize)]
pub struct MonthlyRevenueRow {
    /// `"YYYY-MM"`
    pub month: String,

    /// Paid revenue in rupiah
    pub revenue: i64,

    /// Paid reservations
    pub count: i64,
}

/// One court of the busiest-courts ranking
#[derive(Debug, Serialize)]
pub struct BusyCourtRow {
    /// Court ID (ObjectId hex)
    pub court_id: String,

    /// Court name; deleted courts keep their bookings but lose the name
    pub name: Option<String>,

    /// Pending + paid reservations
    pub reservations: i64,

    /// Booked slot-hours
    pub hours: i64,
}

/// Dashboard summary response
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    /// Registered users
    pub users_total: u64,

    /// Courts, including deactivated
    pub courts_total: u64,

    /// All reservations ever
    pub reservations_total: u64,

    /// Reservations by status
    pub reservations_by_status: StatusBreakdown,

    /// All-time paid revenue in rupiah
    pub revenue_total: i64,

    /// Paid revenue per booking month, ascending
    pub monthly_revenue: Vec<MonthlyRevenueRow>,

    /// Courts ranked by bookings, busiest first
    pub busiest_courts: Vec<BusyCourtRow>,
}

/// Dashboard summary
pub async fn summary(State(state): State<AppState>) -> ApiResult<Json<DashboardSummary>> {
    let users_total = User::count(&state.db).await?;
    let courts_total = Court::count(&state.db).await?;
    let reservations_total = Reservation::count(&state.db).await?;

    let mut reservations_by_status = StatusBreakdown::default();
    for row in Reservation::count_by_status(&state.db).await? {
        match row.status.as_str() {
            "pending" => reservations_by_status.pending = row.count,
            "paid" => reservations_by_status.paid = row.count,
            "canceled" => reservations_by_status.canceled = row.count,
            "expired" => reservations_by_status.expired = row.count,
            other => tracing::warn!(status = other, "unknown reservation status in aggregation"),
        }
    }

    let revenue_total = Reservation::revenue_total(&state.db).await?;

    let monthly_revenue = Reservation::revenue_by_month(&state.db)
        .await?
        .into_iter()
        .map(|m| MonthlyRevenueRow {
            month: m.month,
            revenue: m.revenue,
            count: m.count,
        })
        .collect();

    let mut busiest_courts = Vec::new();
    for row in Reservation::busiest_courts(&state.db, 5).await? {
        let name = Court::find_by_id(&state.db, row.court_id)
            .await?
            .map(|c| c.name);
        busiest_courts.push(BusyCourtRow {
            court_id: row.court_id.to_hex(),
            name,
            reservations: row.count,
            hours: row.hours,
        });
    }

    Ok(Json(DashboardSummary {
        users_total,
        courts_total,
        reservations_total,
        reservations_by_status,
        revenue_total,
        monthly_revenue,
        busiest_courts,
    }))
}
