/// Reservation model, conflict queries, and dashboard aggregations
///
/// A reservation books a set of hourly slots on one court for one date.
/// Slot `h` covers `[h:00, h+1:00)`. The slot list is stored sorted and
/// deduplicated. Dates are stored as `"YYYY-MM-DD"` strings, which keeps
/// equality filters and month grouping trivial.
///
/// # Lifecycle
///
/// ```text
/// pending --(gateway PAID)--------> paid
/// pending --(gateway EXPIRED)-----> expired
/// pending --(cancel / FAILED)-----> canceled
/// ```
///
/// Only `pending` and `paid` reservations block slots for other bookings.

use chrono::NaiveDate;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, DateTime, Document},
    options::FindOptions,
    Database,
};
use serde::{Deserialize, Serialize};

/// Collection name for reservations
pub const COLLECTION: &str = "reservations";

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Created, awaiting payment
    Pending,

    /// Paid via the payment gateway
    Paid,

    /// Canceled by the customer, an admin, or a failed payment
    Canceled,

    /// Payment window elapsed
    Expired,
}

impl ReservationStatus {
    /// Converts status to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Paid => "paid",
            ReservationStatus::Canceled => "canceled",
            ReservationStatus::Expired => "expired",
        }
    }

    /// Parses a status from its stored string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReservationStatus::Pending),
            "paid" => Some(ReservationStatus::Paid),
            "canceled" => Some(ReservationStatus::Canceled),
            "expired" => Some(ReservationStatus::Expired),
            _ => None,
        }
    }
}

/// Reservation document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Document id
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Booking user
    pub user_id: ObjectId,

    /// Booked court
    pub court_id: ObjectId,

    /// Booking date (`"YYYY-MM-DD"`)
    pub date: NaiveDate,

    /// Booked slot hours, sorted and deduplicated
    pub slots: Vec<u8>,

    /// Lifecycle status
    pub status: ReservationStatus,

    /// Total amount in rupiah, from the pricing engine
    pub total_amount: i64,

    /// Merchant reference of the payment covering this reservation
    pub payment_ref: Option<String>,

    /// When the reservation was created
    pub created_at: DateTime,

    /// When the reservation was last updated
    pub updated_at: DateTime,
}

/// Input for creating a reservation
#[derive(Debug, Clone)]
pub struct CreateReservation {
    pub user_id: ObjectId,
    pub court_id: ObjectId,
    pub date: NaiveDate,
    /// Must already be sorted and deduplicated
    pub slots: Vec<u8>,
    pub total_amount: i64,
}

/// Filters for the admin reservation listing
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub court_id: Option<ObjectId>,
    pub date: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
}

/// One row of the per-status reservation counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    /// Status string (group key)
    #[serde(rename = "_id")]
    pub status: String,

    /// Reservations in that status
    pub count: i64,
}

/// One row of the monthly revenue series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    /// `"YYYY-MM"` month (group key)
    #[serde(rename = "_id")]
    pub month: String,

    /// Paid revenue in rupiah
    pub revenue: i64,

    /// Paid reservations in that month
    pub count: i64,
}

/// One row of the busiest-courts ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtBookingCount {
    /// Court id (group key)
    #[serde(rename = "_id")]
    pub court_id: ObjectId,

    /// Pending + paid reservations for that court
    pub count: i64,

    /// Booked slot-hours for that court
    pub hours: i64,
}

fn slots_to_bson(slots: &[u8]) -> Vec<i32> {
    slots.iter().map(|s| *s as i32).collect()
}

impl Reservation {
    fn collection(db: &Database) -> mongodb::Collection<Reservation> {
        db.collection::<Reservation>(COLLECTION)
    }

    /// Creates a new pending reservation
    pub async fn create(
        db: &Database,
        data: CreateReservation,
    ) -> mongodb::error::Result<Reservation> {
        let now = DateTime::now();
        let reservation = Reservation {
            id: ObjectId::new(),
            user_id: data.user_id,
            court_id: data.court_id,
            date: data.date,
            slots: data.slots,
            status: ReservationStatus::Pending,
            total_amount: data.total_amount,
            payment_ref: None,
            created_at: now,
            updated_at: now,
        };

        Self::collection(db).insert_one(&reservation, None).await?;
        Ok(reservation)
    }

    /// Finds a reservation by id
    pub async fn find_by_id(
        db: &Database,
        id: ObjectId,
    ) -> mongodb::error::Result<Option<Reservation>> {
        Self::collection(db).find_one(doc! { "_id": id }, None).await
    }

    /// Lists a user's reservations, newest first
    pub async fn list_for_user(
        db: &Database,
        user_id: ObjectId,
    ) -> mongodb::error::Result<Vec<Reservation>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let mut cursor = Self::collection(db)
            .find(doc! { "user_id": user_id }, options)
            .await?;
        let mut reservations = Vec::new();
        while let Some(r) = cursor.try_next().await? {
            reservations.push(r);
        }
        Ok(reservations)
    }

    /// Lists reservations matching `filter`, newest first (admin view)
    pub async fn list(
        db: &Database,
        filter: ReservationFilter,
        skip: u64,
        limit: i64,
    ) -> mongodb::error::Result<Vec<Reservation>> {
        let mut query = Document::new();
        if let Some(court_id) = filter.court_id {
            query.insert("court_id", court_id);
        }
        if let Some(date) = filter.date {
            query.insert("date", date.to_string());
        }
        if let Some(status) = filter.status {
            query.insert("status", status.as_str());
        }

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit)
            .build();

        let mut cursor = Self::collection(db).find(query, options).await?;
        let mut reservations = Vec::new();
        while let Some(r) = cursor.try_next().await? {
            reservations.push(r);
        }
        Ok(reservations)
    }

    /// Slot hours already blocked on `court_id`/`date`
    ///
    /// Pending and paid reservations block slots; canceled and expired ones
    /// do not.
    pub async fn taken_slots(
        db: &Database,
        court_id: ObjectId,
        date: NaiveDate,
    ) -> mongodb::error::Result<Vec<u8>> {
        let filter = doc! {
            "court_id": court_id,
            "date": date.to_string(),
            "status": { "$in": ["pending", "paid"] },
        };

        let mut cursor = Self::collection(db).find(filter, None).await?;
        let mut taken = Vec::new();
        while let Some(r) = cursor.try_next().await? {
            taken.extend(r.slots);
        }
        taken.sort_unstable();
        taken.dedup();
        Ok(taken)
    }

    /// Of `slots`, the ones already blocked on `court_id`/`date`
    pub async fn conflicting_slots(
        db: &Database,
        court_id: ObjectId,
        date: NaiveDate,
        slots: &[u8],
    ) -> mongodb::error::Result<Vec<u8>> {
        let filter = doc! {
            "court_id": court_id,
            "date": date.to_string(),
            "status": { "$in": ["pending", "paid"] },
            "slots": { "$in": slots_to_bson(slots) },
        };

        let mut cursor = Self::collection(db).find(filter, None).await?;
        let mut conflicts = Vec::new();
        while let Some(r) = cursor.try_next().await? {
            conflicts.extend(r.slots.into_iter().filter(|s| slots.contains(s)));
        }
        conflicts.sort_unstable();
        conflicts.dedup();
        Ok(conflicts)
    }

    /// Whether a court has any future (or same-day) slot-blocking bookings
    pub async fn court_has_upcoming(
        db: &Database,
        court_id: ObjectId,
        today: NaiveDate,
    ) -> mongodb::error::Result<bool> {
        let filter = doc! {
            "court_id": court_id,
            "date": { "$gte": today.to_string() },
            "status": { "$in": ["pending", "paid"] },
        };

        let count = Self::collection(db)
            .count_documents(filter, None)
            .await?;
        Ok(count > 0)
    }

    /// Moves a reservation to `status`
    pub async fn update_status(
        db: &Database,
        id: ObjectId,
        status: ReservationStatus,
    ) -> mongodb::error::Result<()> {
        Self::collection(db)
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str(), "updated_at": DateTime::now() } },
                None,
            )
            .await?;
        Ok(())
    }

    /// Links the reservation to the payment covering it
    pub async fn set_payment_ref(
        db: &Database,
        id: ObjectId,
        merchant_ref: &str,
    ) -> mongodb::error::Result<()> {
        Self::collection(db)
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "payment_ref": merchant_ref, "updated_at": DateTime::now() } },
                None,
            )
            .await?;
        Ok(())
    }

    /// Counts all reservations
    pub async fn count(db: &Database) -> mongodb::error::Result<u64> {
        Self::collection(db).count_documents(None, None).await
    }

    /// Reservation counts grouped by status
    pub async fn count_by_status(db: &Database) -> mongodb::error::Result<Vec<StatusCount>> {
        let pipeline = vec![doc! {
            "$group": { "_id": "$status", "count": { "$sum": 1 } }
        }];

        let mut cursor = Self::collection(db).aggregate(pipeline, None).await?;
        let mut counts = Vec::new();
        while let Some(row) = cursor.try_next().await? {
            counts.push(bson::from_document(row)?);
        }
        Ok(counts)
    }

    /// Total paid revenue in rupiah
    pub async fn revenue_total(db: &Database) -> mongodb::error::Result<i64> {
        let pipeline = vec![
            doc! { "$match": { "status": "paid" } },
            doc! { "$group": { "_id": null, "revenue": { "$sum": "$total_amount" } } },
        ];

        #[derive(Deserialize)]
        struct Row {
            revenue: i64,
        }

        let mut cursor = Self::collection(db).aggregate(pipeline, None).await?;
        if let Some(row) = cursor.try_next().await? {
            let row: Row = bson::from_document(row)?;
            return Ok(row.revenue);
        }
        Ok(0)
    }

    /// Paid revenue grouped by booking month, ascending
    ///
    /// Dates are `"YYYY-MM-DD"` strings, so the month key is a substring.
    pub async fn revenue_by_month(db: &Database) -> mongodb::error::Result<Vec<MonthlyRevenue>> {
        let pipeline = vec![
            doc! { "$match": { "status": "paid" } },
            doc! { "$group": {
                "_id": { "$substrBytes": ["$date", 0, 7] },
                "revenue": { "$sum": "$total_amount" },
                "count": { "$sum": 1 },
            } },
            doc! { "$sort": { "_id": 1 } },
        ];

        let mut cursor = Self::collection(db).aggregate(pipeline, None).await?;
        let mut months = Vec::new();
        while let Some(row) = cursor.try_next().await? {
            months.push(bson::from_document(row)?);
        }
        Ok(months)
    }

    /// Courts ranked by slot-blocking bookings, busiest first
    pub async fn busiest_courts(
        db: &Database,
        limit: i64,
    ) -> mongodb::error::Result<Vec<CourtBookingCount>> {
        let pipeline = vec![
            doc! { "$match": { "status": { "$in": ["pending", "paid"] } } },
            doc! { "$group": {
                "_id": "$court_id",
                "count": { "$sum": 1 },
                "hours": { "$sum": { "$size": "$slots" } },
            } },
            doc! { "$sort": { "count": -1 } },
            doc! { "$limit": limit },
        ];

        let mut cursor = Self::collection(db).aggregate(pipeline, None).await?;
        let mut courts = Vec::new();
        while let Some(row) = cursor.try_next().await? {
            courts.push(bson::from_document(row)?);
        }
        Ok(courts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Paid,
            ReservationStatus::Canceled,
            ReservationStatus::Expired,
        ] {
            assert_eq!(ReservationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReservationStatus::parse("held"), None);
    }

    #[test]
    fn test_date_serializes_as_plain_string() {
        // Month grouping relies on the "YYYY-MM-DD" string form.
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(date.to_string(), "2024-03-09");
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-03-09\"");
    }
}
