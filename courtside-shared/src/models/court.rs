/// Court model and collection operations
///
/// A court carries its opening hours as `"HH:MM"` strings (the form the
/// booking UI submits). Bookable slots are whole hours: the first slot
/// starts at the first full hour at or after `open_time`, the last slot
/// ends at or before `close_time`. `"24:00"` is accepted as a close time
/// meaning end of day.
///
/// Court names are unique (enforced by the `courts.name` index).

use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Database,
};
use serde::{Deserialize, Serialize};

/// Collection name for courts
pub const COLLECTION: &str = "courts";

/// Parses an `"HH:MM"` time string into minutes from midnight
///
/// Accepts `00:00` through `24:00`; `24:00` must have zero minutes.
/// Returns `None` for anything else (wrong shape, out-of-range parts).
pub fn minutes_from_midnight(s: &str) -> Option<u16> {
    let (h, m) = s.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }

    let hour: u16 = h.parse().ok()?;
    let minute: u16 = m.parse().ok()?;
    if minute > 59 {
        return None;
    }
    match hour {
        0..=23 => Some(hour * 60 + minute),
        24 if minute == 0 => Some(24 * 60),
        _ => None,
    }
}

/// Court document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Court {
    /// Document id
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Court name, unique
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Opening time, `"HH:MM"`
    pub open_time: String,

    /// Closing time, `"HH:MM"` (after `open_time`; `"24:00"` allowed)
    pub close_time: String,

    /// Playing surface label (e.g. "vinyl", "synthetic grass")
    pub surface: Option<String>,

    /// Whether the court is currently bookable
    pub active: bool,

    /// When the court was created
    pub created_at: DateTime,

    /// When the court was last updated
    pub updated_at: DateTime,
}

/// Input for creating a court
#[derive(Debug, Clone)]
pub struct CreateCourt {
    pub name: String,
    pub description: Option<String>,
    pub open_time: String,
    pub close_time: String,
    pub surface: Option<String>,
}

/// Court patch; only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateCourt {
    pub name: Option<String>,
    pub description: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub surface: Option<String>,
    pub active: Option<bool>,
}

impl Court {
    fn collection(db: &Database) -> mongodb::Collection<Court> {
        db.collection::<Court>(COLLECTION)
    }

    /// Opening time in minutes from midnight
    ///
    /// Stored values are validated on the way in, so a parse failure here
    /// means the document was edited out-of-band; treat it as midnight.
    pub fn open_minutes(&self) -> u16 {
        minutes_from_midnight(&self.open_time).unwrap_or(0)
    }

    /// Closing time in minutes from midnight
    pub fn close_minutes(&self) -> u16 {
        minutes_from_midnight(&self.close_time).unwrap_or(24 * 60)
    }

    /// First bookable slot hour (first full hour at or after opening)
    pub fn first_slot(&self) -> u8 {
        (self.open_minutes().div_ceil(60)) as u8
    }

    /// One past the last bookable slot hour
    pub fn end_slot(&self) -> u8 {
        (self.close_minutes() / 60) as u8
    }

    /// All bookable slot hours for this court
    pub fn slot_hours(&self) -> Vec<u8> {
        (self.first_slot()..self.end_slot()).collect()
    }

    /// Whether slot `hour` lies fully within opening hours
    pub fn contains_slot(&self, hour: u8) -> bool {
        hour >= self.first_slot() && hour < self.end_slot()
    }

    /// Creates a new court
    ///
    /// # Errors
    ///
    /// Surfaces a duplicate-key error if the name is taken.
    pub async fn create(db: &Database, data: CreateCourt) -> mongodb::error::Result<Court> {
        let now = DateTime::now();
        let court = Court {
            id: ObjectId::new(),
            name: data.name,
            description: data.description,
            open_time: data.open_time,
            close_time: data.close_time,
            surface: data.surface,
            active: true,
            created_at: now,
            updated_at: now,
        };

        Self::collection(db).insert_one(&court, None).await?;
        Ok(court)
    }

    /// Finds a court by id
    pub async fn find_by_id(db: &Database, id: ObjectId) -> mongodb::error::Result<Option<Court>> {
        Self::collection(db).find_one(doc! { "_id": id }, None).await
    }

    /// Lists courts by name; `include_inactive` widens to deactivated ones
    pub async fn list(db: &Database, include_inactive: bool) -> mongodb::error::Result<Vec<Court>> {
        let filter: Option<Document> = if include_inactive {
            None
        } else {
            Some(doc! { "active": true })
        };
        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();

        let mut cursor = Self::collection(db).find(filter, options).await?;
        let mut courts = Vec::new();
        while let Some(court) = cursor.try_next().await? {
            courts.push(court);
        }
        Ok(courts)
    }

    /// Counts all courts
    pub async fn count(db: &Database) -> mongodb::error::Result<u64> {
        Self::collection(db).count_documents(None, None).await
    }

    /// Applies a patch and returns the updated document
    pub async fn update(
        db: &Database,
        id: ObjectId,
        patch: UpdateCourt,
    ) -> mongodb::error::Result<Option<Court>> {
        let mut set = doc! { "updated_at": DateTime::now() };
        if let Some(name) = patch.name {
            set.insert("name", name);
        }
        if let Some(description) = patch.description {
            set.insert("description", description);
        }
        if let Some(open_time) = patch.open_time {
            set.insert("open_time", open_time);
        }
        if let Some(close_time) = patch.close_time {
            set.insert("close_time", close_time);
        }
        if let Some(surface) = patch.surface {
            set.insert("surface", surface);
        }
        if let Some(active) = patch.active {
            set.insert("active", active);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Self::collection(db)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await
    }

    /// Deletes a court; returns whether a document was removed
    pub async fn delete(db: &Database, id: ObjectId) -> mongodb::error::Result<bool> {
        let result = Self::collection(db).delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn court(open: &str, close: &str) -> Court {
        let now = DateTime::now();
        Court {
            id: ObjectId::new(),
            name: "Court A".to_string(),
            description: None,
            open_time: open.to_string(),
            close_time: close.to_string(),
            surface: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_minutes_from_midnight() {
        assert_eq!(minutes_from_midnight("00:00"), Some(0));
        assert_eq!(minutes_from_midnight("08:30"), Some(510));
        assert_eq!(minutes_from_midnight("23:59"), Some(1439));
        assert_eq!(minutes_from_midnight("24:00"), Some(1440));

        assert_eq!(minutes_from_midnight("24:01"), None);
        assert_eq!(minutes_from_midnight("25:00"), None);
        assert_eq!(minutes_from_midnight("08:60"), None);
        assert_eq!(minutes_from_midnight("8:00"), None);
        assert_eq!(minutes_from_midnight("0800"), None);
        assert_eq!(minutes_from_midnight(""), None);
    }

    #[test]
    fn test_slot_hours_on_the_hour() {
        let c = court("08:00", "22:00");
        assert_eq!(c.first_slot(), 8);
        assert_eq!(c.end_slot(), 22);
        assert_eq!(c.slot_hours().len(), 14);
        assert!(c.contains_slot(8));
        assert!(c.contains_slot(21));
        assert!(!c.contains_slot(22));
        assert!(!c.contains_slot(7));
    }

    #[test]
    fn test_slot_hours_partial_hours() {
        // Opening 08:30 means the 08:00 slot is not fully open; first full
        // slot is 09:00. Closing 21:45 means the 21:00 slot would overrun.
        let c = court("08:30", "21:45");
        assert_eq!(c.first_slot(), 9);
        assert_eq!(c.end_slot(), 21);
        assert!(!c.contains_slot(8));
        assert!(c.contains_slot(20));
        assert!(!c.contains_slot(21));
    }

    #[test]
    fn test_midnight_close() {
        let c = court("10:00", "24:00");
        assert_eq!(c.end_slot(), 24);
        assert!(c.contains_slot(23));
    }
}
