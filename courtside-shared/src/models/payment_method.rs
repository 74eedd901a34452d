/// Payment method model and collection operations
///
/// Admin-managed catalogue of payment channels offered at checkout. Codes
/// mirror the gateway's channel codes; disabling a method hides the channel
/// without touching gateway configuration. Fee fields let the admin surface
/// show expected fees without a gateway round trip.

use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Database,
};
use serde::{Deserialize, Serialize};

/// Collection name for payment methods
pub const COLLECTION: &str = "payment_methods";

/// Payment method document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Document id
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Gateway channel code (e.g. "QRIS", "BRIVA"), unique
    pub code: String,

    /// Display name
    pub name: String,

    /// Channel group (e.g. "Virtual Account", "E-Wallet")
    pub group: Option<String>,

    /// Flat fee component in rupiah
    pub fee_flat: i64,

    /// Percentage fee component (e.g. 0.7 for 0.7%)
    pub fee_percent: f64,

    /// Whether the method is offered at checkout
    pub enabled: bool,

    /// When the method was created
    pub created_at: DateTime,

    /// When the method was last updated
    pub updated_at: DateTime,
}

/// Input for creating a payment method
#[derive(Debug, Clone)]
pub struct CreatePaymentMethod {
    pub code: String,
    pub name: String,
    pub group: Option<String>,
    pub fee_flat: i64,
    pub fee_percent: f64,
}

/// Payment method patch; only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdatePaymentMethod {
    pub name: Option<String>,
    pub group: Option<String>,
    pub fee_flat: Option<i64>,
    pub fee_percent: Option<f64>,
    pub enabled: Option<bool>,
}

impl PaymentMethod {
    fn collection(db: &Database) -> mongodb::Collection<PaymentMethod> {
        db.collection::<PaymentMethod>(COLLECTION)
    }

    /// Estimated customer fee for `amount` rupiah through this method
    pub fn fee_for(&self, amount: i64) -> i64 {
        self.fee_flat + ((amount as f64) * self.fee_percent / 100.0).round() as i64
    }

    /// Creates a new payment method (enabled by default)
    ///
    /// # Errors
    ///
    /// Surfaces a duplicate-key error if the code is taken.
    pub async fn create(
        db: &Database,
        data: CreatePaymentMethod,
    ) -> mongodb::error::Result<PaymentMethod> {
        let now = DateTime::now();
        let method = PaymentMethod {
            id: ObjectId::new(),
            code: data.code.to_ascii_uppercase(),
            name: data.name,
            group: data.group,
            fee_flat: data.fee_flat,
            fee_percent: data.fee_percent,
            enabled: true,
            created_at: now,
            updated_at: now,
        };

        Self::collection(db).insert_one(&method, None).await?;
        Ok(method)
    }

    /// Finds a method by id
    pub async fn find_by_id(
        db: &Database,
        id: ObjectId,
    ) -> mongodb::error::Result<Option<PaymentMethod>> {
        Self::collection(db).find_one(doc! { "_id": id }, None).await
    }

    /// Finds a method by channel code
    pub async fn find_by_code(
        db: &Database,
        code: &str,
    ) -> mongodb::error::Result<Option<PaymentMethod>> {
        Self::collection(db)
            .find_one(doc! { "code": code.to_ascii_uppercase() }, None)
            .await
    }

    /// Lists methods by code; `enabled_only` hides disabled ones
    pub async fn list(
        db: &Database,
        enabled_only: bool,
    ) -> mongodb::error::Result<Vec<PaymentMethod>> {
        let filter: Option<Document> = if enabled_only {
            Some(doc! { "enabled": true })
        } else {
            None
        };
        let options = FindOptions::builder().sort(doc! { "code": 1 }).build();

        let mut cursor = Self::collection(db).find(filter, options).await?;
        let mut methods = Vec::new();
        while let Some(m) = cursor.try_next().await? {
            methods.push(m);
        }
        Ok(methods)
    }

    /// Channel codes currently enabled
    pub async fn enabled_codes(db: &Database) -> mongodb::error::Result<Vec<String>> {
        Ok(Self::list(db, true)
            .await?
            .into_iter()
            .map(|m| m.code)
            .collect())
    }

    /// Applies a patch and returns the updated document
    pub async fn update(
        db: &Database,
        id: ObjectId,
        patch: UpdatePaymentMethod,
    ) -> mongodb::error::Result<Option<PaymentMethod>> {
        let mut set = doc! { "updated_at": DateTime::now() };
        if let Some(name) = patch.name {
            set.insert("name", name);
        }
        if let Some(group) = patch.group {
            set.insert("group", group);
        }
        if let Some(fee_flat) = patch.fee_flat {
            set.insert("fee_flat", fee_flat);
        }
        if let Some(fee_percent) = patch.fee_percent {
            set.insert("fee_percent", fee_percent);
        }
        if let Some(enabled) = patch.enabled {
            set.insert("enabled", enabled);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Self::collection(db)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await
    }

    /// Deletes a method; returns whether a document was removed
    pub async fn delete(db: &Database, id: ObjectId) -> mongodb::error::Result<bool> {
        let result = Self::collection(db).delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(fee_flat: i64, fee_percent: f64) -> PaymentMethod {
        let now = DateTime::now();
        PaymentMethod {
            id: ObjectId::new(),
            code: "QRIS".to_string(),
            name: "QRIS".to_string(),
            group: None,
            fee_flat,
            fee_percent,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_fee_flat_only() {
        assert_eq!(method(4000, 0.0).fee_for(150_000), 4000);
    }

    #[test]
    fn test_fee_percent_rounds() {
        // 0.7% of 150_000 = 1050
        assert_eq!(method(0, 0.7).fee_for(150_000), 1050);
        // 0.7% of 100_001 = 700.007 -> 700
        assert_eq!(method(0, 0.7).fee_for(100_001), 700);
    }

    #[test]
    fn test_fee_combined() {
        assert_eq!(method(750, 0.7).fee_for(200_000), 750 + 1400);
    }
}
