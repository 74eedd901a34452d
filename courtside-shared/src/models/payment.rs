/// Payment model and collection operations
///
/// One payment document per gateway transaction. `merchant_ref` is our
/// reference (unique index), `reference` is the gateway's. Status follows
/// Tripay's transaction states, lowercased.

use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Database,
};
use serde::{Deserialize, Serialize};

/// Collection name for payments
pub const COLLECTION: &str = "payments";

/// Gateway transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting customer payment
    Unpaid,

    /// Settled
    Paid,

    /// Rejected or errored at the gateway
    Failed,

    /// Payment window elapsed
    Expired,

    /// Refunded after settlement
    Refund,
}

impl PaymentStatus {
    /// Converts status to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Refund => "refund",
        }
    }

    /// Maps a Tripay status string (`"PAID"`, `"EXPIRED"`, ...) to a status
    pub fn from_gateway(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "UNPAID" => Some(PaymentStatus::Unpaid),
            "PAID" => Some(PaymentStatus::Paid),
            "FAILED" => Some(PaymentStatus::Failed),
            "EXPIRED" => Some(PaymentStatus::Expired),
            "REFUND" => Some(PaymentStatus::Refund),
            _ => None,
        }
    }
}

/// Payment document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Document id
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Our transaction reference, unique
    pub merchant_ref: String,

    /// Gateway transaction reference, set once the transaction is created
    pub reference: Option<String>,

    /// Reservation this payment covers
    pub reservation_id: ObjectId,

    /// Payment channel code (e.g. "QRIS", "BRIVA")
    pub channel: String,

    /// Reservation amount in rupiah
    pub amount: i64,

    /// Gateway fee charged to the customer, rupiah
    pub fee: i64,

    /// Transaction status
    pub status: PaymentStatus,

    /// Hosted checkout URL for the customer
    pub checkout_url: Option<String>,

    /// When the payment was created
    pub created_at: DateTime,

    /// When the payment was last updated
    pub updated_at: DateTime,
}

/// Input for creating a payment
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub merchant_ref: String,
    pub reference: Option<String>,
    pub reservation_id: ObjectId,
    pub channel: String,
    pub amount: i64,
    pub fee: i64,
    pub checkout_url: Option<String>,
}

impl Payment {
    fn collection(db: &Database) -> mongodb::Collection<Payment> {
        db.collection::<Payment>(COLLECTION)
    }

    /// Creates a new unpaid payment
    pub async fn create(db: &Database, data: CreatePayment) -> mongodb::error::Result<Payment> {
        let now = DateTime::now();
        let payment = Payment {
            id: ObjectId::new(),
            merchant_ref: data.merchant_ref,
            reference: data.reference,
            reservation_id: data.reservation_id,
            channel: data.channel,
            amount: data.amount,
            fee: data.fee,
            status: PaymentStatus::Unpaid,
            checkout_url: data.checkout_url,
            created_at: now,
            updated_at: now,
        };

        Self::collection(db).insert_one(&payment, None).await?;
        Ok(payment)
    }

    /// Finds a payment by our merchant reference
    pub async fn find_by_merchant_ref(
        db: &Database,
        merchant_ref: &str,
    ) -> mongodb::error::Result<Option<Payment>> {
        Self::collection(db)
            .find_one(doc! { "merchant_ref": merchant_ref }, None)
            .await
    }

    /// Applies a gateway status update and returns the updated document
    pub async fn apply_gateway_status(
        db: &Database,
        merchant_ref: &str,
        reference: &str,
        status: PaymentStatus,
    ) -> mongodb::error::Result<Option<Payment>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Self::collection(db)
            .find_one_and_update(
                doc! { "merchant_ref": merchant_ref },
                doc! { "$set": {
                    "reference": reference,
                    "status": status.as_str(),
                    "updated_at": DateTime::now(),
                } },
                options,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_status_mapping() {
        assert_eq!(PaymentStatus::from_gateway("PAID"), Some(PaymentStatus::Paid));
        assert_eq!(PaymentStatus::from_gateway("paid"), Some(PaymentStatus::Paid));
        assert_eq!(
            PaymentStatus::from_gateway("EXPIRED"),
            Some(PaymentStatus::Expired)
        );
        assert_eq!(PaymentStatus::from_gateway("SETTLED"), None);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(PaymentStatus::Unpaid.as_str(), "unpaid");
        assert_eq!(PaymentStatus::Refund.as_str(), "refund");
    }
}
