/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Liveness endpoint
/// - `auth`: Registration, login, token refresh, own profile
/// - `courts`: Court browsing and admin CRUD
/// - `pricing_rules`: Pricing rule CRUD and slot quoting
/// - `reservations`: Booking flow
/// - `payments`: Tripay checkout, proxies, and callback
/// - `payment_methods`: Admin-managed payment channels
/// - `users`: Admin user management
/// - `dashboard`: Admin aggregates

pub mod auth;
pub mod courts;
pub mod dashboard;
pub mod health;
pub mod payment_methods;
pub mod payments;
pub mod pricing_rules;
pub mod reservations;
pub mod users;

use crate::error::ApiError;
use mongodb::bson::oid::ObjectId;

/// Parses a path-segment ObjectId, mapping failure to a 400
pub(crate) fn parse_object_id(id: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::BadRequest(format!("Invalid {} id", what)))
}
