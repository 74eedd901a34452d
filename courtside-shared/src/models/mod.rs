/// MongoDB document models
///
/// This module contains all persisted document types and their collection
/// operations. Every model follows the same layout: the stored struct, a
/// `CreateX` input struct (and an `UpdateX` patch struct where the API
/// updates it), and an `impl` block of async operations taking
/// `&mongodb::Database`.
///
/// # Models
///
/// - `user`: Accounts, credentials, and roles
/// - `court`: Futsal courts and their opening hours
/// - `pricing_rule`: Day/hour-ranged hourly rates per court
/// - `reservation`: Bookings with slot lists and lifecycle status
/// - `payment`: Payment-gateway transactions tied to reservations
/// - `payment_method`: Admin-managed payment channels

pub mod court;
pub mod payment;
pub mod payment_method;
pub mod pricing_rule;
pub mod reservation;
pub mod user;
