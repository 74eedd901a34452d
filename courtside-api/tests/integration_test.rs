/// Integration tests for the Courtside API
///
/// Router-level tests (auth gating, validation, callback signatures) run
/// without any backing services. End-to-end flows that persist documents
/// are `#[ignore]`d and need MongoDB at `TEST_MONGODB_URL` (default
/// `mongodb://localhost:27017`):
///
/// ```bash
/// cargo test -p courtside-api -- --ignored
/// ```

mod common;

use axum::http::StatusCode;
use common::{empty_request, json_request, response_json, TestContext};
use courtside_shared::models::user::UserRole;
use hmac::{Hmac, Mac};
use mongodb::bson::oid::ObjectId;
use serde_json::json;
use sha2::Sha256;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request("GET", "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // Security headers ride on every response.
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );

    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let ctx = TestContext::new().await.unwrap();

    let request = json_request(
        "POST",
        "/v1/auth/register",
        None,
        json!({ "email": "not-an-email", "password": "abcdef12", "name": "Tester" }),
    );
    let response = ctx.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let ctx = TestContext::new().await.unwrap();

    // Long enough for the length validator, but no digits.
    let request = json_request(
        "POST",
        "/v1/auth/register",
        None,
        json!({ "email": "player@example.com", "password": "onlyletters", "name": "Tester" }),
    );
    let response = ctx.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["details"][0]["field"], "password");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request("GET", "/v1/reservations", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/v1/reservations",
            Some("Bearer not-a-real-token"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_authorization_is_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/v1/reservations",
            Some("Basic dXNlcjpwYXNz"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_routes_reject_customers() {
    let ctx = TestContext::new().await.unwrap();
    let customer = ctx.auth_header(ObjectId::new(), UserRole::Customer);

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/v1/admin/dashboard/summary",
            Some(&customer),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/admin/courts",
            Some(&customer),
            json!({ "name": "Court A", "open_time": "08:00", "close_time": "22:00" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_court_id_is_bad_request() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request("GET", "/v1/courts/not-an-object-id", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reservation_requires_slots() {
    let ctx = TestContext::new().await.unwrap();
    let customer = ctx.auth_header(ObjectId::new(), UserRole::Customer);

    let request = json_request(
        "POST",
        "/v1/reservations",
        Some(&customer),
        json!({
            "court_id": ObjectId::new().to_hex(),
            "date": "2030-01-05",
            "slots": [],
        }),
    );
    let response = ctx.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["details"][0]["field"], "slots");
}

#[tokio::test]
async fn test_callback_rejects_wrong_event() {
    let ctx = TestContext::new().await.unwrap();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/payments/callback")
        .header("content-type", "application/json")
        .header("x-callback-event", "open_payment")
        .header("x-callback-signature", "00")
        .body(axum::body::Body::from("{}"))
        .unwrap();
    let response = ctx.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_rejects_missing_or_bad_signature() {
    let ctx = TestContext::new().await.unwrap();

    // Missing signature header
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/payments/callback")
        .header("content-type", "application/json")
        .header("x-callback-event", "payment_status")
        .body(axum::body::Body::from(r#"{"status":"PAID"}"#))
        .unwrap();
    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Signature over a different body
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/payments/callback")
        .header("content-type", "application/json")
        .header("x-callback-event", "payment_status")
        .header("x-callback-signature", "deadbeef")
        .body(axum::body::Body::from(r#"{"status":"PAID"}"#))
        .unwrap();
    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Signs a callback body the way the gateway does
fn sign_callback(body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(common::TEST_TRIPAY_PRIVATE_KEY.as_bytes())
        .expect("HMAC accepts keys of any size");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_full_booking_flow() {
    let ctx = TestContext::new().await.unwrap();

    // First registration bootstraps the admin account.
    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/auth/register",
            None,
            json!({ "email": "owner@example.com", "password": "abcdef12", "name": "Owner" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["user"]["role"], "admin");
    let admin_token = format!("Bearer {}", body["access_token"].as_str().unwrap());

    // Admin creates a court and a flat all-week rule.
    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/admin/courts",
            Some(&admin_token),
            json!({ "name": "Court A", "open_time": "08:00", "close_time": "22:00" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let court = response_json(response).await;
    let court_id = court["id"].as_str().unwrap().to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/admin/courts/{}/pricing-rules", court_id),
            Some(&admin_token),
            json!({ "day_start": 0, "day_end": 6, "hour_start": 8, "hour_end": 22, "rate": 150000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A customer registers and books two evening slots.
    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/auth/register",
            None,
            json!({ "email": "player@example.com", "password": "abcdef12", "name": "Player" }),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["user"]["role"], "customer");
    let customer_token = format!("Bearer {}", body["access_token"].as_str().unwrap());

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/v1/courts/{}/quote?date=2030-01-05&slots=18,19", court_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let quote = response_json(response).await;
    assert_eq!(quote["total"], 300000);

    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/reservations",
            Some(&customer_token),
            json!({ "court_id": court_id, "date": "2030-01-05", "slots": [18, 19] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let reservation = response_json(response).await;
    assert_eq!(reservation["status"], "pending");
    assert_eq!(reservation["total_amount"], 300000);

    // The same slots cannot be booked twice.
    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/reservations",
            Some(&customer_token),
            json!({ "court_id": court_id, "date": "2030-01-05", "slots": [19, 20] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Availability reflects the booking.
    let response = ctx
        .app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/v1/courts/{}/availability?date=2030-01-05", court_id),
            None,
        ))
        .await
        .unwrap();
    let availability = response_json(response).await;
    let slots = availability["slots"].as_array().unwrap();
    let slot_18 = slots.iter().find(|s| s["slot"] == 18).unwrap();
    assert_eq!(slot_18["taken"], true);
    assert_eq!(slot_18["available"], false);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_paid_callback_moves_reservation() {
    use courtside_shared::models::{
        payment::{CreatePayment, Payment},
        reservation::{CreateReservation, Reservation, ReservationStatus},
    };

    let ctx = TestContext::new().await.unwrap();

    // Seed a pending reservation and its unpaid payment directly.
    let reservation = Reservation::create(
        &ctx.db,
        CreateReservation {
            user_id: ObjectId::new(),
            court_id: ObjectId::new(),
            date: chrono::NaiveDate::from_ymd_opt(2030, 1, 5).unwrap(),
            slots: vec![18, 19],
            total_amount: 300_000,
        },
    )
    .await
    .unwrap();

    Payment::create(
        &ctx.db,
        CreatePayment {
            merchant_ref: "CSD-TEST-1".to_string(),
            reference: None,
            reservation_id: reservation.id,
            channel: "QRIS".to_string(),
            amount: 300_000,
            fee: 750,
            checkout_url: None,
        },
    )
    .await
    .unwrap();

    let body = json!({
        "reference": "T0001REF1",
        "merchant_ref": "CSD-TEST-1",
        "status": "PAID",
        "total_amount": 300000,
    })
    .to_string();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/payments/callback")
        .header("content-type", "application/json")
        .header("x-callback-event", "payment_status")
        .header("x-callback-signature", sign_callback(&body))
        .body(axum::body::Body::from(body))
        .unwrap();
    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reservation = Reservation::find_by_id(&ctx.db, reservation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reservation.status, ReservationStatus::Paid);

    let payment = Payment::find_by_merchant_ref(&ctx.db, "CSD-TEST-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.reference.as_deref(), Some("T0001REF1"));

    ctx.cleanup().await.unwrap();
}
