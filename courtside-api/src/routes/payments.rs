/// Payment endpoints
///
/// Tripay checkout plus the gateway proxies and the signed status callback.
///
/// # Endpoints
///
/// - `GET  /v1/payments/channels` - Gateway channel list, filtered by
///   locally enabled payment methods
/// - `GET  /v1/payments/fee?amount=&code=` - Gateway fee calculator proxy
/// - `POST /v1/payments` - Create a transaction for a pending reservation
/// - `GET  /v1/payments/:merchant_ref` - Payment status
/// - `POST /v1/payments/callback` - Gateway status callback (HMAC-signed)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::parse_object_id,
    tripay::{CallbackPayload, CreateTransaction, OrderItem},
};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use courtside_shared::{
    auth::middleware::AuthContext,
    models::{
        court::Court,
        payment::{CreatePayment, Payment, PaymentStatus},
        payment_method::PaymentMethod,
        reservation::{Reservation, ReservationStatus},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

/// Payment window for new transactions
const PAYMENT_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Payment representation returned by the API
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Our transaction reference
    pub merchant_ref: String,

    /// Gateway transaction reference
    pub reference: Option<String>,

    /// Reservation covered (ObjectId hex)
    pub reservation_id: String,

    /// Payment channel code
    pub channel: String,

    /// Reservation amount in rupiah
    pub amount: i64,

    /// Gateway fee in rupiah
    pub fee: i64,

    /// Transaction status
    pub status: PaymentStatus,

    /// Hosted checkout URL
    pub checkout_url: Option<String>,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            merchant_ref: p.merchant_ref,
            reference: p.reference,
            reservation_id: p.reservation_id.to_hex(),
            channel: p.channel,
            amount: p.amount,
            fee: p.fee,
            status: p.status,
            checkout_url: p.checkout_url,
            created_at: p.created_at.to_chrono(),
        }
    }
}

/// Create payment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    /// Reservation to pay for (ObjectId hex)
    pub reservation_id: String,

    /// Payment channel code (e.g. "QRIS", "BRIVA")
    #[validate(length(min = 1, max = 20, message = "Method must be 1-20 characters"))]
    pub method: String,
}

/// Fee calculator query
#[derive(Debug, Deserialize)]
pub struct FeeQuery {
    /// Amount in rupiah
    pub amount: i64,

    /// Optional channel code to narrow the calculation
    pub code: Option<String>,
}

/// Gateway channel list, filtered by locally enabled payment methods
///
/// When the admin has configured payment methods, only channels whose code
/// is enabled locally are returned; with none configured, the gateway list
/// passes through unfiltered.
pub async fn payment_channels(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let mut channels = state.tripay.payment_channels().await?;

    let configured = PaymentMethod::list(&state.db, false).await?;
    if !configured.is_empty() {
        let enabled: Vec<String> = configured
            .into_iter()
            .filter(|m| m.enabled)
            .map(|m| m.code)
            .collect();

        if let Value::Array(items) = &mut channels {
            items.retain(|item| {
                item.get("code")
                    .and_then(Value::as_str)
                    .map(|code| enabled.iter().any(|e| e.eq_ignore_ascii_case(code)))
                    .unwrap_or(false)
            });
        }
    }

    Ok(Json(channels))
}

/// Gateway fee calculator proxy
pub async fn calculate_fee(
    State(state): State<AppState>,
    Query(query): Query<FeeQuery>,
) -> ApiResult<Json<Value>> {
    if query.amount <= 0 {
        return Err(ApiError::validation("amount", "Must be positive"));
    }

    let fees = state
        .tripay
        .calculate_fee(query.amount, query.code.as_deref())
        .await?;

    Ok(Json(fees))
}

/// Create a gateway transaction for a pending reservation
///
/// # Errors
///
/// - `409 Conflict`: Reservation is not awaiting payment
/// - `400 Bad Request`: Channel not offered
/// - `502 Bad Gateway`: Gateway rejected or unreachable
pub async fn create_payment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreatePaymentRequest>,
) -> ApiResult<Json<PaymentResponse>> {
    req.validate()?;

    let reservation_id = parse_object_id(&req.reservation_id, "reservation")?;
    let reservation = Reservation::find_by_id(&state.db, reservation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reservation not found".to_string()))?;

    if reservation.user_id != auth.user_id && !auth.is_admin() {
        return Err(ApiError::Forbidden("Not your reservation".to_string()));
    }

    if reservation.status != ReservationStatus::Pending {
        return Err(ApiError::Conflict(
            "Reservation is not awaiting payment".to_string(),
        ));
    }

    let method = req.method.to_ascii_uppercase();

    // With payment methods configured, the channel must be enabled locally.
    let configured = PaymentMethod::list(&state.db, false).await?;
    if !configured.is_empty()
        && !configured
            .iter()
            .any(|m| m.enabled && m.code.eq_ignore_ascii_case(&method))
    {
        return Err(ApiError::BadRequest(format!(
            "Payment method '{}' is not offered",
            method
        )));
    }

    let customer = User::find_by_id(&state.db, reservation.user_id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Reservation owner missing".to_string()))?;

    let court_name = Court::find_by_id(&state.db, reservation.court_id)
        .await?
        .map(|c| c.name)
        .unwrap_or_else(|| "Court".to_string());

    let merchant_ref = format!("CSD-{}", Uuid::new_v4().simple());
    let signature = state
        .tripay
        .transaction_signature(&merchant_ref, reservation.total_amount);

    let transaction = CreateTransaction {
        method: method.clone(),
        merchant_ref: merchant_ref.clone(),
        amount: reservation.total_amount,
        customer_name: customer.name.clone(),
        customer_email: customer.email.clone(),
        customer_phone: customer.phone.clone(),
        order_items: vec![OrderItem {
            sku: reservation.id.to_hex(),
            name: format!(
                "{} on {} ({} slot(s))",
                court_name,
                reservation.date,
                reservation.slots.len()
            ),
            price: reservation.total_amount,
            quantity: 1,
        }],
        expired_time: Utc::now().timestamp() + PAYMENT_WINDOW_SECS,
        signature,
    };

    let created = state.tripay.create_transaction(&transaction).await?;

    let payment = Payment::create(
        &state.db,
        CreatePayment {
            merchant_ref: merchant_ref.clone(),
            reference: Some(created.reference),
            reservation_id: reservation.id,
            channel: method,
            amount: reservation.total_amount,
            fee: created.total_fee.unwrap_or(0),
            checkout_url: created.checkout_url,
        },
    )
    .await?;

    Reservation::set_payment_ref(&state.db, reservation.id, &merchant_ref).await?;

    tracing::info!(
        merchant_ref = %payment.merchant_ref,
        reservation_id = %reservation.id,
        amount = payment.amount,
        "payment created"
    );

    Ok(Json(payment.into()))
}

/// Payment status by merchant reference (owner or admin)
pub async fn payment_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(merchant_ref): Path<String>,
) -> ApiResult<Json<PaymentResponse>> {
    let payment = Payment::find_by_merchant_ref(&state.db, &merchant_ref)
        .await?
        .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))?;

    if !auth.is_admin() {
        let reservation = Reservation::find_by_id(&state.db, payment.reservation_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Reservation not found".to_string()))?;
        if reservation.user_id != auth.user_id {
            return Err(ApiError::Forbidden("Not your payment".to_string()));
        }
    }

    Ok(Json(payment.into()))
}

/// Gateway status callback
///
/// Authenticated by the `X-Callback-Signature` header: HMAC-SHA256 of the
/// raw body with the merchant private key. The raw body is verified before
/// any parsing. On a terminal status, the covered reservation moves with
/// the payment.
pub async fn payment_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<Json<Value>> {
    let event = headers
        .get("x-callback-event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if event != "payment_status" {
        return Err(ApiError::BadRequest(format!(
            "Unsupported callback event '{}'",
            event
        )));
    }

    let signature = headers
        .get("x-callback-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing callback signature".to_string()))?;

    if !state
        .tripay
        .verify_callback_signature(body.as_bytes(), signature)
    {
        return Err(ApiError::Unauthorized(
            "Invalid callback signature".to_string(),
        ));
    }

    let payload: CallbackPayload = serde_json::from_str(&body)
        .map_err(|_| ApiError::BadRequest("Malformed callback payload".to_string()))?;

    let status = PaymentStatus::from_gateway(&payload.status).ok_or_else(|| {
        ApiError::BadRequest(format!("Unknown payment status '{}'", payload.status))
    })?;

    let payment = Payment::apply_gateway_status(
        &state.db,
        &payload.merchant_ref,
        &payload.reference,
        status,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Unknown merchant reference".to_string()))?;

    // Terminal payment states move the reservation; UNPAID leaves it pending.
    let reservation_status = match status {
        PaymentStatus::Paid => Some(ReservationStatus::Paid),
        PaymentStatus::Expired => Some(ReservationStatus::Expired),
        PaymentStatus::Failed | PaymentStatus::Refund => Some(ReservationStatus::Canceled),
        PaymentStatus::Unpaid => None,
    };
    if let Some(new_status) = reservation_status {
        Reservation::update_status(&state.db, payment.reservation_id, new_status).await?;
    }

    tracing::info!(
        merchant_ref = %payload.merchant_ref,
        status = status.as_str(),
        "payment callback applied"
    );

    Ok(Json(json!({ "success": true })))
}
