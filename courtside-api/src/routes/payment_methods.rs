/// Payment method endpoints (admin)
///
/// CRUD over the locally managed payment channel catalogue.
///
/// # Endpoints
///
/// - `GET    /v1/admin/payment-methods`
/// - `POST   /v1/admin/payment-methods`
/// - `PUT    /v1/admin/payment-methods/:id`
/// - `DELETE /v1/admin/payment-methods/:id`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::parse_object_id,
};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use courtside_shared::models::payment_method::{
    CreatePaymentMethod, PaymentMethod, UpdatePaymentMethod,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payment method representation returned by the API
#[derive(Debug, Serialize)]
pub struct PaymentMethodResponse {
    /// Method ID (ObjectId hex)
    pub id: String,

    /// Gateway channel code
    pub code: String,

    /// Display name
    pub name: String,

    /// Channel group
    pub group: Option<String>,

    /// Flat fee component in rupiah
    pub fee_flat: i64,

    /// Percentage fee component
    pub fee_percent: f64,

    /// Whether the method is offered at checkout
    pub enabled: bool,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<PaymentMethod> for PaymentMethodResponse {
    fn from(m: PaymentMethod) -> Self {
        Self {
            id: m.id.to_hex(),
            code: m.code,
            name: m.name,
            group: m.group,
            fee_flat: m.fee_flat,
            fee_percent: m.fee_percent,
            enabled: m.enabled,
            created_at: m.created_at.to_chrono(),
        }
    }
}

/// Create payment method request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentMethodRequest {
    /// Gateway channel code (stored uppercased, unique)
    #[validate(length(min = 1, max = 20, message = "Code must be 1-20 characters"))]
    pub code: String,

    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Channel group
    #[validate(length(max = 50, message = "Group must be at most 50 characters"))]
    pub group: Option<String>,

    /// Flat fee component in rupiah
    #[validate(range(min = 0, message = "Flat fee cannot be negative"))]
    pub fee_flat: i64,

    /// Percentage fee component
    #[validate(range(min = 0.0, max = 100.0, message = "Percent fee must be 0-100"))]
    pub fee_percent: f64,
}

/// Update payment method request; all fields optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePaymentMethodRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 50, message = "Group must be at most 50 characters"))]
    pub group: Option<String>,

    #[validate(range(min = 0, message = "Flat fee cannot be negative"))]
    pub fee_flat: Option<i64>,

    #[validate(range(min = 0.0, max = 100.0, message = "Percent fee must be 0-100"))]
    pub fee_percent: Option<f64>,

    pub enabled: Option<bool>,
}

/// All payment methods, including disabled ones
pub async fn list_payment_methods(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PaymentMethodResponse>>> {
    let methods = PaymentMethod::list(&state.db, false).await?;
    Ok(Json(methods.into_iter().map(Into::into).collect()))
}

/// Create a payment method
///
/// # Errors
///
/// - `409 Conflict`: Code already configured
pub async fn create_payment_method(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentMethodRequest>,
) -> ApiResult<Json<PaymentMethodResponse>> {
    req.validate()?;

    let method = PaymentMethod::create(
        &state.db,
        CreatePaymentMethod {
            code: req.code,
            name: req.name,
            group: req.group,
            fee_flat: req.fee_flat,
            fee_percent: req.fee_percent,
        },
    )
    .await?;

    tracing::info!(code = %method.code, "payment method created");

    Ok(Json(method.into()))
}

/// Update a payment method
pub async fn update_payment_method(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePaymentMethodRequest>,
) -> ApiResult<Json<PaymentMethodResponse>> {
    req.validate()?;

    let id = parse_object_id(&id, "payment method")?;
    let method = PaymentMethod::update(
        &state.db,
        id,
        UpdatePaymentMethod {
            name: req.name,
            group: req.group,
            fee_flat: req.fee_flat,
            fee_percent: req.fee_percent,
            enabled: req.enabled,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Payment method not found".to_string()))?;

    Ok(Json(method.into()))
}

/// Delete a payment method
pub async fn delete_payment_method(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_object_id(&id, "payment method")?;
    let deleted = PaymentMethod::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Payment method not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
