/// User management endpoints (admin)
///
/// # Endpoints
///
/// - `GET /v1/admin/users` - Paginated user listing
/// - `PUT /v1/admin/users/:id/role` - Change a user's role

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{auth::UserResponse, parse_object_id},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use courtside_shared::{
    auth::middleware::AuthContext,
    models::user::{User, UserRole},
};
use serde::Deserialize;

/// Listing query
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Page number, 1-based
    pub page: Option<u64>,

    /// Page size (max 100)
    pub per_page: Option<i64>,
}

/// Role change request
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    /// New role: `customer` or `admin`
    pub role: String,
}

/// Paginated user listing, newest first
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let skip = (page - 1) * per_page as u64;

    let users = User::list(&state.db, skip, per_page).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Change a user's role
///
/// Admins cannot change their own role, so the last admin cannot lock
/// everyone out by accident.
pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    let role = UserRole::parse(&req.role)
        .ok_or_else(|| ApiError::validation("role", "Must be 'customer' or 'admin'"))?;

    let id = parse_object_id(&id, "user")?;
    if id == auth.user_id {
        return Err(ApiError::BadRequest(
            "Cannot change your own role".to_string(),
        ));
    }

    let user = User::set_role(&state.db, id, role)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %id, role = role.as_str(), "user role changed");

    Ok(Json(user.into()))
}
