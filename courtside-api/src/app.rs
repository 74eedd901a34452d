/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use courtside_api::{app::AppState, config::Config};
/// use courtside_shared::db;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let database = db::connect(&config.database.url, &config.database.name).await?;
/// let state = AppState::new(database, config);
/// let app = courtside_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, tripay::TripayClient};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use courtside_shared::auth::{jwt, middleware::AuthContext};
use mongodb::Database;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; all fields
/// are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database handle
    pub db: Database,

    /// Application configuration
    pub config: Arc<Config>,

    /// Payment gateway client
    pub tripay: TripayClient,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: Database, config: Config) -> Self {
        let tripay = TripayClient::new(&config.tripay);
        Self {
            db,
            config: Arc::new(config),
            tripay,
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router
///
/// # Route Map
///
/// ```text
/// /
/// ├── /health                          # Liveness (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register           # Signup (public)
///     │   ├── POST /login              # Signin (public)
///     │   ├── POST /refresh            # New access token (public)
///     │   └── GET|PUT /me              # Own profile (authenticated)
///     ├── /courts                      # Browse courts (public)
///     │   ├── GET /:id
///     │   ├── GET /:id/availability    # Per-slot price + taken flags
///     │   └── GET /:id/quote           # Price a slot set
///     ├── /reservations                # Booking (authenticated)
///     ├── /payments                    # Checkout (authenticated)
///     │   └── POST /callback           # Gateway callback (signed, public)
///     └── /admin/                      # Admin surface (admin role)
///         ├── /courts, /pricing-rules
///         ├── /reservations, /payment-methods, /users
///         └── /dashboard/summary
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth: public endpoints plus the authenticated profile pair
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .merge(
            Router::new()
                .route(
                    "/me",
                    get(routes::auth::me).put(routes::auth::update_me),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_layer,
                )),
        );

    // Court browsing (public: list, detail, availability, quotes)
    let court_routes = Router::new()
        .route("/courts", get(routes::courts::list_courts))
        .route("/courts/:id", get(routes::courts::get_court))
        .route("/courts/:id/availability", get(routes::courts::availability))
        .route("/courts/:id/quote", get(routes::pricing_rules::quote_slots));

    // Reservations (authenticated)
    let reservation_routes = Router::new()
        .route(
            "/reservations",
            post(routes::reservations::create_reservation)
                .get(routes::reservations::list_own_reservations),
        )
        .route("/reservations/:id", get(routes::reservations::get_reservation))
        .route(
            "/reservations/:id/cancel",
            post(routes::reservations::cancel_reservation),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Payments: authenticated checkout endpoints...
    let payment_routes = Router::new()
        .route("/payments", post(routes::payments::create_payment))
        .route("/payments/channels", get(routes::payments::payment_channels))
        .route("/payments/fee", get(routes::payments::calculate_fee))
        .route(
            "/payments/:merchant_ref",
            get(routes::payments::payment_status),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ))
        // ...plus the gateway callback, authenticated by its body signature
        .merge(Router::new().route(
            "/payments/callback",
            post(routes::payments::payment_callback),
        ));

    // Admin surface (JWT + admin role)
    let admin_routes = Router::new()
        .route("/courts", get(routes::courts::list_all_courts).post(routes::courts::create_court))
        .route(
            "/courts/:id",
            put(routes::courts::update_court).delete(routes::courts::delete_court),
        )
        .route(
            "/courts/:id/pricing-rules",
            get(routes::pricing_rules::list_rules).post(routes::pricing_rules::create_rule),
        )
        .route(
            "/pricing-rules/:id",
            put(routes::pricing_rules::update_rule).delete(routes::pricing_rules::delete_rule),
        )
        .route("/reservations", get(routes::reservations::list_all_reservations))
        .route(
            "/payment-methods",
            get(routes::payment_methods::list_payment_methods)
                .post(routes::payment_methods::create_payment_method),
        )
        .route(
            "/payment-methods/:id",
            put(routes::payment_methods::update_payment_method)
                .delete(routes::payment_methods::delete_payment_method),
        )
        .route("/users", get(routes::users::list_users))
        .route("/users/:id/role", put(routes::users::set_user_role))
        .route("/dashboard/summary", get(routes::dashboard::summary))
        .layer(axum::middleware::from_fn(admin_guard))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(court_routes)
        .merge(reservation_routes)
        .merge(payment_routes)
        .nest("/admin", admin_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware
///
/// Validates the bearer token and injects an [`AuthContext`] into request
/// extensions for handlers and the admin guard.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;
    let auth_context = AuthContext::from_claims(&claims)?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Admin-role guard, applied after [`jwt_auth_layer`]
async fn admin_guard(req: Request, next: Next) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized("Missing authentication".to_string()))?;

    auth.require_admin()?;

    Ok(next.run(req).await)
}
