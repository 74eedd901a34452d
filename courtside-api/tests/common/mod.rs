/// Shared helpers for integration tests
///
/// `TestContext` builds the full application router against a throwaway
/// database name. The MongoDB driver connects lazily, so tests that never
/// touch a collection run without a server; tests that do are marked
/// `#[ignore]` and expect MongoDB at `mongodb://localhost:27017` (override
/// with `TEST_MONGODB_URL`).

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use courtside_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig, TripayConfig},
};
use courtside_shared::{
    auth::jwt::{create_token, Claims, TokenType},
    db,
    models::user::UserRole,
};
use mongodb::bson::oid::ObjectId;

/// JWT secret shared by the test app and the token helpers
pub const TEST_JWT_SECRET: &str = "integration-test-secret-32-bytes-min";

/// Tripay private key the test app signs and verifies with
pub const TEST_TRIPAY_PRIVATE_KEY: &str = "integration-test-private-key";

/// Test application context
pub struct TestContext {
    /// The assembled router
    pub app: Router,

    /// Database handle (unique name per context)
    pub db: mongodb::Database,

    /// Configuration the app was built with
    pub config: Config,
}

impl TestContext {
    /// Builds the application against a uniquely named test database
    pub async fn new() -> anyhow::Result<Self> {
        let mongo_url = std::env::var("TEST_MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        // Unique database per context keeps tests independent.
        let db_name = format!("courtside_test_{}", ObjectId::new().to_hex());

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
                admin_email: None,
            },
            database: DatabaseConfig {
                url: mongo_url.clone(),
                name: db_name.clone(),
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
            tripay: TripayConfig {
                base_url: "https://tripay.co.id/api-sandbox".to_string(),
                api_key: "test-api-key".to_string(),
                private_key: TEST_TRIPAY_PRIVATE_KEY.to_string(),
                merchant_code: "T0001".to_string(),
            },
        };

        let database = db::connect(&mongo_url, &db_name).await?;
        let state = AppState::new(database.clone(), config.clone());
        let app = build_router(state);

        Ok(Self {
            app,
            db: database,
            config,
        })
    }

    /// Bearer header value for a freshly minted access token
    pub fn auth_header(&self, user_id: ObjectId, role: UserRole) -> String {
        let claims = Claims::new(user_id, role, TokenType::Access);
        let token = create_token(&claims, TEST_JWT_SECRET).expect("token creation");
        format!("Bearer {}", token)
    }

    /// Drops the context's database (DB-backed tests only)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        self.db.drop(None).await?;
        Ok(())
    }
}

/// Builds a JSON request
pub fn json_request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request build")
}

/// Builds a bodyless request
pub fn empty_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).expect("request build")
}

/// Reads a response body as JSON
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read");
    serde_json::from_slice(&bytes).expect("body is JSON")
}
