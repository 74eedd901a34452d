/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Request authentication context for Axum handlers
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing; short-lived access tokens, long-lived
///   refresh tokens, role carried as a claim
/// - **Constant-time Comparison**: Verification uses constant-time operations

pub mod jwt;
pub mod middleware;
pub mod password;
