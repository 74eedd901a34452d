/// Cross-cutting request/response middleware
///
/// - `security`: OWASP-recommended response headers

pub mod security;
