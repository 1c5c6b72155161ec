/// Middleware modules for the API server
///
/// - `session`: Resolves the session cookie into an `AuthContext`
/// - `security`: Security response headers

pub mod security;
pub mod session;
