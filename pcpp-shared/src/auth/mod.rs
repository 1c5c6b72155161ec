/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and length validation
/// - [`token`]: Session token generation and SHA-256 hashing
///
/// The HTTP side (cookies, per-request auth context) lives in the API crate;
/// session persistence is in [`crate::models::session`].

pub mod password;
pub mod token;
