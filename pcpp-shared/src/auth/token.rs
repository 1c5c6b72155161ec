/// Session token utilities
///
/// A session token is the opaque value stored in the session cookie. Only its
/// SHA-256 hash is persisted, so a leaked `sessions` table cannot be replayed
/// as cookies.
///
/// # Token Format
///
/// `pcpp_` followed by 48 random alphanumeric characters (53 chars total).
///
/// # Example
///
/// ```
/// use pcpp_shared::auth::token::{generate_session_token, hash_session_token, is_valid_token_format};
///
/// let (token, hash) = generate_session_token();
/// assert!(token.starts_with("pcpp_"));
/// assert!(is_valid_token_format(&token));
/// assert_eq!(hash, hash_session_token(&token));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

const TOKEN_RANDOM_LENGTH: usize = 48;

const TOKEN_PREFIX: &str = "pcpp_";

/// Total length of a session token (prefix + random)
pub const SESSION_TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a new session token
///
/// Returns `(plaintext_token, sha256_hex)`. The plaintext goes into the
/// cookie, the hash into the database.
pub fn generate_session_token() -> (String, String) {
    let token = format!("{}{}", TOKEN_PREFIX, random_alphanumeric(TOKEN_RANDOM_LENGTH));
    let hash = hash_session_token(&token);

    (token, hash)
}

fn random_alphanumeric(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Hashes a session token with SHA-256, hex encoded (64 chars)
pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Cheap shape check run before touching the database
pub fn is_valid_token_format(token: &str) -> bool {
    token.len() == SESSION_TOKEN_LENGTH
        && token.starts_with(TOKEN_PREFIX)
        && token[TOKEN_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
}
