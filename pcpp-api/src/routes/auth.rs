/// Authentication endpoints
///
/// Registration and login both open a server-side session and set the
/// `pcpp_session` cookie, so a freshly registered user is already logged in.
///
/// # Endpoints
///
/// - `POST /v1/auth/register` (`action=register`) - Create an account
/// - `POST /v1/auth/login` (`action=login`) - Open a session
/// - `POST /v1/auth/logout` (`action=logout`) - Close the session
/// - `GET  /v1/auth/me` (`action=checkAuth`) - Current user or null

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::{logout_cookie, session_cookie, AuthContext},
    response::{Empty, Envelope, UserPayload},
};
use axum::{extract::State, Extension, Json};
use axum_extra::extract::{CookieJar, WithRejection};
use pcpp_shared::{
    auth::password,
    models::{
        session::Session,
        user::{CreateUser, User},
    },
};
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,

    /// Email address
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[serde(default)]
    #[validate(custom(function = "check_password_length"))]
    pub password: String,

    /// Level tag, e.g. "student"
    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "Level is required (max 20 characters)"))]
    pub level: String,
}

fn check_password_length(password: &str) -> Result<(), ValidationError> {
    password::validate_password_length(password).map_err(|message| {
        let mut err = ValidationError::new("length");
        err.message = Some(message.into());
        err
    })
}

impl RegisterRequest {
    fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
            level: self.level.trim().to_string(),
        }
    }
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

/// Opens a session for `user` and adds its cookie to the jar
async fn open_session(state: &AppState, jar: CookieJar, user: &User) -> ApiResult<CookieJar> {
    let (token, _session) = Session::create(&state.db, user.id, state.config.session_ttl()).await?;

    Ok(jar.add(session_cookie(
        token,
        state.config.session.ttl_hours,
        state.config.api.production,
    )))
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Alice",
///   "email": "a@x.com",
///   "password": "secret1",
///   "level": "student"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Registration successful",
///   "user": { "id": 1, "name": "Alice", "email": "a@x.com", "level": "student" }
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Missing or invalid field
/// - `409 Conflict`: Email already used
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> ApiResult<(CookieJar, Envelope<UserPayload>)> {
    let req = req.trimmed();

    req.validate()?;

    if User::email_exists(&state.db, &req.email).await? {
        tracing::warn!("Registration rejected: email already used");
        return Err(ApiError::Conflict("Email already used".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    // The unique index still guards against a concurrent registration
    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            level: req.level,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    let jar = open_session(&state, jar, &user).await?;

    Ok((
        jar,
        Envelope::with_message(
            "Registration successful",
            UserPayload {
                user: Some(user.public()),
            },
        ),
    ))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// { "email": "a@x.com", "password": "secret1" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Email or password empty
/// - `401 Unauthorized`: "Invalid email or password", whichever was wrong
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<(CookieJar, Envelope<UserPayload>)> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::invalid("email", "Email and password are required"));
    }

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = match User::find_by_email(&state.db, email).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Login failed: unknown email");
            return Err(invalid());
        }
    };

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "Login failed: wrong password");
        return Err(invalid());
    }

    tracing::info!(user_id = user.id, "User logged in");

    let jar = open_session(&state, jar, &user).await?;

    Ok((
        jar,
        Envelope::with_message(
            "Login successful",
            UserPayload {
                user: Some(user.public()),
            },
        ),
    ))
}

/// Logout endpoint
///
/// Deletes the session row if there is one and expires the cookie. Succeeds
/// even without a session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Envelope<Empty>)> {
    if let Some(token) = auth.token.as_deref() {
        if Session::delete_by_token(&state.db, token).await? {
            tracing::info!(user_id = ?auth.user.as_ref().map(|u| u.id), "User logged out");
        }
    }

    Ok((
        jar.add(logout_cookie(state.config.api.production)),
        Envelope::message("Logged out"),
    ))
}

/// Current user
///
/// Always 200: `{ "success": true, "user": {...} }` with a live session,
/// otherwise `{ "success": false, "user": null }`.
pub async fn check_auth(Extension(auth): Extension<AuthContext>) -> Envelope<UserPayload> {
    match auth.user {
        Some(user) => Envelope::ok(UserPayload {
            user: Some(user.public()),
        }),
        None => Envelope {
            success: false,
            message: None,
            payload: UserPayload { user: None },
        },
    }
}
