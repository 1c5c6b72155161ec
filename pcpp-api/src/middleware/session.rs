/// Cookie session middleware
///
/// Every request passes through [`session_layer`], which looks up the
/// `pcpp_session` cookie and inserts an [`AuthContext`] into the request
/// extensions. Handlers that need a logged-in user call
/// [`AuthContext::require`]; the rest can inspect `user` directly.
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Json};
/// use pcpp_api::{error::ApiResult, middleware::session::AuthContext};
/// use pcpp_shared::models::user::PublicUser;
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> ApiResult<Json<PublicUser>> {
///     let user = auth.require()?;
///     Ok(Json(user.public()))
/// }
/// ```

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use pcpp_shared::models::{session::Session, user::User};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "pcpp_session";

/// Who is making the request
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    /// Logged-in user, if the cookie maps to a live session
    pub user: Option<User>,

    /// Raw token from the cookie, kept so logout can delete the row
    pub token: Option<String>,
}

impl AuthContext {
    /// Returns the user or fails with 401
    pub fn require(&self) -> Result<&User, ApiError> {
        self.user.as_ref().ok_or_else(ApiError::not_logged_in)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Resolves the session cookie into an [`AuthContext`]
///
/// Never rejects a request: unknown or expired tokens just leave `user`
/// empty. Database failures while resolving do propagate as 500s.
pub async fn session_layer(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let mut auth = AuthContext::default();

    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        let token = cookie.value().to_string();
        auth.user = Session::find_user(&state.db, &token).await?;
        if auth.user.is_none() {
            tracing::debug!("Session cookie did not match a live session");
        }
        auth.token = Some(token);
    }

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Builds the cookie handed out at login and registration
pub fn session_cookie(token: String, ttl_hours: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(ttl_hours))
        .path("/")
        .build()
}

/// Builds an already-expired cookie that makes the browser drop the session
pub fn logout_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(0))
        .path("/")
        .build()
}
