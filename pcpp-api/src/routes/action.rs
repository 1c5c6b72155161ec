/// Action-parameter router
///
/// Browser clients talk to a single endpoint and pick the operation with
/// `?action=`:
///
/// ```text
/// POST /api?action=login          {"email": "...", "password": "..."}
/// GET  /api?action=getNotes&limit=4
/// GET  /api?action=searchNotes&query=limites&type=note
/// ```
///
/// The whole request is forwarded to the same typed handler the `/v1`
/// routes use, so extraction and error handling are identical.
///
/// | action        | handler                       |
/// |---------------|-------------------------------|
/// | `register`    | [`auth::register`]            |
/// | `login`       | [`auth::login`]               |
/// | `logout`      | [`auth::logout`]              |
/// | `checkAuth`   | [`auth::check_auth`]          |
/// | `getNotes`    | [`notes::list_notes`]         |
/// | `getNote`     | [`notes::get_note`]           |
/// | `addNote`     | [`notes::add_note`]           |
/// | `deleteNote`  | [`notes::delete_note`]        |
/// | `searchNotes` | [`notes::search_notes`]       |
/// | `getComments` | [`comments::get_comments`]    |
/// | `addComment`  | [`comments::add_comment`]     |
/// | `getStats`    | [`stats::get_stats`]          |

use crate::{
    app::AppState,
    error::ApiError,
    routes::{auth, comments, notes, stats},
};
use axum::{
    extract::{Query, Request, State},
    handler::Handler,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct ActionParams {
    action: Option<String>,
}

/// Dispatches `/api?action=<name>` to its handler
///
/// Unknown or missing actions fail with 400 "Invalid action".
pub async fn dispatch(State(state): State<AppState>, req: Request) -> Response {
    let action = match Query::<ActionParams>::try_from_uri(req.uri()) {
        Ok(Query(params)) => params.action.unwrap_or_default(),
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    tracing::debug!(action = %action, method = %req.method(), "Dispatching action");

    match action.as_str() {
        "register" => auth::register.call(req, state).await,
        "login" => auth::login.call(req, state).await,
        "logout" => auth::logout.call(req, state).await,
        "checkAuth" => auth::check_auth.call(req, state).await,
        "getNotes" => notes::list_notes.call(req, state).await,
        "getNote" => notes::get_note.call(req, state).await,
        "addNote" => notes::add_note.call(req, state).await,
        "deleteNote" => notes::delete_note.call(req, state).await,
        "searchNotes" => notes::search_notes.call(req, state).await,
        "getComments" => comments::get_comments.call(req, state).await,
        "addComment" => comments::add_comment.call(req, state).await,
        "getStats" => stats::get_stats.call(req, state).await,
        _ => ApiError::BadRequest("Invalid action".to_string()).into_response(),
    }
}
