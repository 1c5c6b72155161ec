/// Comment endpoints
///
/// - `GET  /v1/notes/:id/comments` (`action=getComments&noteId=N`)
/// - `POST /v1/notes/:id/comments` (`action=addComment`, body `{noteId, text}`)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::AuthContext,
    response::{CommentPayload, CommentView, CommentsPayload, Envelope},
    routes::notes::require_id,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use pcpp_shared::models::{
    comment::{Comment, CreateComment, MAX_COMMENT_LENGTH},
    note::Note,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CommentsParams {
    #[serde(rename = "noteId")]
    pub note_id: Option<i64>,
}

/// Body for adding a comment; `noteId` is taken from the path on `/v1`
#[derive(Debug, Default, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default, rename = "noteId")]
    pub note_id: Option<i64>,

    #[serde(default)]
    pub text: String,
}

async fn list_for_note(state: &AppState, note_id: i64) -> ApiResult<Envelope<CommentsPayload>> {
    let comments = Comment::list_by_note(&state.db, note_id).await?;

    Ok(Envelope::ok(CommentsPayload {
        comments: comments.into_iter().map(CommentView::from).collect(),
    }))
}

/// `GET /api?action=getComments&noteId=N`
pub async fn get_comments(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<CommentsParams>, ApiError>,
) -> ApiResult<Envelope<CommentsPayload>> {
    let note_id = require_id(params.note_id, "noteId")?;
    list_for_note(&state, note_id).await
}

/// `GET /v1/notes/:id/comments`
pub async fn get_comments_by_path(
    State(state): State<AppState>,
    WithRejection(Path(note_id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Envelope<CommentsPayload>> {
    let note_id = require_id(Some(note_id), "noteId")?;
    list_for_note(&state, note_id).await
}

async fn create_comment(
    state: &AppState,
    auth: &AuthContext,
    note_id: Option<i64>,
    text: &str,
) -> ApiResult<Envelope<CommentPayload>> {
    let user = auth.require()?;
    let note_id = require_id(note_id, "noteId")?;

    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::invalid("text", "Comment text cannot be empty"));
    }
    if text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ApiError::invalid(
            "text",
            format!("Comment must be at most {} characters", MAX_COMMENT_LENGTH),
        ));
    }

    if !Note::exists(&state.db, note_id).await? {
        return Err(ApiError::NotFound("Note not found".to_string()));
    }

    let comment = Comment::create(
        &state.db,
        CreateComment {
            note_id,
            author_id: user.id,
            text: text.to_string(),
        },
    )
    .await?;

    tracing::info!(comment_id = comment.id, note_id, user_id = user.id, "Comment added");

    Ok(Envelope::with_message(
        "Comment added",
        CommentPayload {
            comment: CommentView::from(comment),
        },
    ))
}

/// Adds a comment to a note
///
/// # Endpoint
///
/// ```text
/// POST /api?action=addComment
/// Content-Type: application/json
///
/// { "noteId": 3, "text": "Merci !" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Not logged in
/// - `422 Unprocessable Entity`: Missing noteId or empty text
/// - `404 Not Found`: Note does not exist
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    WithRejection(Json(req), _): WithRejection<Json<AddCommentRequest>, ApiError>,
) -> ApiResult<Envelope<CommentPayload>> {
    create_comment(&state, &auth, req.note_id, &req.text).await
}

/// `POST /v1/notes/:id/comments` with `{"text": "..."}`
pub async fn add_comment_by_path(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    WithRejection(Path(note_id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<AddCommentRequest>, ApiError>,
) -> ApiResult<Envelope<CommentPayload>> {
    create_comment(&state, &auth, Some(note_id), &req.text).await
}
