/// Note endpoints
///
/// # Endpoints
///
/// - `GET    /v1/notes` (`action=getNotes`) - Newest notes
/// - `POST   /v1/notes` (`action=addNote`) - Upload a note or PDF (multipart)
/// - `GET    /v1/notes/search` (`action=searchNotes`) - Filtered listing
/// - `GET    /v1/notes/:id` (`action=getNote`) - One note
/// - `DELETE /v1/notes/:id` (`action=deleteNote`) - Delete own note

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::AuthContext,
    response::{Empty, Envelope, IdPayload, NotePayload, NoteView, NotesPayload},
};
use axum::{
    extract::{Multipart, Path, Query, State},
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use pcpp_shared::models::note::{Note, NoteDraft, NoteSearch, UploadedFile, DEFAULT_LIST_LIMIT};
use serde::Deserialize;

/// `?limit=` for the listing
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// `?id=` for the action-style single-note lookup
#[derive(Debug, Default, Deserialize)]
pub struct NoteIdParams {
    pub id: Option<i64>,
}

/// Body of `action=deleteNote`
#[derive(Debug, Default, Deserialize)]
pub struct DeleteNoteRequest {
    #[serde(default)]
    pub id: Option<i64>,
}

/// Rejects a missing or non-positive id
pub(crate) fn require_id(id: Option<i64>, field: &'static str) -> ApiResult<i64> {
    match id {
        Some(id) if id > 0 => Ok(id),
        _ => Err(ApiError::invalid(field, format!("Field '{}' is required", field))),
    }
}

/// Lists notes newest-first
///
/// `limit` defaults to 100 and is clamped to 1..=500.
pub async fn list_notes(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, ApiError>,
) -> ApiResult<Envelope<NotesPayload>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let notes = Note::list(&state.db, limit).await?;

    tracing::debug!(count = notes.len(), limit, "Listed notes");

    Ok(Envelope::ok(NotesPayload::from_notes(notes)))
}

async fn fetch_note(state: &AppState, id: i64) -> ApiResult<Envelope<NotePayload>> {
    let note = Note::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Envelope::ok(NotePayload {
        note: NoteView::from(note),
    }))
}

/// `GET /api?action=getNote&id=N`
pub async fn get_note(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<NoteIdParams>, ApiError>,
) -> ApiResult<Envelope<NotePayload>> {
    let id = require_id(params.id, "id")?;
    fetch_note(&state, id).await
}

/// `GET /v1/notes/:id`
pub async fn get_note_by_path(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Envelope<NotePayload>> {
    let id = require_id(Some(id), "id")?;
    fetch_note(&state, id).await
}

/// Reads the multipart form into a draft
///
/// Unknown parts are skipped. A `file` part with no bytes counts as absent.
async fn read_draft(mut multipart: Multipart) -> ApiResult<NoteDraft> {
    let mut draft = NoteDraft::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    draft.file = Some(UploadedFile {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            Some("title") => draft.title = Some(field.text().await?),
            Some("type") => draft.note_type = Some(field.text().await?),
            Some("matiere") => draft.matiere = Some(field.text().await?),
            Some("description") => draft.description = Some(field.text().await?),
            Some("content") => draft.content = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(draft)
}

/// Creates a note from a multipart form
///
/// # Endpoint
///
/// ```text
/// POST /v1/notes
/// Content-Type: multipart/form-data
///
/// title=Limites  type=note  matiere=Maths  content=...
/// title=Cours    type=pdf   matiere=Physique  file=@cours.pdf
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "message": "Note added", "id": 12 }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Not logged in
/// - `422 Unprocessable Entity`: Missing title/type/matiere, bad type,
///   empty content or missing PDF
/// - `413 Payload Too Large`: Upload above `MAX_UPLOAD_MB`
pub async fn add_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    WithRejection(multipart, _): WithRejection<Multipart, ApiError>,
) -> ApiResult<Envelope<IdPayload>> {
    let user = auth.require()?;

    let draft = read_draft(multipart).await?;
    let create = draft.into_create(user.id)?;
    let note = Note::create(&state.db, create).await?;

    tracing::info!(note_id = note.id, user_id = user.id, note_type = %note.note_type, "Note added");

    Ok(Envelope::with_message("Note added", IdPayload { id: note.id }))
}

async fn remove_note(state: &AppState, auth: &AuthContext, id: i64) -> ApiResult<Envelope<Empty>> {
    let user = auth.require()?;

    if let Err(err) = Note::delete_by_author(&state.db, id, user.id).await {
        tracing::warn!(note_id = id, user_id = user.id, error = %err, "Note delete refused");
        return Err(err.into());
    }

    tracing::info!(note_id = id, user_id = user.id, "Note deleted");

    Ok(Envelope::message("Note deleted"))
}

/// `POST /api?action=deleteNote` with `{"id": N}`
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    WithRejection(Json(req), _): WithRejection<Json<DeleteNoteRequest>, ApiError>,
) -> ApiResult<Envelope<Empty>> {
    auth.require()?;
    let id = require_id(req.id, "id")?;
    remove_note(&state, &auth, id).await
}

/// `DELETE /v1/notes/:id`
pub async fn delete_note_by_path(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Envelope<Empty>> {
    auth.require()?;
    let id = require_id(Some(id), "id")?;
    remove_note(&state, &auth, id).await
}

/// Searches notes
///
/// `query` matches title, description and matiere case-insensitively.
/// `type` and `matiere` filter exactly. Blank parameters are ignored.
pub async fn search_notes(
    State(state): State<AppState>,
    WithRejection(Query(search), _): WithRejection<Query<NoteSearch>, ApiError>,
) -> ApiResult<Envelope<NotesPayload>> {
    let notes = Note::search(&state.db, &search).await?;

    tracing::debug!(count = notes.len(), "Searched notes");

    Ok(Envelope::ok(NotesPayload::from_notes(notes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(Some(4), "id").unwrap(), 4);
        assert!(matches!(
            require_id(None, "id"),
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(
            require_id(Some(0), "noteId"),
            Err(ApiError::ValidationError(_))
        ));
    }
}
