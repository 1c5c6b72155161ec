/// Success envelope shared by every endpoint
///
/// Payload fields are flattened next to `success` and the optional
/// `message`, so a note list renders as:
///
/// ```json
/// { "success": true, "notes": [ ... ] }
/// ```
///
/// # Example
///
/// ```
/// use pcpp_api::response::Envelope;
/// use serde_json::json;
///
/// let body = Envelope::with_message("Note added", json!({ "id": 7 }));
/// let value = serde_json::to_value(&body).unwrap();
/// assert_eq!(value, json!({ "success": true, "message": "Note added", "id": 7 }));
/// ```

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use pcpp_shared::models::{comment::Comment, note::Note, note::NoteType, user::PublicUser};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub payload: T,
}

/// Payload for responses that carry nothing beyond the envelope
#[derive(Debug, Serialize)]
pub struct Empty {}

impl<T: Serialize> Envelope<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            message: None,
            payload,
        }
    }

    pub fn with_message(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            payload,
        }
    }
}

impl Envelope<Empty> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_message(message, Empty {})
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Wire shape of a note
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub matiere: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub file_name: Option<String>,
    pub file_data: Option<String>,
    pub author: String,
    pub author_id: i64,
    pub date: String,
    pub comments: i64,
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        Self {
            date: format_date(&note.created_at),
            id: note.id,
            title: note.title,
            note_type: note.note_type,
            matiere: note.matiere,
            description: note.description,
            content: note.content,
            file_name: note.file_name,
            file_data: note.file_data,
            author: note.author_name,
            author_id: note.author_id,
            comments: note.comment_count,
        }
    }
}

/// Wire shape of a comment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub note_id: i64,
    pub text: String,
    pub author: String,
    pub author_id: i64,
    pub date: String,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            date: format_date(&comment.created_at),
            id: comment.id,
            note_id: comment.note_id,
            text: comment.text,
            author: comment.author_name,
            author_id: comment.author_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: Option<PublicUser>,
}

#[derive(Debug, Serialize)]
pub struct NotesPayload {
    pub notes: Vec<NoteView>,
}

impl NotesPayload {
    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: notes.into_iter().map(NoteView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotePayload {
    pub note: NoteView,
}

#[derive(Debug, Serialize)]
pub struct IdPayload {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct CommentsPayload {
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct CommentPayload {
    pub comment: CommentView,
}

#[derive(Debug, Serialize)]
pub struct StatsPayload {
    pub stats: pcpp_shared::models::stats::Stats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_empty_envelope() {
        let value = serde_json::to_value(Envelope::message("Logged out")).unwrap();
        assert_eq!(value, json!({ "success": true, "message": "Logged out" }));
    }

    #[test]
    fn test_payload_is_flattened() {
        let value = serde_json::to_value(Envelope::ok(IdPayload { id: 3 })).unwrap();
        assert_eq!(value, json!({ "success": true, "id": 3 }));
    }

    #[test]
    fn test_note_view_field_names() {
        let note = Note {
            id: 1,
            title: "Cours".to_string(),
            note_type: NoteType::Pdf,
            matiere: "Physique".to_string(),
            description: None,
            content: None,
            file_name: Some("cours.pdf".to_string()),
            file_data: Some("JVBERg==".to_string()),
            author_id: 2,
            author_name: "Alice".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap(),
            comment_count: 4,
        };

        let value = serde_json::to_value(NoteView::from(note)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "title": "Cours",
                "type": "pdf",
                "matiere": "Physique",
                "description": null,
                "content": null,
                "fileName": "cours.pdf",
                "fileData": "JVBERg==",
                "author": "Alice",
                "authorId": 2,
                "date": "2024-03-01T10:30:00.000Z",
                "comments": 4
            })
        );
    }

    #[test]
    fn test_comment_view_field_names() {
        let comment = Comment {
            id: 9,
            note_id: 1,
            text: "Merci".to_string(),
            author_id: 5,
            author_name: "Bob".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
        };

        let value = serde_json::to_value(CommentView::from(comment)).unwrap();
        assert_eq!(value["noteId"], 1);
        assert_eq!(value["authorId"], 5);
        assert_eq!(value["author"], "Bob");
        assert_eq!(value["date"], "2024-03-02T08:00:00.000Z");
    }
}
