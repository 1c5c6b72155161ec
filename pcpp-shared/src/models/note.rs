/// Note model and database operations
///
/// A note is a shared document: either free-form text (`type = 'note'`) or an
/// uploaded PDF stored inline as base64 (`type = 'pdf'`). Exactly one of
/// `content` or `file_name`/`file_data` is populated; [`NoteBody`] makes the
/// other combinations unrepresentable on the write path and a `CHECK`
/// constraint enforces it in the schema.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notes (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     title TEXT NOT NULL,
///     type TEXT NOT NULL CHECK (type IN ('pdf', 'note')),
///     matiere TEXT NOT NULL,
///     description TEXT,
///     content TEXT,
///     file_name TEXT,
///     file_data TEXT,
///     author_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     author_name TEXT NOT NULL,
///     search_text TEXT NOT NULL,
///     created_at TEXT NOT NULL
/// );
/// ```
///
/// Reads always join `users` for the author name and compute the comment count
/// from the `comments` table, so neither can drift.
///
/// `search_text` holds title, description and matiere lowercased with Unicode
/// rules in Rust. SQLite's `LOWER()` and `LIKE` only fold ASCII, so search
/// folds the query the same way and matches it against this column.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::fmt;
use std::str::FromStr;

/// Default page size for [`Note::list`]
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Upper bound for [`Note::list`]
pub const MAX_LIST_LIMIT: i64 = 500;

/// Longest accepted title, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Longest accepted matiere, in characters
pub const MAX_MATIERE_LENGTH: usize = 100;

/// Kind of document a note holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    /// Uploaded PDF, stored as base64
    Pdf,

    /// Inline text
    Note,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Pdf => "pdf",
            NoteType::Note => "note",
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteType {
    type Err = NoteValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pdf" => Ok(NoteType::Pdf),
            "note" => Ok(NoteType::Note),
            other => Err(NoteValidationError::InvalidType(other.to_string())),
        }
    }
}

/// Note as returned by every read path
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: i64,
    pub title: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub matiere: String,
    pub description: Option<String>,
    /// Text body (type = note)
    pub content: Option<String>,
    /// Original upload filename (type = pdf)
    pub file_name: Option<String>,
    /// Base64 file bytes (type = pdf)
    pub file_data: Option<String>,
    pub author_id: i64,
    /// Current name of the author, joined from `users`
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    /// Number of comment rows referencing this note
    pub comment_count: i64,
}

/// Body of a note being created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteBody {
    Text(String),
    Pdf { file_name: String, file_data: String },
}

impl NoteBody {
    /// Builds a PDF body, base64-encoding the uploaded bytes
    pub fn pdf(file_name: impl Into<String>, bytes: &[u8]) -> Self {
        NoteBody::Pdf {
            file_name: file_name.into(),
            file_data: STANDARD.encode(bytes),
        }
    }

    pub fn note_type(&self) -> NoteType {
        match self {
            NoteBody::Text(_) => NoteType::Note,
            NoteBody::Pdf { .. } => NoteType::Pdf,
        }
    }
}

/// Validated input for creating a note
#[derive(Debug, Clone)]
pub struct CreateNote {
    pub title: String,
    pub matiere: String,
    pub description: Option<String>,
    pub body: NoteBody,
    pub author_id: i64,
}

/// An uploaded file part: original filename and raw bytes
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Raw, unvalidated note fields as submitted by a client
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: Option<String>,
    pub note_type: Option<String>,
    pub matiere: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub file: Option<UploadedFile>,
}

/// Reasons a [`NoteDraft`] is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteValidationError {
    #[error("Field '{0}' is required")]
    MissingField(&'static str),

    #[error("Field '{field}' must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Invalid note type '{0}', expected 'pdf' or 'note'")]
    InvalidType(String),

    #[error("Note content cannot be empty")]
    EmptyContent,

    #[error("A PDF file is required")]
    MissingFile,
}

impl NoteValidationError {
    /// Field the error is about, for structured error details
    pub fn field(&self) -> &'static str {
        match self {
            NoteValidationError::MissingField(field) => field,
            NoteValidationError::TooLong { field, .. } => field,
            NoteValidationError::InvalidType(_) => "type",
            NoteValidationError::EmptyContent => "content",
            NoteValidationError::MissingFile => "file",
        }
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, NoteValidationError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(NoteValidationError::MissingField(field)),
    }
}

fn bounded(value: String, field: &'static str, max: usize) -> Result<String, NoteValidationError> {
    if value.chars().count() > max {
        return Err(NoteValidationError::TooLong { field, max });
    }
    Ok(value)
}

impl NoteDraft {
    /// Validates the draft and turns it into a [`CreateNote`]
    ///
    /// For `note`, content must be non-blank and any file is ignored. For `pdf`,
    /// a non-empty file is required and any text content is ignored.
    pub fn into_create(self, author_id: i64) -> Result<CreateNote, NoteValidationError> {
        let title = bounded(required(self.title, "title")?, "title", MAX_TITLE_LENGTH)?;
        let note_type: NoteType = required(self.note_type, "type")?.parse()?;
        let matiere = bounded(required(self.matiere, "matiere")?, "matiere", MAX_MATIERE_LENGTH)?;
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let body = match note_type {
            NoteType::Note => {
                let content = self.content.map(|c| c.trim().to_string()).unwrap_or_default();
                if content.is_empty() {
                    return Err(NoteValidationError::EmptyContent);
                }
                NoteBody::Text(content)
            }
            NoteType::Pdf => match self.file {
                Some(file) if !file.bytes.is_empty() => {
                    let file_name = if file.file_name.trim().is_empty() {
                        "document.pdf".to_string()
                    } else {
                        file.file_name.trim().to_string()
                    };
                    NoteBody::pdf(file_name, &file.bytes)
                }
                _ => return Err(NoteValidationError::MissingFile),
            },
        };

        Ok(CreateNote {
            title,
            matiere,
            description,
            body,
            author_id,
        })
    }
}

/// Filters for [`Note::search`]; empty strings mean "no filter"
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteSearch {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, rename = "type")]
    pub note_type: Option<String>,
    #[serde(default)]
    pub matiere: Option<String>,
}

/// Why a delete was refused
#[derive(Debug, thiserror::Error)]
pub enum NoteDeleteError {
    #[error("Note {0} not found")]
    NotFound(i64),

    #[error("Only the author can delete this note")]
    NotAuthor,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const NOTE_SELECT: &str = r#"
    SELECT n.id, n.title, n.type, n.matiere, n.description, n.content,
           n.file_name, n.file_data, n.author_id, u.name AS author_name, n.created_at,
           (SELECT COUNT(*) FROM comments c WHERE c.note_id = n.id) AS comment_count
    FROM notes n
    JOIN users u ON u.id = n.author_id
"#;

/// Escapes LIKE wildcards so user input only ever matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-folded haystack for [`Note::search`]
///
/// Fields are joined with a unit separator so a query cannot match across
/// two of them.
fn search_text(title: &str, description: Option<&str>, matiere: &str) -> String {
    [title, description.unwrap_or(""), matiere]
        .join("\u{1f}")
        .to_lowercase()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Note {
    /// Inserts a note and returns it as read back from the database
    ///
    /// `author_name` is copied from the author's `users` row inside the same
    /// statement.
    pub async fn create(pool: &SqlitePool, data: CreateNote) -> Result<Self, sqlx::Error> {
        let note_type = data.body.note_type();
        let haystack = search_text(&data.title, data.description.as_deref(), &data.matiere);
        let (content, file_name, file_data) = match data.body {
            NoteBody::Text(content) => (Some(content), None, None),
            NoteBody::Pdf { file_name, file_data } => (None, Some(file_name), Some(file_data)),
        };

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO notes (title, type, matiere, description, content, file_name, file_data,
                               author_id, author_name, search_text)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, (SELECT name FROM users WHERE id = ?), ?)
            RETURNING id
            "#,
        )
        .bind(data.title)
        .bind(note_type)
        .bind(data.matiere)
        .bind(data.description)
        .bind(content)
        .bind(file_name)
        .bind(file_data)
        .bind(data.author_id)
        .bind(data.author_id)
        .bind(haystack)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Finds a note by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(&format!("{NOTE_SELECT} WHERE n.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(note)
    }

    /// Whether a note with this ID exists
    pub async fn exists(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM notes WHERE id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(exists)
    }

    /// Lists notes newest-first
    ///
    /// `limit` is clamped to `1..=MAX_LIST_LIMIT`.
    pub async fn list(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);

        let notes = sqlx::query_as::<_, Note>(&format!(
            "{NOTE_SELECT} ORDER BY n.created_at DESC, n.id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(notes)
    }

    /// Searches notes newest-first
    ///
    /// `query` is a case-insensitive substring match against title,
    /// description and matiere. `type` and `matiere` are exact filters.
    /// Absent or blank filters are ignored, so an empty search returns every
    /// note.
    pub async fn search(pool: &SqlitePool, filters: &NoteSearch) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(NOTE_SELECT);
        builder.push(" WHERE 1 = 1");

        if let Some(query) = non_empty(&filters.query) {
            let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
            builder
                .push(" AND n.search_text LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\'");
        }

        if let Some(note_type) = non_empty(&filters.note_type) {
            builder.push(" AND n.type = ").push_bind(note_type.to_string());
        }

        if let Some(matiere) = non_empty(&filters.matiere) {
            builder.push(" AND n.matiere = ").push_bind(matiere.to_string());
        }

        builder.push(" ORDER BY n.created_at DESC, n.id DESC");

        let notes = builder.build_query_as::<Note>().fetch_all(pool).await?;

        Ok(notes)
    }

    /// Deletes a note on behalf of `author_id`
    ///
    /// The ownership check and the delete run in one transaction. Comments go
    /// with the note through `ON DELETE CASCADE`.
    pub async fn delete_by_author(
        pool: &SqlitePool,
        id: i64,
        author_id: i64,
    ) -> Result<(), NoteDeleteError> {
        let mut tx = pool.begin().await?;

        let owner: Option<i64> = sqlx::query_scalar("SELECT author_id FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        match owner {
            None => return Err(NoteDeleteError::NotFound(id)),
            Some(owner) if owner != author_id => return Err(NoteDeleteError::NotAuthor),
            Some(_) => {}
        }

        sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Counts total number of notes
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notes")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_draft() -> NoteDraft {
        NoteDraft {
            title: Some("  Limites  ".to_string()),
            note_type: Some("note".to_string()),
            matiere: Some("Maths".to_string()),
            description: Some("   ".to_string()),
            content: Some("lim x->0 sin(x)/x = 1".to_string()),
            file: None,
        }
    }

    #[test]
    fn test_note_type_parse() {
        assert_eq!("pdf".parse::<NoteType>().unwrap(), NoteType::Pdf);
        assert_eq!("note".parse::<NoteType>().unwrap(), NoteType::Note);
        assert_eq!(
            "docx".parse::<NoteType>().unwrap_err(),
            NoteValidationError::InvalidType("docx".to_string())
        );
        assert_eq!(NoteType::Pdf.to_string(), "pdf");
    }

    #[test]
    fn test_text_draft_is_trimmed() {
        let create = text_draft().into_create(3).unwrap();

        assert_eq!(create.title, "Limites");
        assert_eq!(create.description, None);
        assert_eq!(create.author_id, 3);
        assert_eq!(create.body, NoteBody::Text("lim x->0 sin(x)/x = 1".to_string()));
    }

    #[test]
    fn test_text_draft_ignores_file() {
        let mut draft = text_draft();
        draft.file = Some(UploadedFile {
            file_name: "x.pdf".to_string(),
            bytes: vec![1, 2, 3],
        });

        let create = draft.into_create(1).unwrap();
        assert_eq!(create.body.note_type(), NoteType::Note);
    }

    #[test]
    fn test_missing_required_fields() {
        let mut draft = text_draft();
        draft.title = None;
        assert_eq!(
            draft.into_create(1).unwrap_err(),
            NoteValidationError::MissingField("title")
        );

        let mut draft = text_draft();
        draft.matiere = Some(" ".to_string());
        assert_eq!(
            draft.into_create(1).unwrap_err(),
            NoteValidationError::MissingField("matiere")
        );

        let mut draft = text_draft();
        draft.note_type = None;
        assert_eq!(draft.into_create(1).unwrap_err().field(), "type");
    }

    #[test]
    fn test_empty_text_content_rejected() {
        let mut draft = text_draft();
        draft.content = Some("  \n ".to_string());
        assert_eq!(draft.into_create(1).unwrap_err(), NoteValidationError::EmptyContent);
    }

    #[test]
    fn test_title_too_long() {
        let mut draft = text_draft();
        draft.title = Some("t".repeat(MAX_TITLE_LENGTH + 1));
        assert_eq!(
            draft.into_create(1).unwrap_err(),
            NoteValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LENGTH
            }
        );
    }

    #[test]
    fn test_pdf_draft_encodes_base64() {
        let draft = NoteDraft {
            title: Some("Cours".to_string()),
            note_type: Some("pdf".to_string()),
            matiere: Some("Physique".to_string()),
            description: None,
            content: Some("ignored".to_string()),
            file: Some(UploadedFile {
                file_name: "cours.pdf".to_string(),
                bytes: b"%PDF-1.4".to_vec(),
            }),
        };

        let create = draft.into_create(1).unwrap();
        assert_eq!(
            create.body,
            NoteBody::Pdf {
                file_name: "cours.pdf".to_string(),
                file_data: "JVBERi0xLjQ=".to_string(),
            }
        );
    }

    #[test]
    fn test_pdf_draft_requires_file() {
        let mut draft = text_draft();
        draft.note_type = Some("pdf".to_string());
        assert_eq!(draft.into_create(1).unwrap_err(), NoteValidationError::MissingFile);

        let mut draft = text_draft();
        draft.note_type = Some("pdf".to_string());
        draft.file = Some(UploadedFile::default());
        assert_eq!(draft.into_create(1).unwrap_err(), NoteValidationError::MissingFile);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_search_text_folds_unicode() {
        assert_eq!(
            search_text("Électricité", Some("Cours À revoir"), "Physique"),
            "électricité\u{1f}cours à revoir\u{1f}physique"
        );
        assert_eq!(search_text("Ça", None, "ÉCO"), "ça\u{1f}\u{1f}éco");
    }
}
