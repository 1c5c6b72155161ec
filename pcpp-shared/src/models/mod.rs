/// Database models for PCPP
///
/// This module contains all database models and their SQL operations.
///
/// # Models
///
/// - `user`: Accounts and credentials
/// - `note`: Shared documents (text notes and PDFs) plus draft validation
/// - `comment`: Comments attached to notes
/// - `session`: Server-side login sessions
/// - `stats`: Site-wide counters
///
/// # Example
///
/// ```no_run
/// use pcpp_shared::models::note::{Note, NoteSearch};
/// use pcpp_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let recent = Note::list(&pool, 4).await?;
/// let maths = Note::search(&pool, &NoteSearch {
///     matiere: Some("Maths".to_string()),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod note;
pub mod session;
pub mod stats;
pub mod user;
