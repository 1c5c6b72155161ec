/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Register, login, logout and current user
/// - `notes`: Listing, search, upload and deletion of notes
/// - `comments`: Comments on a note
/// - `stats`: Site-wide counters
/// - `action`: The `?action=` dispatcher in front of all of the above

pub mod action;
pub mod auth;
pub mod comments;
pub mod health;
pub mod notes;
pub mod stats;
