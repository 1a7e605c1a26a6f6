//! Cross-cutting domain errors.
//!
//! Turn protocol rejections have their own taxonomy in
//! [`crate::global_story::GlobalStoryError`]; this enum covers the generic
//! failures shared by every resource.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested entity does not exist (or no story is active).
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// The operation conflicts with current state, e.g. completing a quest
    /// that was never accepted.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}
