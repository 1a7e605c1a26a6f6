//! Error type for repository operations that mix storage and protocol
//! failures.

use stxry_core::global_story::GlobalStoryError;

/// A repository failure: either the datastore itself, or a turn-protocol
/// rule the store enforces atomically (cooldown, self-vote, closed voting,
/// already-resolved claims).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Protocol(#[from] GlobalStoryError),
}
