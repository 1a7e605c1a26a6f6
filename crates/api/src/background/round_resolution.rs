//! Periodic resolution of Global Story rounds whose deadline has passed.
//!
//! Polls on a fixed interval using `tokio::time::interval` and resolves
//! every due chapter through the shared engine. Runs until cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use stxry_core::global_story::GlobalStoryError;
use stxry_db::repositories::StoryRepo;
use stxry_narrative::ContinuationGenerator;
use tokio_util::sync::CancellationToken;

use crate::engine::resolution;
use crate::error::AppError;

/// Run the round resolution loop.
///
/// Every `poll_interval`, open chapters past their voting deadline are
/// resolved. Per-chapter failures are logged and retried on the next tick;
/// `AlreadyResolved` (a concurrent resolver or the admin endpoint won) and
/// `NoSubmissions` (empty round, keeps waiting for a first action) are
/// expected outcomes, not faults.
pub async fn run(
    pool: PgPool,
    generator: Arc<dyn ContinuationGenerator>,
    round_duration: chrono::Duration,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        poll_secs = poll_interval.as_secs(),
        round_hours = round_duration.num_hours(),
        "Round resolution task started"
    );

    let mut interval = tokio::time::interval(poll_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Round resolution task stopping");
                break;
            }
            _ = interval.tick() => {
                resolve_due(&pool, generator.as_ref(), round_duration).await;
            }
        }
    }
}

async fn resolve_due(
    pool: &PgPool,
    generator: &dyn ContinuationGenerator,
    round_duration: chrono::Duration,
) {
    let due = match StoryRepo::list_due_for_resolution(pool, Utc::now()).await {
        Ok(due) => due,
        Err(e) => {
            tracing::error!(error = %e, "Round resolution: failed to list due chapters");
            return;
        }
    };

    for chapter in due {
        match resolution::resolve_chapter(pool, generator, chapter.id, round_duration).await {
            Ok(resolved) => {
                tracing::info!(
                    chapter_id = chapter.id,
                    new_chapter_id = resolved.new_chapter.id,
                    "Round resolution: resolved chapter"
                );
            }
            Err(AppError::Protocol(GlobalStoryError::AlreadyResolved)) => {
                tracing::debug!(chapter_id = chapter.id, "Round resolution: already resolved");
            }
            Err(AppError::Protocol(GlobalStoryError::NoSubmissions)) => {
                tracing::debug!(
                    chapter_id = chapter.id,
                    "Round resolution: no submissions yet, waiting"
                );
            }
            Err(e) => {
                tracing::error!(
                    chapter_id = chapter.id,
                    error = %e,
                    "Round resolution: failed, will retry next tick"
                );
            }
        }
    }
}
