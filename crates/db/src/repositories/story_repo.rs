//! Repository for `global_stories` and `gs_chapters`.

use sqlx::PgPool;
use stxry_core::types::{DbId, Timestamp};

use crate::models::global_story::{GlobalStory, GlobalStoryChapter, NewChapter};

/// Column list for `global_stories` queries.
const STORY_COLUMNS: &str =
    "id, title, description, is_active, unique_contributors, total_contributions, created_at";

/// Column list for `gs_chapters` queries.
const CHAPTER_COLUMNS: &str = "id, story_id, chapter_number, title, content, \
    ai_generated_choices, winning_action_text, votes_tallied, voting_ends_at, created_at";

pub struct StoryRepo;

impl StoryRepo {
    /// The single system-wide active story, if any. Replaces any cached
    /// "current story" singleton: always queried, never trusted across
    /// requests.
    pub async fn find_active(pool: &PgPool) -> Result<Option<GlobalStory>, sqlx::Error> {
        let query = format!("SELECT {STORY_COLUMNS} FROM global_stories WHERE is_active");
        sqlx::query_as::<_, GlobalStory>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Find a story by id.
    pub async fn find(pool: &PgPool, story_id: DbId) -> Result<Option<GlobalStory>, sqlx::Error> {
        let query = format!("SELECT {STORY_COLUMNS} FROM global_stories WHERE id = $1");
        sqlx::query_as::<_, GlobalStory>(&query)
            .bind(story_id)
            .fetch_optional(pool)
            .await
    }

    /// Create a story together with its opening chapter. The partial unique
    /// index on `is_active` rejects a second active story.
    pub async fn create_with_first_chapter(
        pool: &PgPool,
        title: &str,
        description: &str,
        first_chapter: &NewChapter,
    ) -> Result<(GlobalStory, GlobalStoryChapter), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let story_query = format!(
            "INSERT INTO global_stories (title, description) VALUES ($1, $2) \
             RETURNING {STORY_COLUMNS}"
        );
        let story = sqlx::query_as::<_, GlobalStory>(&story_query)
            .bind(title)
            .bind(description)
            .fetch_one(&mut *tx)
            .await?;

        let chapter_query = format!(
            "INSERT INTO gs_chapters \
                (story_id, chapter_number, title, content, ai_generated_choices, voting_ends_at) \
             VALUES ($1, 1, $2, $3, $4, $5) \
             RETURNING {CHAPTER_COLUMNS}"
        );
        let chapter = sqlx::query_as::<_, GlobalStoryChapter>(&chapter_query)
            .bind(story.id)
            .bind(&first_chapter.title)
            .bind(&first_chapter.content)
            .bind(serde_json::json!(first_chapter.choices))
            .bind(first_chapter.voting_ends_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((story, chapter))
    }

    /// All chapters of a story in reading order.
    pub async fn list_chapters(
        pool: &PgPool,
        story_id: DbId,
    ) -> Result<Vec<GlobalStoryChapter>, sqlx::Error> {
        let query = format!(
            "SELECT {CHAPTER_COLUMNS} FROM gs_chapters \
             WHERE story_id = $1 ORDER BY chapter_number"
        );
        sqlx::query_as::<_, GlobalStoryChapter>(&query)
            .bind(story_id)
            .fetch_all(pool)
            .await
    }

    /// The story's open chapter (the round currently accepting actions and
    /// votes), if resolution has not yet closed it.
    pub async fn current_open_chapter(
        pool: &PgPool,
        story_id: DbId,
    ) -> Result<Option<GlobalStoryChapter>, sqlx::Error> {
        let query = format!(
            "SELECT {CHAPTER_COLUMNS} FROM gs_chapters \
             WHERE story_id = $1 AND NOT votes_tallied \
             ORDER BY chapter_number DESC LIMIT 1"
        );
        sqlx::query_as::<_, GlobalStoryChapter>(&query)
            .bind(story_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a chapter by id.
    pub async fn find_chapter(
        pool: &PgPool,
        chapter_id: DbId,
    ) -> Result<Option<GlobalStoryChapter>, sqlx::Error> {
        let query = format!("SELECT {CHAPTER_COLUMNS} FROM gs_chapters WHERE id = $1");
        sqlx::query_as::<_, GlobalStoryChapter>(&query)
            .bind(chapter_id)
            .fetch_optional(pool)
            .await
    }

    /// Open chapters whose voting deadline has passed (resolution due).
    pub async fn list_due_for_resolution(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<GlobalStoryChapter>, sqlx::Error> {
        let query = format!(
            "SELECT {CHAPTER_COLUMNS} FROM gs_chapters \
             WHERE NOT votes_tallied AND voting_ends_at <= $1 \
             ORDER BY voting_ends_at"
        );
        sqlx::query_as::<_, GlobalStoryChapter>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }
}
