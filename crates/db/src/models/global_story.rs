//! Global Story entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stxry_core::types::{DbId, Timestamp};

/// A row from the `global_stories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GlobalStory {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub unique_contributors: i64,
    pub total_contributions: i64,
    pub created_at: Timestamp,
}

/// A row from the `gs_chapters` table.
///
/// `ai_generated_choices` holds the preset option texts offered for this
/// chapter's round, produced once when the chapter opens.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GlobalStoryChapter {
    pub id: DbId,
    pub story_id: DbId,
    pub chapter_number: i32,
    pub title: String,
    pub content: String,
    pub ai_generated_choices: serde_json::Value,
    pub winning_action_text: Option<String>,
    pub votes_tallied: bool,
    pub voting_ends_at: Timestamp,
    pub created_at: Timestamp,
}

impl GlobalStoryChapter {
    /// Preset choice texts as strings. Non-string entries are skipped.
    pub fn preset_choices(&self) -> Vec<String> {
        self.ai_generated_choices
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A row from the `gs_actions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GlobalStoryAction {
    pub id: DbId,
    pub chapter_id: DbId,
    pub user_id: DbId,
    pub action_type: String,
    pub action_text: String,
    pub vote_count: i64,
    pub is_selected: bool,
    pub created_at: Timestamp,
}

/// An action as seen by a specific viewer: adds the viewer-relative
/// `has_user_voted` flag computed in the listing query.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ViewedAction {
    pub id: DbId,
    pub chapter_id: DbId,
    pub user_id: DbId,
    pub action_type: String,
    pub action_text: String,
    pub vote_count: i64,
    pub is_selected: bool,
    pub has_user_voted: bool,
    pub created_at: Timestamp,
}

/// DTO for opening a new chapter (the content and choices come from the
/// continuation generator).
#[derive(Debug, Clone, Deserialize)]
pub struct NewChapter {
    pub title: String,
    pub content: String,
    pub choices: Vec<String>,
    pub voting_ends_at: Timestamp,
}
