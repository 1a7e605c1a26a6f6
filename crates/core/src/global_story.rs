//! Global Story turn protocol: pure rules for the community voting rounds.
//!
//! A chapter's round is **open** (accepting actions and votes) until it is
//! **resolved** (`votes_tallied` set, winner chosen, next chapter opened).
//! The cooldown window, action validation, and winner selection live here;
//! the atomic enforcement (unique keys, conditional claim updates) lives in
//! the repository layer.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// Rolling window during which a user may submit at most one action per story.
pub const COOLDOWN_HOURS: i64 = 24;

/// Default open-voting lifetime of a chapter. Overridable via configuration
/// (`ROUND_DURATION_HOURS`).
pub const DEFAULT_ROUND_DURATION_HOURS: i64 = 24;

/// Maximum length of a custom-write action, in characters.
pub const MAX_ACTION_TEXT_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Typed failure taxonomy for the turn protocol.
///
/// The validation-class variants are surfaced to the caller as user
/// feedback; `ContinuationGenerationFailed` is retryable and must abort
/// resolution before any state is committed.
#[derive(Debug, thiserror::Error)]
pub enum GlobalStoryError {
    /// The user's 24-hour window has not elapsed. A "not yet" result, not a
    /// fault; carries when the user may act again.
    #[error("Cooldown active until {next_action_at}")]
    CooldownActive { next_action_at: Timestamp },

    /// Users may not vote for their own submission.
    #[error("Voting for your own action is not allowed")]
    SelfVoteForbidden,

    /// Custom text empty or over the length bound, or a bad preset index.
    #[error("Invalid action text: {0}")]
    InvalidActionText(String),

    /// The chapter's voting deadline has passed.
    #[error("Voting has closed for this chapter")]
    VotingClosed,

    /// Resolution attempted on an already-tallied chapter. A no-op, kept as
    /// a variant so concurrent resolvers can observe and exit.
    #[error("Chapter already resolved")]
    AlreadyResolved,

    /// A round cannot resolve with zero submissions; retry after the next
    /// poll once actions exist.
    #[error("No actions submitted for this chapter")]
    NoSubmissions,

    /// The external continuation-generation call failed or timed out.
    #[error("Continuation generation failed: {0}")]
    ContinuationGenerationFailed(String),
}

// ---------------------------------------------------------------------------
// Cooldown
// ---------------------------------------------------------------------------

/// Derived per-user eligibility for the active story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CooldownStatus {
    pub can_act: bool,
    /// When the user becomes eligible again; `None` when already eligible.
    pub next_action_at: Option<Timestamp>,
}

/// Compute cooldown eligibility from the user's most recent action anywhere
/// in the story. Eligibility begins at exactly `window` elapsed; a user with
/// no prior action is always eligible.
pub fn cooldown_status(
    last_action_at: Option<Timestamp>,
    now: Timestamp,
    window: Duration,
) -> CooldownStatus {
    match last_action_at {
        None => CooldownStatus {
            can_act: true,
            next_action_at: None,
        },
        Some(last) => {
            let eligible_at = last + window;
            if now >= eligible_at {
                CooldownStatus {
                    can_act: true,
                    next_action_at: None,
                }
            } else {
                CooldownStatus {
                    can_act: false,
                    next_action_at: Some(eligible_at),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Action validation
// ---------------------------------------------------------------------------

/// How an action was authored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PresetChoice,
    CustomWrite,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::PresetChoice => "preset_choice",
            ActionKind::CustomWrite => "custom_write",
        }
    }
}

/// Resolve and validate the canonical action text for a submission.
///
/// For `PresetChoice` the text is re-derived from the chapter's generated
/// choices by index; client-sent text is never trusted. For `CustomWrite`
/// the text must be non-empty after trimming and at most
/// [`MAX_ACTION_TEXT_CHARS`] characters (rejected, not truncated).
pub fn resolve_action_text(
    kind: ActionKind,
    text: Option<&str>,
    preset_choices: &[String],
    preset_index: Option<usize>,
) -> Result<String, GlobalStoryError> {
    match kind {
        ActionKind::PresetChoice => {
            let index = preset_index.ok_or_else(|| {
                GlobalStoryError::InvalidActionText("preset_index is required".into())
            })?;
            preset_choices.get(index).cloned().ok_or_else(|| {
                GlobalStoryError::InvalidActionText(format!(
                    "preset_index {index} out of range ({} choices)",
                    preset_choices.len()
                ))
            })
        }
        ActionKind::CustomWrite => {
            let text = text.unwrap_or_default().trim();
            if text.is_empty() {
                return Err(GlobalStoryError::InvalidActionText(
                    "action text must not be empty".into(),
                ));
            }
            let chars = text.chars().count();
            if chars > MAX_ACTION_TEXT_CHARS {
                return Err(GlobalStoryError::InvalidActionText(format!(
                    "action text is {chars} characters, maximum is {MAX_ACTION_TEXT_CHARS}"
                )));
            }
            Ok(text.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Winner selection
// ---------------------------------------------------------------------------

/// The fields winner selection needs from a submitted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTally {
    pub id: DbId,
    pub vote_count: i64,
    pub created_at: Timestamp,
}

/// Pick the winning action: highest vote count; ties broken by earliest
/// submission, then lowest id. Returns `None` for an empty round.
pub fn select_winner(actions: &[ActionTally]) -> Option<DbId> {
    actions
        .iter()
        .min_by_key(|a| (-a.vote_count, a.created_at, a.id))
        .map(|a| a.id)
}
