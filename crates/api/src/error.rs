use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stxry_core::error::CoreError;
use stxry_core::global_story::GlobalStoryError;
use stxry_db::error::StoreError;
use stxry_narrative::NarrativeError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`GlobalStoryError`] for turn
/// protocol rejections, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `stxry_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A turn protocol rejection (cooldown, self-vote, closed round, ...).
    #[error(transparent)]
    Protocol(#[from] GlobalStoryError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A failure from the narrative generation service.
    #[error("Narrative service error: {0}")]
    Narrative(#[from] NarrativeError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Db(e) => AppError::Database(e),
            StoreError::Protocol(e) => AppError::Protocol(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Turn protocol rejections ---
            AppError::Protocol(protocol) => {
                // CooldownActive carries the eligibility timestamp, which
                // clients need to show a countdown, so it gets its own body.
                if let GlobalStoryError::CooldownActive { next_action_at } = protocol {
                    let body = json!({
                        "error": protocol.to_string(),
                        "code": "COOLDOWN_ACTIVE",
                        "next_action_at": next_action_at,
                    });
                    return (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
                }
                classify_protocol_error(protocol)
            }

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Narrative service errors ---
            AppError::Narrative(err) => {
                tracing::error!(error = %err, "Narrative service error");
                (
                    StatusCode::BAD_GATEWAY,
                    "NARRATIVE_UNAVAILABLE",
                    "Continuation generation failed".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a [`GlobalStoryError`] to an HTTP status, error code, and message.
fn classify_protocol_error(err: &GlobalStoryError) -> (StatusCode, &'static str, String) {
    match err {
        GlobalStoryError::CooldownActive { .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            "COOLDOWN_ACTIVE",
            err.to_string(),
        ),
        GlobalStoryError::SelfVoteForbidden => {
            (StatusCode::FORBIDDEN, "SELF_VOTE_FORBIDDEN", err.to_string())
        }
        GlobalStoryError::InvalidActionText(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_ACTION_TEXT", err.to_string())
        }
        GlobalStoryError::VotingClosed => {
            (StatusCode::CONFLICT, "VOTING_CLOSED", err.to_string())
        }
        GlobalStoryError::AlreadyResolved => {
            (StatusCode::CONFLICT, "ALREADY_RESOLVED", err.to_string())
        }
        GlobalStoryError::NoSubmissions => {
            (StatusCode::CONFLICT, "NO_SUBMISSIONS", err.to_string())
        }
        GlobalStoryError::ContinuationGenerationFailed(_) => {
            tracing::error!(error = %err, "Continuation generation failed");
            (
                StatusCode::BAD_GATEWAY,
                "NARRATIVE_UNAVAILABLE",
                "Continuation generation failed".to_string(),
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
