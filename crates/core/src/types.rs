//! Primitive aliases shared across the workspace.

/// Row identifier. Every table keys on a PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// An instant in UTC. Stored and computed times all use this alias;
/// calendar-day logic (streaks, quest expiry) derives dates from it.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
