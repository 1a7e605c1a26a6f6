//! Orchestration between the pure domain logic in `stxry-core` and the
//! repositories in `stxry-db`. Handlers and background tasks call in here
//! rather than sequencing compute-then-commit themselves.

pub mod progression;
pub mod resolution;
