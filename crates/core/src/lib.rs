//! Domain logic for the StxryAI backend.
//!
//! This crate has zero internal deps so the API and repository layer can
//! both build on it. Everything here is pure computation: the persistence
//! collaborator lives in `stxry-db`.

pub mod achievements;
pub mod challenge;
pub mod error;
pub mod global_story;
pub mod leaderboard;
pub mod progression;
pub mod quests;
pub mod roles;
pub mod types;
