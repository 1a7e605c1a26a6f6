pub mod action_repo;
pub mod progress_repo;
pub mod resolution_repo;
pub mod story_repo;
pub mod user_repo;
pub mod vote_repo;

pub use action_repo::ActionRepo;
pub use progress_repo::ProgressRepo;
pub use resolution_repo::{ResolutionRepo, ResolvedRound};
pub use story_repo::StoryRepo;
pub use user_repo::UserRepo;
pub use vote_repo::VoteRepo;
