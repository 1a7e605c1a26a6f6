pub mod global_story;
pub mod progress;
