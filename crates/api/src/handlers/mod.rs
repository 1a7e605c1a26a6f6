pub mod global_story;
pub mod progression;
