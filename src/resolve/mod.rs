pub mod candidate;
pub mod extract;
pub mod input;
pub mod tracklist;
