pub mod stats;
pub mod utils;

pub mod sentiment;
pub mod summarization;
pub mod zero_shot;
