// Similarity-ranking core: extraction, embedding pacing, scoring, keyword
// overlap, and the batch pipeline that ties them together.

pub mod extract;
pub mod handlers;
pub mod keywords;
pub mod pacer;
pub mod pipeline;
pub mod similarity;
