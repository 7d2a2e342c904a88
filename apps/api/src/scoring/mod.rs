pub mod engine;
pub mod keywords;

pub use engine::{RecommendationStatus, ResumeScorer, ScoreResult};
pub use keywords::KeywordDictionary;
