pub mod corpus;
pub mod inflection;
pub mod normalizer;
pub mod ranker;
pub mod recommendations;
pub mod stop_words;
pub mod vectorizer;

pub use recommendations::{RecommendOptions, RecommendationService, RecommendationSettings};
