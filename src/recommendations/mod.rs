// src/recommendations/mod.rs
pub mod cache;
pub mod engine;
pub mod keywords;
pub mod source;
pub mod synthetic;

pub use cache::RecommendationCache;
pub use engine::{RecommendationEngine, RecommendationQuery};
pub use source::{HttpListingsSource, ListingsSource};
