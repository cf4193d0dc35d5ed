pub mod contract;
pub mod recommendation;

pub use recommendation::{HistoryEntry, Location, PredictionPoint, RecommendationResult};
