use crate::domain::recommendation::{HistoryEntry, PredictionPoint, RecommendationResult};
use anyhow::{ensure, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const CREATED_AT_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Failure body. The JWT layer reports rejected tokens under `msg`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, alias = "msg")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn message(self) -> Option<String> {
        self.error
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommended_date: NaiveDate,
    pub expected_harvest_date: NaiveDate,
    pub predicted_price: f64,
    #[serde(default)]
    pub all_predictions: Option<Vec<PredictionPoint>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub created_at: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub harvest_date: NaiveDate,
    pub predicted_price: f64,
}

impl RecommendResponse {
    pub fn validate_and_into_result(self) -> anyhow::Result<RecommendationResult> {
        note_unusual_price("predicted_price", self.predicted_price);
        if let Some(points) = &self.all_predictions {
            for point in points {
                note_unusual_price("all_predictions.predicted_price", point.predicted_price);
            }
        }

        Ok(RecommendationResult {
            recommended_date: self.recommended_date,
            expected_harvest_date: self.expected_harvest_date,
            predicted_price: self.predicted_price,
            all_predictions: self.all_predictions,
        })
    }
}

impl HistoryItem {
    pub fn validate_and_into_entry(self) -> anyhow::Result<HistoryEntry> {
        let id = self.id.trim().to_string();
        ensure!(!id.is_empty(), "history id must be non-empty");
        note_unusual_price("predicted_price", self.predicted_price);

        let created_at = parse_created_at(&self.created_at)
            .with_context(|| format!("history entry {id} has unreadable created_at"))?;

        Ok(HistoryEntry {
            id,
            created_at,
            location: self.location,
            start_date: self.start_date,
            harvest_date: self.harvest_date,
            predicted_price: self.predicted_price,
        })
    }
}

pub fn parse_created_at(raw: &str) -> anyhow::Result<NaiveDateTime> {
    let raw = raw.trim();
    for format in CREATED_AT_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.naive_utc())
        .with_context(|| format!("unrecognized timestamp: {raw:?}"))
}

/// Logged only; prices pass through unchanged.
fn note_unusual_price(field: &str, price: f64) {
    if !(price.is_finite() && price >= 0.0) {
        tracing::warn!(field, price, "service returned a negative or non-finite price");
    }
}
