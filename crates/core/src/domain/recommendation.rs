use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Regions the recommendation engine has weather history for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[default]
    Bengaluru,
    Ramanagara,
    Siddlaghatta,
}

impl Location {
    pub const ALL: [Location; 3] = [
        Location::Bengaluru,
        Location::Ramanagara,
        Location::Siddlaghatta,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Location::Bengaluru => "Bengaluru",
            Location::Ramanagara => "Ramanagara",
            Location::Siddlaghatta => "Siddlaghatta",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Location::ALL
            .into_iter()
            .find(|loc| loc.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unsupported location {wanted:?} (expected one of: Bengaluru, Ramanagara, Siddlaghatta)"
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub start_date: NaiveDate,
    pub harvest_date: NaiveDate,
    pub predicted_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommended_date: NaiveDate,
    pub expected_harvest_date: NaiveDate,
    pub predicted_price: f64,
    pub all_predictions: Option<Vec<PredictionPoint>>,
}

/// One past recommendation, as stored by the service for the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub created_at: NaiveDateTime,
    pub location: String,
    pub start_date: NaiveDate,
    pub harvest_date: NaiveDate,
    pub predicted_price: f64,
}
