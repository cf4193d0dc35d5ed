pub mod error;
pub mod http;

pub use error::{ClientError, ErrorKind, Operation};
pub use http::HttpRecommendationClient;

use crate::domain::{HistoryEntry, Location, RecommendationResult};
use std::str::FromStr;

/// Request/response exchanges with the recommendation service. One attempt
/// per call; callers decide whether to retry.
#[async_trait::async_trait]
pub trait RecommendationApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<String, ClientError>;

    async fn register(&self, username: &str, password: &str) -> Result<(), ClientError>;

    async fn recommend(
        &self,
        location: Location,
        token: &str,
    ) -> Result<RecommendationResult, ClientError>;

    async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Development,
    Production,
}

impl FromStr for Deployment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Deployment::Development),
            "production" | "prod" => Ok(Deployment::Production),
            other => anyhow::bail!("unknown deployment: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub register: String,
    pub recommend: String,
    pub history: String,
}

impl Endpoints {
    /// In production registration goes through the gateway prefix; locally
    /// the service is addressed directly.
    pub fn for_deployment(deployment: Deployment) -> Self {
        let register = match deployment {
            Deployment::Development => "/register",
            Deployment::Production => "/api/register",
        };
        Self {
            login: "/login".to_string(),
            register: register.to_string(),
            recommend: "/api/recommend".to_string(),
            history: "/api/history".to_string(),
        }
    }
}
