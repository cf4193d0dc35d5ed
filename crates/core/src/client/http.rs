use crate::client::error::{ClientError, ErrorKind, Operation};
use crate::client::{Endpoints, RecommendationApi};
use crate::config::Settings;
use crate::domain::contract::{
    Credentials, ErrorBody, HistoryItem, LoginResponse, RecommendRequest, RecommendResponse,
};
use crate::domain::{HistoryEntry, Location, RecommendationResult};
use anyhow::Context;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct HttpRecommendationClient {
    http: reqwest::Client,
    base_url: String,
    endpoints: Endpoints,
}

impl HttpRecommendationClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            settings.api_base_url.clone(),
            settings.endpoints(),
            settings.http_timeout,
        )
    }

    pub fn new(
        base_url: impl Into<String>,
        endpoints: Endpoints,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build recommendation http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            endpoints,
        })
    }

    fn url(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Sends the request once and returns the body of a successful response.
    async fn exchange(
        &self,
        operation: Operation,
        req: reqwest::RequestBuilder,
    ) -> Result<String, ClientError> {
        let t0 = Instant::now();
        let res = req.send().await.map_err(|err| {
            tracing::warn!(operation = operation.as_str(), error = %err, "no response from service");
            ClientError::network(operation)
        })?;

        let status = res.status();
        let text = res.text().await.map_err(|err| {
            tracing::warn!(operation = operation.as_str(), %status, error = %err, "failed to read response body");
            ClientError::network(operation)
        })?;

        tracing::debug!(
            operation = operation.as_str(),
            %status,
            elapsed_ms = t0.elapsed().as_millis(),
            "service exchange"
        );

        if status.is_success() {
            return Ok(text);
        }

        let server_message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::message);
        tracing::warn!(
            operation = operation.as_str(),
            %status,
            server_message = server_message.as_deref().unwrap_or(""),
            "service call failed"
        );
        Err(ClientError::new(classify(status), operation, server_message))
    }

    fn decode<T: DeserializeOwned>(operation: Operation, text: &str) -> Result<T, ClientError> {
        serde_json::from_str::<T>(text).map_err(|err| malformed(operation, &err))
    }
}

fn classify(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::UNPROCESSABLE_ENTITY => {
            ErrorKind::Auth
        }
        s if s.is_client_error() => ErrorKind::Validation,
        _ => ErrorKind::Server,
    }
}

fn malformed(operation: Operation, detail: &dyn std::fmt::Display) -> ClientError {
    tracing::warn!(operation = operation.as_str(), error = %detail, "malformed service response");
    ClientError::new(ErrorKind::Server, operation, None)
}

#[async_trait::async_trait]
impl RecommendationApi for HttpRecommendationClient {
    async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let req = self.http.post(self.url(&self.endpoints.login)).json(&body);
        let text = self.exchange(Operation::Login, req).await?;

        let parsed = Self::decode::<LoginResponse>(Operation::Login, &text)?;
        let token = parsed.token.trim().to_string();
        if token.is_empty() {
            return Err(malformed(Operation::Login, &"empty token"));
        }
        Ok(token)
    }

    async fn register(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let req = self.http.post(self.url(&self.endpoints.register)).json(&body);
        self.exchange(Operation::Register, req).await?;
        Ok(())
    }

    async fn recommend(
        &self,
        location: Location,
        token: &str,
    ) -> Result<RecommendationResult, ClientError> {
        let body = RecommendRequest {
            location: location.as_str().to_string(),
        };
        let req = self
            .http
            .post(self.url(&self.endpoints.recommend))
            .bearer_auth(token)
            .json(&body);
        let text = self.exchange(Operation::Recommend, req).await?;

        Self::decode::<RecommendResponse>(Operation::Recommend, &text)?
            .validate_and_into_result()
            .map_err(|err| malformed(Operation::Recommend, &format!("{err:#}")))
    }

    async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, ClientError> {
        let req = self
            .http
            .get(self.url(&self.endpoints.history))
            .bearer_auth(token);
        let text = self.exchange(Operation::History, req).await?;

        let items = Self::decode::<Vec<HistoryItem>>(Operation::History, &text)?;
        items
            .into_iter()
            .map(HistoryItem::validate_and_into_entry)
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(|err| malformed(Operation::History, &format!("{err:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Deployment;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    const TOKEN: &str = "tok-1";

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String, deployment: Deployment) -> HttpRecommendationClient {
        HttpRecommendationClient::new(
            base_url,
            Endpoints::for_deployment(deployment),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {TOKEN}"))
    }

    fn service() -> Router {
        Router::new()
            .route(
                "/login",
                post(|Json(body): Json<Value>| async move {
                    if body["username"] == "farmer" && body["password"] == "silk" {
                        (StatusCode::OK, Json(json!({"token": TOKEN, "username": "farmer"})))
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid credentials"})))
                    }
                }),
            )
            .route(
                "/register",
                post(|Json(body): Json<Value>| async move {
                    if body["username"] == "taken" {
                        (StatusCode::BAD_REQUEST, Json(json!({"error": "Username already exists"})))
                    } else {
                        (StatusCode::CREATED, Json(json!({"message": "User registered successfully"})))
                    }
                }),
            )
            .route(
                "/api/recommend",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    if !authorized(&headers) {
                        return (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"msg": "Missing Authorization Header"})),
                        );
                    }
                    if body["location"] != "Bengaluru" {
                        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
                    }
                    (
                        StatusCode::OK,
                        Json(json!({
                            "recommended_date": "2024-03-01",
                            "expected_harvest_date": "2024-03-29",
                            "predicted_price": 450,
                            "all_predictions": [
                                {"start_date": "2024-03-03", "harvest_date": "2024-03-31", "predicted_price": 430},
                                {"start_date": "2024-03-01", "harvest_date": "2024-03-29", "predicted_price": 450}
                            ]
                        })),
                    )
                }),
            )
            .route(
                "/api/history",
                get(|headers: HeaderMap| async move {
                    if !authorized(&headers) {
                        return (StatusCode::UNAUTHORIZED, Json(json!({"msg": "Token has expired"})));
                    }
                    (
                        StatusCode::OK,
                        Json(json!([
                            {"id": "b", "created_at": "2024-03-02 10:00", "location": "Ramanagara",
                             "start_date": "2024-03-03", "harvest_date": "2024-03-28", "predicted_price": 470.5},
                            {"id": "a", "created_at": "2024-03-01 09:00", "location": "Bengaluru",
                             "start_date": "2024-03-02", "harvest_date": "2024-03-27", "predicted_price": 450}
                        ])),
                    )
                }),
            )
    }

    #[test]
    fn classifies_statuses() {
        assert_eq!(classify(StatusCode::UNAUTHORIZED), ErrorKind::Auth);
        assert_eq!(classify(StatusCode::UNPROCESSABLE_ENTITY), ErrorKind::Auth);
        assert_eq!(classify(StatusCode::BAD_REQUEST), ErrorKind::Validation);
        assert_eq!(classify(StatusCode::CONFLICT), ErrorKind::Validation);
        assert_eq!(classify(StatusCode::BAD_GATEWAY), ErrorKind::Server);
    }

    #[tokio::test]
    async fn login_returns_token_or_auth_error() {
        let c = client(serve(service()).await, Deployment::Development);
        assert_eq!(c.login("farmer", "silk").await.unwrap(), TOKEN);

        let err = c.login("farmer", "wrong").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn register_surfaces_duplicate_username() {
        let c = client(serve(service()).await, Deployment::Development);
        c.register("new_farmer", "pw").await.unwrap();

        let err = c.register("taken", "pw").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Username already exists");
    }

    #[tokio::test]
    async fn register_uses_gateway_path_in_production() {
        let app = Router::new().route(
            "/api/register",
            post(|| async { (StatusCode::CREATED, Json(json!({}))) }),
        );
        let c = client(serve(app).await, Deployment::Production);
        c.register("farmer", "silk").await.unwrap();
    }

    #[tokio::test]
    async fn recommend_sends_bearer_and_decodes_result() {
        let c = client(serve(service()).await, Deployment::Development);
        let result = c.recommend(Location::Bengaluru, TOKEN).await.unwrap();
        assert_eq!(result.recommended_date.to_string(), "2024-03-01");
        assert_eq!(result.expected_harvest_date.to_string(), "2024-03-29");
        assert_eq!(result.predicted_price, 450.0);
        assert_eq!(result.all_predictions.map(|p| p.len()), Some(2));
    }

    #[tokio::test]
    async fn recommend_with_bad_token_is_auth_error_with_server_message() {
        let c = client(serve(service()).await, Deployment::Development);
        let err = c.recommend(Location::Bengaluru, "stale").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.to_string(), "Missing Authorization Header");
    }

    #[tokio::test]
    async fn server_failure_without_message_uses_fallback() {
        let c = client(serve(service()).await, Deployment::Development);
        let err = c.recommend(Location::Ramanagara, TOKEN).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(
            err.to_string(),
            "Failed to fetch recommendations. Ensure backend is running."
        );
    }

    #[tokio::test]
    async fn history_preserves_service_order() {
        let c = client(serve(service()).await, Deployment::Development);
        let entries = c.history(TOKEN).await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(entries[1].location, "Bengaluru");
    }

    #[tokio::test]
    async fn unreachable_service_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let c = client(format!("http://{addr}"), Deployment::Development);
        let err = c.history(TOKEN).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.to_string(), "Failed to fetch history");
    }

    #[tokio::test]
    async fn malformed_success_body_is_server_error() {
        let app = Router::new().route("/api/history", get(|| async { "not json" }));
        let c = client(serve(app).await, Deployment::Development);
        let err = c.history(TOKEN).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
    }
}
