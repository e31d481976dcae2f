//! HTTP client for the Pennyflow backend API.
//!
//! This is the single entry point for everything that crosses the network:
//! it attaches the bearer token when one is installed, serializes JSON
//! bodies, and normalizes every failure into the uniform gateway error shape
//! the rest of the client consumes. No other crate touches raw transport
//! details.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use pennyflow_core::analytics::{
    AnalyticsGateway, AnalyticsSummary, CategoryData, MonthlyComparison, Period, TrendData,
};
use pennyflow_core::errors::Result as CoreResult;
use pennyflow_core::session::{AuthGateway, AuthSession, AuthStatus, User};
use pennyflow_core::transactions::{
    Category, NewTransaction, ParsedTransaction, Transaction, TransactionFilters,
    TransactionGateway, TransactionUpdate,
};

use crate::error::{ApiError, Result};
use crate::types::{ApiErrorResponse, LoginRequest, ParseRequest, RegisterRequest};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default base URL for a local backend.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// HTTP client for the Pennyflow API.
///
/// Cloning is cheap; clones share the underlying connection pool and the
/// bearer token slot. The session service is the only writer of the token
/// (via [`AuthGateway::set_bearer_token`]).
///
/// # Example
///
/// ```ignore
/// let client = ApiClient::new("http://localhost:3001/api")?;
/// client.set_token(Some("bearer-token"));
/// let me = client.me().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    bearer: Arc<RwLock<Option<HeaderValue>>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the backend API, including the `/api`
    ///   prefix (e.g. "http://localhost:3001/api")
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: Arc::new(RwLock::new(None)),
        })
    }

    /// Install or clear the bearer token attached to subsequent requests.
    pub fn set_token(&self, token: Option<&str>) {
        let value = match token {
            Some(token) => match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => Some(value),
                Err(e) => {
                    error!("Invalid bearer token format, clearing credentials: {}", e);
                    None
                }
            },
            None => None,
        };
        if let Ok(mut slot) = self.bearer.write() {
            *slot = value;
        }
    }

    /// Create default headers for API requests, including the bearer token
    /// when one is installed.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(auth) = self.bearer.read().ok().and_then(|slot| slot.clone()) {
            headers.insert(AUTHORIZATION, auth);
        }
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Normalize a non-success response into the uniform error shape.
    ///
    /// The structured error body is preferred; when the body is not
    /// parseable JSON the raw status text is used instead.
    fn normalize_error(status: reqwest::StatusCode, body: &str) -> ApiError {
        if let Some(message) = serde_json::from_str::<ApiErrorResponse>(body)
            .ok()
            .and_then(ApiErrorResponse::into_message)
        {
            return ApiError::api(status.as_u16(), message);
        }
        let fallback = match status.canonical_reason() {
            Some(reason) => format!("HTTP {}: {}", status.as_u16(), reason),
            None => format!("HTTP {}", status.as_u16()),
        };
        ApiError::api(status.as_u16(), fallback)
    }

    /// Parse an HTTP response, normalizing error statuses.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::normalize_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to decode response body: {} - {}", e, body);
            ApiError::Json(e)
        })
    }

    /// Check a response for success, discarding any body.
    async fn expect_success(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::normalize_error(status, &body))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("[Api] GET {}", url);
        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        debug!("[Api] GET {} ({} params)", url, query.len());
        let response = self
            .client
            .get(&url)
            .query(query)
            .headers(self.headers())
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        debug!("[Api] POST {}", url);
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn post_unit(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        debug!("[Api] POST {}", url);
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        debug!("[Api] PUT {}", url);
        let response = self
            .client
            .put(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        debug!("[Api] DELETE {}", url);
        let response = self
            .client
            .delete(&url)
            .headers(self.headers())
            .send()
            .await?;
        Self::expect_success(response).await
    }

    /// Probe the service health endpoint, which lives on the API origin
    /// above the `/api` prefix.
    pub async fn health_check(&self) -> Result<serde_json::Value> {
        let url = format!("{}/health", self.base_url.trim_end_matches("/api"));
        debug!("[Api] GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::parse_response(response).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway Trait Implementations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, email: &str, password: &str) -> CoreResult<AuthSession> {
        let session = self
            .post("/auth/login", &LoginRequest { email, password })
            .await?;
        Ok(session)
    }

    async fn register(&self, email: &str, password: &str, name: &str) -> CoreResult<AuthSession> {
        let session = self
            .post(
                "/auth/register",
                &RegisterRequest {
                    email,
                    password,
                    name,
                },
            )
            .await?;
        Ok(session)
    }

    async fn me(&self) -> CoreResult<User> {
        let user = self.get("/auth/me").await?;
        Ok(user)
    }

    async fn logout(&self) -> CoreResult<()> {
        self.post_unit("/auth/logout").await?;
        Ok(())
    }

    async fn auth_status(&self) -> CoreResult<AuthStatus> {
        let status = self.get("/auth/status").await?;
        Ok(status)
    }

    fn set_bearer_token(&self, token: Option<&str>) {
        self.set_token(token)
    }
}

#[async_trait]
impl TransactionGateway for ApiClient {
    async fn list(&self, filters: &TransactionFilters) -> CoreResult<Vec<Transaction>> {
        let transactions = self
            .get_with_query("/transactions", &filters.to_query())
            .await?;
        Ok(transactions)
    }

    async fn parse(&self, input: &str) -> CoreResult<ParsedTransaction> {
        let parsed = self
            .post("/transactions/parse", &ParseRequest { input })
            .await?;
        Ok(parsed)
    }

    async fn create(&self, new: &NewTransaction) -> CoreResult<Transaction> {
        let created = self.post("/transactions", new).await?;
        Ok(created)
    }

    async fn update(&self, id: &str, update: &TransactionUpdate) -> CoreResult<Transaction> {
        let updated = self.put(&format!("/transactions/{}", id), update).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        ApiClient::delete(self, &format!("/transactions/{}", id)).await?;
        Ok(())
    }

    async fn categories(&self) -> CoreResult<Vec<Category>> {
        let categories = self.get("/transactions/categories").await?;
        Ok(categories)
    }
}

#[async_trait]
impl AnalyticsGateway for ApiClient {
    async fn summary(&self) -> CoreResult<AnalyticsSummary> {
        let summary = self.get("/analytics/summary").await?;
        Ok(summary)
    }

    async fn category_breakdown(&self, period: Period) -> CoreResult<Vec<CategoryData>> {
        let breakdown = self
            .get_with_query(
                "/analytics/categories",
                &[("period", period.as_str().to_string())],
            )
            .await?;
        Ok(breakdown)
    }

    async fn trends(&self, days: u32) -> CoreResult<Vec<TrendData>> {
        let trends = self
            .get_with_query("/analytics/trends", &[("days", days.to_string())])
            .await?;
        Ok(trends)
    }

    async fn monthly_comparison(&self) -> CoreResult<Vec<MonthlyComparison>> {
        let comparison = self.get("/analytics/monthly-comparison").await?;
        Ok(comparison)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new(DEFAULT_API_URL);
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_url_normalization() {
        let client = ApiClient::new("http://localhost:3001/api/").unwrap();
        assert_eq!(client.base_url, "http://localhost:3001/api");
    }

    #[test]
    fn bearer_header_is_installed_and_cleared() {
        let client = ApiClient::new(DEFAULT_API_URL).unwrap();

        client.set_token(Some("tok-1"));
        let headers = client.headers();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok-1");

        client.set_token(None);
        assert!(client.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn invalid_token_clears_credentials_instead_of_panicking() {
        let client = ApiClient::new(DEFAULT_API_URL).unwrap();
        client.set_token(Some("tok-1"));
        client.set_token(Some("bad\ntoken"));
        assert!(client.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn structured_error_body_message_is_surfaced() {
        let err = ApiClient::normalize_error(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"error":"Transaction not found"}"#,
        );
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Transaction not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn non_json_error_body_falls_back_to_status_text() {
        let err = ApiClient::normalize_error(reqwest::StatusCode::BAD_GATEWAY, "<html>oops</html>");
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "HTTP 502: Bad Gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn error_body_prefers_error_field_over_message() {
        let body: ApiErrorResponse =
            serde_json::from_str(r#"{"error":"Invalid credentials","message":"ignored"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid credentials"));

        let body: ApiErrorResponse = serde_json::from_str(r#"{"message":"fallback"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("fallback"));

        let body: ApiErrorResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.into_message().is_none());
    }
}
