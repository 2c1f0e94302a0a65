//! HTTP client implementation for the Fitbit Web API.
//!
//! This module provides a reqwest-based implementation of the [`FitbitClient`](crate::FitbitClient) trait.
//! Every request carries the current OAuth2 bearer token; an expired token is
//! exchanged for a new one before the request is sent.

use crate::auth::{ClientCredentials, NoopTokenStore, RefreshResponse, TokenSet, TokenStore};
use crate::config::Config;
use crate::observability;
use crate::utils::{api_date, unix_now};
use crate::{DailyActivity, DetailLevel, FitbitClient, FitbitError, IntradayMetric, IntradaySeries};
use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Client for the Fitbit Web API using reqwest.
#[derive(Clone)]
pub struct ReqwestFitbitClient {
    base_url: String,
    credentials: ClientCredentials,
    tokens: Arc<Mutex<TokenSet>>,
    token_store: Arc<dyn TokenStore>,
    client: reqwest::Client,
}

impl fmt::Debug for ReqwestFitbitClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestFitbitClient")
            .field("base_url", &self.base_url)
            .field("client_id", &self.credentials.client_id)
            .finish_non_exhaustive()
    }
}

impl ReqwestFitbitClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API (e.g., "https://api.fitbit.com")
    /// * `credentials` - Application client id and secret, used for token refresh
    /// * `tokens` - The current access / refresh token pair
    pub fn new(
        base_url: &str,
        credentials: ClientCredentials,
        tokens: TokenSet,
    ) -> Result<Self, FitbitError> {
        Self::with_timeout(base_url, credentials, tokens, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: &str,
        credentials: ClientCredentials,
        tokens: TokenSet,
        timeout: Duration,
    ) -> Result<Self, FitbitError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FitbitError::Config(format!("building http client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            tokens: Arc::new(Mutex::new(tokens)),
            token_store: Arc::new(NoopTokenStore),
            client,
        })
    }

    pub fn from_config(cfg: &Config, tokens: TokenSet) -> Result<Self, FitbitError> {
        Self::with_timeout(&cfg.base_url, cfg.credentials(), tokens, cfg.timeout)
    }

    /// Install the capability that persists refreshed tokens.
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = store;
        self
    }

    /// Exchange the refresh token for a new token pair regardless of expiry.
    pub async fn refresh_tokens(&self) -> Result<(), FitbitError> {
        let mut tokens = self.tokens.lock().await;
        self.refresh_locked(&mut tokens).await
    }

    /// Current access token, refreshing it first when expired.
    async fn access_token(&self) -> Result<SecretString, FitbitError> {
        let mut tokens = self.tokens.lock().await;
        if tokens.is_expired(unix_now()) {
            tracing::debug!("access token expired, refreshing");
            self.refresh_locked(&mut tokens).await?;
        }
        Ok(tokens.access_token.clone())
    }

    async fn refresh_locked(&self, tokens: &mut TokenSet) -> Result<(), FitbitError> {
        let url = format!("{}/oauth2/token", self.base_url);
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.credentials.client_id.as_str()),
            ("refresh_token", tokens.refresh_token.expose_secret()),
        ];
        let request = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.expose_secret()),
            )
            .form(&form);

        let result = self
            .execute_json::<RefreshResponse>("oauth2/token", "token refresh".into(), request)
            .await;
        observability::record_token_refresh(result.is_ok());
        let resp = result.map_err(|e| match e {
            FitbitError::Api { status, body } if (400..500).contains(&status) => {
                FitbitError::Auth(format!("token refresh rejected ({status}): {body}"))
            }
            FitbitError::NotFound(body) => {
                FitbitError::Auth(format!("token endpoint not found: {body}"))
            }
            other => other,
        })?;

        // The old refresh token is spent by now; keep the new pair even if saving fails.
        *tokens = TokenSet::from_refresh(resp, unix_now());
        tracing::info!("refreshed fitbit access token");
        self.token_store.save(tokens).await
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str, token: &SecretString) -> reqwest::RequestBuilder {
        self.client.get(url).bearer_auth(token.expose_secret())
    }

    /// Execute a request and decode a JSON response into `T`.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &'static str,
        what: String,
        request: reqwest::RequestBuilder,
    ) -> Result<T, FitbitError> {
        let resp = request.send().await?;
        observability::record_request(endpoint, resp.status().as_u16());
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|source| FitbitError::Decode { what, source })
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> FitbitError {
        let status = resp.status().as_u16();
        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            404 => FitbitError::NotFound(body_snippet),
            401 | 403 => FitbitError::Auth(body_snippet),
            429 => FitbitError::RateLimited {
                retry_after,
                body: body_snippet,
            },
            _ => FitbitError::from_status(status, body_snippet),
        }
    }
}

#[async_trait]
impl FitbitClient for ReqwestFitbitClient {
    async fn get_daily_activity(&self, date: NaiveDate) -> Result<DailyActivity, FitbitError> {
        let day = api_date(date);
        let url = format!("{}/1/user/-/activities/date/{}.json", self.base_url, day);
        let token = self.access_token().await?;
        tracing::debug!(date = %day, "fetching daily activity");
        self.execute_json(
            "activities/date",
            format!("daily activity for {day}"),
            self.get_request(&url, &token),
        )
        .await
    }

    async fn get_intraday_series(
        &self,
        metric: IntradayMetric,
        date: NaiveDate,
        detail: DetailLevel,
    ) -> Result<IntradaySeries, FitbitError> {
        let day = api_date(date);
        let url = format!(
            "{}/1/user/-/activities/{}/date/{}/1d/{}.json",
            self.base_url,
            metric.as_str(),
            day,
            detail.as_str()
        );
        let token = self.access_token().await?;
        tracing::debug!(
            date = %day,
            metric = %metric,
            detail = %detail,
            "fetching intraday series"
        );
        let what = format!("{metric} intraday series for {day}");
        let json: serde_json::Value = self
            .execute_json("activities/intraday", what.clone(), self.get_request(&url, &token))
            .await?;
        let key = format!("activities-{}-intraday", metric.as_str());
        let series = json
            .get(&key)
            .cloned()
            .ok_or(FitbitError::MissingField(key))?;
        serde_json::from_value(series).map_err(|source| FitbitError::Decode { what, source })
    }
}
