//! OAuth2 token handling: the in-memory token set, the refresh response and
//! the persistence capability that receives refreshed tokens.

use crate::FitbitError;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Client id / secret of the registered Fitbit application.
#[derive(Clone, Debug)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Access and refresh token pair with its absolute expiry (unix seconds).
#[derive(Clone, Debug)]
pub struct TokenSet {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: Option<f64>,
}

impl TokenSet {
    /// A token without a known expiry is treated as expired.
    pub fn is_expired(&self, now_unix: f64) -> bool {
        match self.expires_at {
            Some(at) => now_unix >= at,
            None => true,
        }
    }

    pub(crate) fn from_refresh(resp: RefreshResponse, now_unix: f64) -> Self {
        Self {
            access_token: SecretString::new(resp.access_token.into()),
            refresh_token: SecretString::new(resp.refresh_token.into()),
            expires_at: Some(now_unix + resp.expires_in),
        }
    }
}

/// Body of a successful `POST /oauth2/token`.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(deserialize_with = "deserialize_f64_lenient")]
    pub expires_in: f64,
}

/// On-disk shape of a token file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTokens {
    access_token: String,
    refresh_token: String,
    #[serde(default, deserialize_with = "deserialize_opt_f64_lenient")]
    expires_at: Option<f64>,
}

fn deserialize_f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    deserialize_opt_f64_lenient(deserializer)?
        .ok_or_else(|| D::Error::custom("expected a number, got null"))
}

/// Token files written by the authorization helper store `expires_at` as a
/// string; accept numbers, numeric strings and null.
fn deserialize_opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid number {s:?}: {e}"))),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Capability invoked after every successful token refresh.
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    async fn save(&self, tokens: &TokenSet) -> Result<(), FitbitError>;
}

/// Token store that discards refreshed tokens.
#[derive(Clone, Debug, Default)]
pub struct NoopTokenStore;

#[async_trait]
impl TokenStore for NoopTokenStore {
    async fn save(&self, _tokens: &TokenSet) -> Result<(), FitbitError> {
        Ok(())
    }
}

/// Keeps tokens in a JSON file: `{"access_token", "refresh_token", "expires_at"}`.
#[derive(Clone, Debug)]
pub struct JsonFileTokenStore {
    path: PathBuf,
}

impl JsonFileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<TokenSet, FitbitError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            FitbitError::TokenStore(format!("reading {}: {e}", self.path.display()))
        })?;
        let stored: StoredTokens =
            serde_json::from_str(&raw).map_err(|source| FitbitError::Decode {
                what: format!("token file {}", self.path.display()),
                source,
            })?;
        Ok(TokenSet {
            access_token: SecretString::new(stored.access_token.into()),
            refresh_token: SecretString::new(stored.refresh_token.into()),
            expires_at: stored.expires_at,
        })
    }
}

#[async_trait]
impl TokenStore for JsonFileTokenStore {
    async fn save(&self, tokens: &TokenSet) -> Result<(), FitbitError> {
        let stored = StoredTokens {
            access_token: tokens.access_token.expose_secret().to_string(),
            refresh_token: tokens.refresh_token.expose_secret().to_string(),
            expires_at: tokens.expires_at,
        };
        let body = serde_json::to_vec_pretty(&stored).map_err(|source| FitbitError::Decode {
            what: "token set".into(),
            source,
        })?;
        tokio::fs::write(&self.path, body).await.map_err(|e| {
            FitbitError::TokenStore(format!("writing {}: {e}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), "persisted refreshed tokens");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(expires_at: Option<f64>) -> TokenSet {
        TokenSet {
            access_token: SecretString::new("acc".into()),
            refresh_token: SecretString::new("ref".into()),
            expires_at,
        }
    }

    #[test]
    fn expiry_checks() {
        assert!(tokens(None).is_expired(0.0));
        assert!(tokens(Some(100.0)).is_expired(100.0));
        assert!(!tokens(Some(100.5)).is_expired(100.0));
    }

    #[test]
    fn refresh_response_sets_absolute_expiry() {
        let resp: RefreshResponse = serde_json::from_value(serde_json::json!({
            "access_token": "a2",
            "refresh_token": "r2",
            "expires_in": 28800,
            "token_type": "Bearer",
            "user_id": "ABC"
        }))
        .expect("refresh response");
        let set = TokenSet::from_refresh(resp, 1_000.0);
        assert_eq!(set.expires_at, Some(29_800.0));
        assert_eq!(set.access_token.expose_secret(), "a2");
    }

    #[tokio::test]
    async fn json_file_store_accepts_string_expiry_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tokens.json");
        tokio::fs::write(
            &path,
            r#"{"access_token": "a", "refresh_token": "r", "expires_at": "1591749405.1234567"}"#,
        )
        .await
        .expect("write");

        let store = JsonFileTokenStore::new(&path);
        let loaded = store.load().await.expect("load");
        assert_eq!(loaded.expires_at, Some(1591749405.1234567));

        store.save(&tokens(Some(42.0))).await.expect("save");
        let reloaded = store.load().await.expect("reload");
        assert_eq!(reloaded.access_token.expose_secret(), "acc");
        assert_eq!(reloaded.expires_at, Some(42.0));
    }

    #[tokio::test]
    async fn missing_token_file_is_a_store_error() {
        let store = JsonFileTokenStore::new("/nonexistent/dir/tokens.json");
        let err = store.load().await.expect_err("should fail");
        assert!(matches!(err, FitbitError::TokenStore(_)));
    }
}
