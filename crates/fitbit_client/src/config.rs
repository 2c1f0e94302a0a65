use crate::FitbitError;
use crate::auth::ClientCredentials;
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.fitbit.com";

#[derive(Clone, Debug)]
pub struct Config {
    pub client_id: String,
    pub client_secret: SecretString,
    pub base_url: String,
    pub token_file: PathBuf,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, FitbitError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function, so tests don't touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, FitbitError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let client_id = get("FITBIT_CLIENT_ID")
            .ok_or_else(|| FitbitError::Config("FITBIT_CLIENT_ID missing".into()))?;
        let client_secret = get("FITBIT_CLIENT_SECRET")
            .ok_or_else(|| FitbitError::Config("FITBIT_CLIENT_SECRET missing".into()))?;
        let base_url = get("FITBIT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let token_file = get("FITBIT_TOKEN_FILE").unwrap_or_else(|| "tokens.json".into());
        let timeout = match get("FITBIT_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    FitbitError::Config(format!("FITBIT_HTTP_TIMEOUT_SECS {raw:?}: {e}"))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(30),
        };
        Ok(Self {
            client_id,
            client_secret: SecretString::new(client_secret.into()),
            base_url,
            token_file: PathBuf::from(token_file),
            timeout,
        })
    }

    pub fn credentials(&self) -> ClientCredentials {
        ClientCredentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_missing_client_secret() {
        let get = |k: &str| match k {
            "FITBIT_CLIENT_ID" => Some("23ABC".into()),
            _ => None,
        };
        let res = Config::from_env_with(get);
        assert!(matches!(res, Err(FitbitError::Config(_))));
    }

    #[test]
    fn from_env_reads_values() {
        let get = |k: &str| match k {
            "FITBIT_CLIENT_ID" => Some("23ABC".into()),
            "FITBIT_CLIENT_SECRET" => Some("sekrit".into()),
            "FITBIT_BASE_URL" => Some("http://localhost".into()),
            "FITBIT_HTTP_TIMEOUT_SECS" => Some("5".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.client_id, "23ABC");
        assert_eq!(cfg.base_url, "http://localhost");
        assert_eq!(cfg.token_file, PathBuf::from("tokens.json"));
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_env_rejects_bad_timeout() {
        let get = |k: &str| match k {
            "FITBIT_CLIENT_ID" => Some("23ABC".into()),
            "FITBIT_CLIENT_SECRET" => Some("sekrit".into()),
            "FITBIT_HTTP_TIMEOUT_SECS" => Some("soon".into()),
            _ => None,
        };
        assert!(Config::from_env_with(get).is_err());
    }
}
