use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};

const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";
const DEFAULT_CLIENT_SECRET_FILE: &str = "client_secret.json";
const DEFAULT_TOKEN_FILE: &str = "token.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    pub youtube_client_secret_file: PathBuf,
    pub youtube_token_file: PathBuf,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset Spotify credentials are
    /// left empty and reported by [`Config::get_missing_config`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let spotify_client_id = lookup("SPOTIFY_CLIENT_ID").unwrap_or_default();
        let spotify_client_secret = lookup("SPOTIFY_CLIENT_SECRET").unwrap_or_default();

        let spotify_redirect_uri =
            lookup("SPOTIFY_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());

        let youtube_client_secret_file = lookup("YOUTUBE_CLIENT_SECRET_FILE")
            .unwrap_or_else(|| DEFAULT_CLIENT_SECRET_FILE.to_string())
            .into();

        let youtube_token_file = lookup("YOUTUBE_TOKEN_FILE")
            .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string())
            .into();

        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("REQUEST_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(AppError::Config(
                "REQUEST_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }

        Ok(Self {
            spotify_client_id,
            spotify_client_secret,
            spotify_redirect_uri,
            youtube_client_secret_file,
            youtube_token_file,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn get_missing_config(&self) -> Vec<String> {
        let mut missing = Vec::new();

        if self.spotify_client_id.is_empty() {
            missing.push("SPOTIFY_CLIENT_ID".to_string());
        }
        if self.spotify_client_secret.is_empty() {
            missing.push("SPOTIFY_CLIENT_SECRET".to_string());
        }

        missing
    }

    pub fn validate_spotify_config(&self) -> bool {
        !self.spotify_client_id.is_empty() && !self.spotify_client_secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.spotify_redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.youtube_client_secret_file, PathBuf::from("client_secret.json"));
        assert_eq!(config.youtube_token_file, PathBuf::from("token.json"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.validate_spotify_config());
        assert_eq!(
            config.get_missing_config(),
            vec!["SPOTIFY_CLIENT_ID", "SPOTIFY_CLIENT_SECRET"]
        );
    }

    #[test]
    fn test_reads_credentials_and_overrides() {
        let config = config_from(&[
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
            ("YOUTUBE_TOKEN_FILE", "/tmp/yt-token.json"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert!(config.validate_spotify_config());
        assert!(config.get_missing_config().is_empty());
        assert_eq!(config.youtube_token_file, PathBuf::from("/tmp/yt-token.json"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_bad_timeout() {
        assert!(matches!(
            config_from(&[("REQUEST_TIMEOUT_SECS", "soon")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("REQUEST_TIMEOUT_SECS", "0")]),
            Err(AppError::Config(_))
        ));
    }
}
