use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::error::{AppError, Result};

const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";
const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_REDIRECT_URI: &str = "http://localhost";

// Refresh a little early so a token does not expire mid-request.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

/// OAuth client credentials as downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

impl ClientSecret {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|e| {
            AppError::Config(format!(
                "Unable to read client secret file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: ClientSecretFile = serde_json::from_slice(&data)?;
        file.installed.or(file.web).ok_or_else(|| {
            AppError::Config("Client secret file has no 'installed' or 'web' section".into())
        })
    }

    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_REDIRECT_URI)
    }

    pub fn consent_url(&self) -> Result<Url> {
        Url::parse_with_params(
            &self.auth_uri,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri()),
                ("response_type", "code"),
                ("scope", YOUTUBE_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| AppError::Config(format!("Invalid auth_uri: {}", e)))
    }
}

impl StoredToken {
    fn from_response(response: TokenResponse, previous_refresh: Option<String>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: Utc::now() + ChronoDuration::seconds(response.expires_in),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

/// Obtain a usable access token: the cached one if still valid, a refreshed
/// one if it expired, or a fresh consent otherwise.
pub async fn authorize(http: &Client, secret_file: &Path, token_file: &Path) -> Result<String> {
    let secret = ClientSecret::load(secret_file)?;

    if let Some(token) = load_token(token_file) {
        if !token.is_expired(Utc::now()) {
            info!("Using cached YouTube token from {}", token_file.display());
            return Ok(token.access_token);
        }

        if let Some(refresh_token) = token.refresh_token.clone() {
            match refresh(http, &secret, &refresh_token).await {
                Ok(fresh) => {
                    save_token(token_file, &fresh)?;
                    info!("Refreshed YouTube token");
                    return Ok(fresh.access_token);
                }
                Err(e) => warn!("Could not refresh YouTube token: {}", e),
            }
        }
    }

    let token = consent(http, &secret).await?;
    save_token(token_file, &token)?;
    info!("Saved YouTube credentials to {}", token_file.display());

    Ok(token.access_token)
}

fn load_token(path: &Path) -> Option<StoredToken> {
    let data = fs::read(path).ok()?;
    match serde_json::from_slice(&data) {
        Ok(token) => Some(token),
        Err(e) => {
            warn!("Ignoring unreadable token file {}: {}", path.display(), e);
            None
        }
    }
}

// The token file holds credentials, so it is only readable by its owner.
fn save_token(path: &Path, token: &StoredToken) -> Result<()> {
    let json = serde_json::to_string_pretty(token)?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // `mode` only applies on creation; tighten a token file left by an older run.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(json.as_bytes())?;
    Ok(())
}

async fn consent(http: &Client, secret: &ClientSecret) -> Result<StoredToken> {
    let url = secret.consent_url()?;
    println!("\nGo to the following link in your browser to authorize YouTube:");
    println!("{}\n", url);

    print!("Enter the authorization code (or the URL you were redirected to): ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let code = extract_code(&input)
        .ok_or_else(|| AppError::Auth("No authorization code entered".into()))?;

    let response = http
        .post(&secret.token_uri)
        .form(&[
            ("code", code.as_str()),
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("redirect_uri", secret.redirect_uri()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(AppError::Auth(format!("Token exchange failed: {}", error_text)));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))?;

    Ok(StoredToken::from_response(token, None))
}

async fn refresh(http: &Client, secret: &ClientSecret, refresh_token: &str) -> Result<StoredToken> {
    let response = http
        .post(&secret.token_uri)
        .form(&[
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(AppError::Auth(format!("Token refresh failed: {}", error_text)));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))?;

    Ok(StoredToken::from_response(token, Some(refresh_token.to_string())))
}

/// Accept either a bare authorization code or the full redirect URL.
pub fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    match Url::parse(input) {
        Ok(url) => url
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned()),
        Err(_) => Some(input.to_string()),
    }
}
