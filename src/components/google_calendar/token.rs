use super::consent::ConsentFlow;
use super::credentials::{OAuthCredentials, DEFAULT_TOKEN_URI};
use super::SCOPES;
use crate::error::{authorization_error, BotResult};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Tokens this close to expiry are refreshed
const EXPIRY_SKEW_SECS: i64 = 60;
/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Token material kept in the cache file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp in seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl StoredToken {
    /// Build a cache entry from a token endpoint response
    pub fn from_response(
        response: TokenResponse,
        credentials: &OAuthCredentials,
        scopes: &[&str],
        now: i64,
    ) -> Self {
        let scopes = match response.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => scopes.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: Some(
                now.saturating_add(response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN)),
            ),
            scopes,
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            token_uri: credentials.token_uri.clone(),
        }
    }

    /// Usable at `now`; a token without expiry never expires
    pub fn is_valid_at(&self, now: i64) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => expires_at.saturating_sub(EXPIRY_SKEW_SECS) > now,
            None => true,
        }
    }

    fn credentials(&self) -> OAuthCredentials {
        let mut credentials = OAuthCredentials::new(&self.client_id, &self.client_secret);
        credentials.token_uri = self.token_uri.clone();
        credentials
    }
}

/// Successful token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// POST a grant to the token endpoint
pub(crate) async fn request_token(
    client: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> BotResult<TokenResponse> {
    let response = client
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| authorization_error(&format!("Token request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(authorization_error(&format!(
            "Token endpoint rejected the request: HTTP {} - {}",
            status, error_body
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| authorization_error(&format!("Failed to parse token response: {}", e)))
}

/// Where the OAuth token is persisted between runs
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// The cached token, or `None` if nothing usable is stored
    async fn load(&self) -> BotResult<Option<StoredToken>>;

    async fn save(&self, token: &StoredToken) -> BotResult<()>;
}

/// JSON token cache on the local disk
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> BotResult<Option<StoredToken>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable token file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, token: &StoredToken) -> BotResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Saved token to {}", self.path.display());
        Ok(())
    }
}

/// Keeps a valid Google Calendar token available
pub struct TokenManager {
    store: Box<dyn TokenStore>,
    consent: Box<dyn ConsentFlow>,
    credentials_file: PathBuf,
    client: Client,
}

impl TokenManager {
    pub fn new(
        store: Box<dyn TokenStore>,
        consent: Box<dyn ConsentFlow>,
        credentials_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            consent,
            credentials_file: credentials_file.into(),
            client: Client::new(),
        }
    }

    /// Cached token if valid, else a refreshed one, else a fresh consent.
    /// Any new token is written back to the store.
    pub async fn get_token(&self) -> BotResult<StoredToken> {
        let now = Utc::now().timestamp();

        if let Some(token) = self.store.load().await? {
            if token.is_valid_at(now) {
                debug!("Using cached Google Calendar token");
                return Ok(token);
            }
            if token.refresh_token.is_some() {
                info!("Refreshing expired Google Calendar token");
                let refreshed = self.refresh_token(&token).await?;
                self.store.save(&refreshed).await?;
                return Ok(refreshed);
            }
        }

        let credentials = OAuthCredentials::from_file(&self.credentials_file)?;
        info!("No valid token found, starting authorization flow");
        let token = self.consent.obtain_consent(&credentials, SCOPES).await?;
        self.store.save(&token).await?;
        Ok(token)
    }

    /// Exchange the refresh token for a new access token
    async fn refresh_token(&self, token: &StoredToken) -> BotResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| authorization_error("No refresh token in token data"))?;

        let params = [
            ("client_id", token.client_id.as_str()),
            ("client_secret", token.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = request_token(&self.client, &token.token_uri, &params).await?;

        let scopes: Vec<&str> = token.scopes.iter().map(String::as_str).collect();
        let mut refreshed = StoredToken::from_response(
            response,
            &token.credentials(),
            &scopes,
            Utc::now().timestamp(),
        );
        // Google usually omits the refresh token on refresh
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = token.refresh_token.clone();
        }
        Ok(refreshed)
    }
}
