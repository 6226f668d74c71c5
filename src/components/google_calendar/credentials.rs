use crate::error::{config_error, BotResult, Error};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client identity from the Google Cloud Console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

/// Layout of the downloaded client secret JSON.
///
/// Either an `installed`/`web` section or a flat object with
/// `client_id` and `client_secret` at the root.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_uri: DEFAULT_AUTH_URI.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        }
    }

    /// Read the client secret file, failing with `MissingCredentialsFile` if it is absent
    pub fn from_file(path: &Path) -> BotResult<Self> {
        if !path.exists() {
            return Err(Error::MissingCredentialsFile(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> BotResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json)
            .map_err(|e| config_error(&format!("Failed to parse credentials JSON: {}", e)))?;

        if let Some(section) = file.installed.or(file.web) {
            let mut credentials = Self::new(section.client_id, section.client_secret);
            if let Some(auth_uri) = section.auth_uri {
                credentials.auth_uri = auth_uri;
            }
            if let Some(token_uri) = section.token_uri {
                credentials.token_uri = token_uri;
            }
            return Ok(credentials);
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err(config_error(
            "Credentials file must contain an 'installed' or 'web' section",
        ))
    }
}
