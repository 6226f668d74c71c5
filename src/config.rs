use crate::error::{config_error, BotResult};
use crate::utils::time::DigestZone;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional settings file, overridable with `DIGEST_CONFIG`
pub const DEFAULT_SETTINGS_FILE: &str = "config/digest.toml";
/// Google Cloud Console OAuth client secret
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";
/// Cached OAuth token
pub const DEFAULT_TOKEN_FILE: &str = "token.json";
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Destination settings for the Telegram notifier
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token issued by @BotFather
    pub bot_token: Option<String>,
    /// Chat the digest is posted to
    pub chat_id: Option<String>,
    /// Bot API base URL
    pub api_base: String,
}

impl TelegramConfig {
    pub fn new(bot_token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            bot_token,
            chat_id,
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
        }
    }

    /// Point the notifier at another Bot API server
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Non-secret settings that may live in the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub calendar_id: Option<String>,
    pub timezone: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub token_file: Option<PathBuf>,
    pub redirect_port: Option<u16>,
    pub headless: Option<bool>,
    pub telegram_api_base: Option<String>,
    pub calendar_api_base: Option<String>,
}

impl FileSettings {
    /// Read the settings file; a missing file yields defaults
    pub fn load(path: &Path) -> BotResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| config_error(&format!("Failed to parse {}: {}", path.display(), e)))
    }
}

/// Main configuration structure for the digest job
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram destination
    pub telegram: TelegramConfig,
    /// OAuth application secret downloaded from Google Cloud Console
    pub credentials_file: PathBuf,
    /// Cached OAuth token
    pub token_file: PathBuf,
    /// Google Calendar ID to read
    pub calendar_id: String,
    /// Calendar API base URL
    pub calendar_api_base: String,
    /// Zone that defines "today"
    pub zone: DigestZone,
    /// Loopback port for the consent redirect, 0 picks a free one
    pub redirect_port: u16,
    /// Refuse interactive consent
    pub headless: bool,
}

impl Config {
    /// Load configuration from environment and settings file
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let settings_path = env::var("DIGEST_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_FILE));
        let settings = FileSettings::load(&settings_path)?;

        Self::from_sources(settings, |key| env::var(key).ok())
    }

    /// Merge file settings with variables from `lookup`; variables win
    pub fn from_sources<F>(settings: FileSettings, lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telegram = TelegramConfig::new(var("TELEGRAM_BOT_TOKEN"), var("TELEGRAM_CHAT_ID"))
            .with_api_base(
                var("TELEGRAM_API_BASE")
                    .or(settings.telegram_api_base)
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            );

        let credentials_file = var("GOOGLE_CREDENTIALS_FILE")
            .map(PathBuf::from)
            .or(settings.credentials_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILE));

        let token_file = var("GOOGLE_TOKEN_FILE")
            .map(PathBuf::from)
            .or(settings.token_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

        let calendar_id = var("GOOGLE_CALENDAR_ID")
            .or(settings.calendar_id)
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());

        let calendar_api_base = var("GOOGLE_CALENDAR_API_BASE")
            .or(settings.calendar_api_base)
            .unwrap_or_else(|| DEFAULT_CALENDAR_API_BASE.to_string());

        let zone = match var("TIMEZONE").or(settings.timezone) {
            Some(name) => DigestZone::parse(&name)?,
            None => DigestZone::Local,
        };

        let redirect_port = match var("OAUTH_REDIRECT_PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|_| config_error("Invalid OAUTH_REDIRECT_PORT format"))?,
            None => settings.redirect_port.unwrap_or(0),
        };

        let headless = match var("HEADLESS") {
            Some(flag) => parse_flag(&flag)
                .ok_or_else(|| config_error("Invalid HEADLESS value, expected true or false"))?,
            None => settings.headless.unwrap_or(false),
        };

        Ok(Config {
            telegram,
            credentials_file,
            token_file,
            calendar_id,
            calendar_api_base,
            zone,
            redirect_port,
            headless,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
