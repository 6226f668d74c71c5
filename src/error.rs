use miette::{Diagnostic, Result};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Credentials file '{}' not found. Please download it from Google Cloud Console.", .0.display())]
    #[diagnostic(
        code(agenda_digest::missing_credentials_file),
        help("Create an OAuth client of type \"Desktop app\" and save its JSON next to the binary")
    )]
    MissingCredentialsFile(PathBuf),

    #[error("Environment error: {0}")]
    #[diagnostic(code(agenda_digest::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(agenda_digest::config))]
    Config(String),

    #[error("Authorization error: {0}")]
    #[diagnostic(code(agenda_digest::authorization))]
    Authorization(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(agenda_digest::google_calendar))]
    GoogleCalendar(String),

    #[error("Telegram API error: {0}")]
    #[diagnostic(code(agenda_digest::telegram))]
    Telegram(String),

    #[error(transparent)]
    #[diagnostic(code(agenda_digest::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(agenda_digest::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(agenda_digest::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authorization errors
pub fn authorization_error(message: &str) -> Error {
    Error::Authorization(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create Telegram errors
pub fn telegram_error(message: &str) -> Error {
    Error::Telegram(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
