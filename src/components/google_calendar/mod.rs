pub mod client;
pub mod consent;
pub mod credentials;
pub mod models;
pub mod summary;
pub mod time;
pub mod token;

pub use client::{CalendarSession, FetchOutcome, GoogleCalendarClient};
pub use consent::{ConsentFlow, HeadlessConsent, LocalServerConsent};
pub use credentials::OAuthCredentials;
pub use models::CalendarEvent;
pub use summary::{format_event_summary, format_event_summary_now};
pub use token::{FileTokenStore, StoredToken, TokenManager, TokenStore};

use crate::config::Config;
use crate::error::BotResult;

/// Read-only access to calendar events
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";
/// Scopes requested during consent
pub const SCOPES: &[&str] = &[CALENDAR_READONLY_SCOPE];

/// Token manager backed by the configured token file and consent flow
pub fn token_manager(config: &Config) -> TokenManager {
    let store = FileTokenStore::new(&config.token_file);
    let consent: Box<dyn ConsentFlow> = if config.headless {
        Box::new(HeadlessConsent::new(&config.token_file))
    } else {
        Box::new(LocalServerConsent::new(config.redirect_port))
    };
    TokenManager::new(Box::new(store), consent, &config.credentials_file)
}

/// Obtain a session for calendar queries
pub async fn authenticate(config: &Config) -> BotResult<CalendarSession> {
    let token = token_manager(config).get_token().await?;
    Ok(CalendarSession::new(token.access_token))
}
