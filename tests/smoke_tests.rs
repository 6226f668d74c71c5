mod common;

use agenda_digest::components::google_calendar::summary::NO_EVENTS_MESSAGE;
use agenda_digest::components::google_calendar::{
    format_event_summary, format_event_summary_now, CalendarEvent, CalendarSession,
    FileTokenStore, GoogleCalendarClient, StoredToken, TokenStore, SCOPES,
};
use agenda_digest::components::TelegramNotifier;
use agenda_digest::config::{Config, FileSettings, TelegramConfig};
use agenda_digest::startup;
use agenda_digest::utils::time::DigestZone;
use chrono::{NaiveDate, Utc};
use common::MockServer;

/// Smoke test to verify that the config can be built without the environment
#[test]
fn test_config_builds_from_sources() {
    let config = Config::from_sources(FileSettings::default(), |key| match key {
        "TELEGRAM_BOT_TOKEN" => Some("123:abc".to_string()),
        "TELEGRAM_CHAT_ID" => Some("-1001".to_string()),
        "TIMEZONE" => Some("UTC".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.telegram.chat_id.as_deref(), Some("-1001"));
    assert_eq!(config.calendar_id, "primary");
    assert_eq!(config.zone, DigestZone::Named(chrono_tz::UTC));
}

#[test]
fn test_empty_digest_for_current_day() {
    let summary = format_event_summary_now(&[], &DigestZone::Local);
    assert_eq!(summary, NO_EVENTS_MESSAGE);
}

#[test]
fn test_digest_for_current_day_has_header() {
    let zone = DigestZone::parse("UTC").unwrap();
    let event = CalendarEvent {
        summary: Some("Lunch".to_string()),
        start_date: Some("2025-07-08".to_string()),
        end_date: Some("2025-07-09".to_string()),
        ..Default::default()
    };

    let summary = format_event_summary_now(&[event], &zone);
    let header = zone.today().format("%A, %B %d, %Y").to_string();
    assert!(summary.contains(&header));
    assert!(summary.contains("1. **Lunch**"));
}

/// Fetch from a mock calendar, format, deliver to a mock Telegram
#[tokio::test]
async fn test_fetch_format_send() {
    let calendar = MockServer::start(vec![(
        200,
        r#"{"items": [{
            "id": "team",
            "summary": "Team Meeting",
            "location": "Room A",
            "description": "sync",
            "start": {"dateTime": "2025-07-08T09:00:00+03:00"},
            "end": {"dateTime": "2025-07-08T10:00:00+03:00"}
        }]}"#
            .into(),
    )]);
    let telegram = MockServer::start(vec![(200, r#"{"ok": true, "result": {}}"#.into())]);

    let config = Config::from_sources(FileSettings::default(), |key| match key {
        "TELEGRAM_BOT_TOKEN" => Some("123:abc".to_string()),
        "TELEGRAM_CHAT_ID" => Some("-1001".to_string()),
        "TELEGRAM_API_BASE" => Some(telegram.base_url.clone()),
        "GOOGLE_CALENDAR_API_BASE" => Some(calendar.base_url.clone()),
        "TIMEZONE" => Some("Europe/Helsinki".to_string()),
        _ => None,
    })
    .unwrap();

    let today = NaiveDate::from_ymd_opt(2025, 7, 8).unwrap();
    let bounds = config.zone.day_bounds(today).unwrap();
    let events = GoogleCalendarClient::from_config(&config)
        .get_today_events(&CalendarSession::new("ya29.test"), &bounds)
        .await
        .into_events();

    let summary = format_event_summary(&events, today);
    assert!(TelegramNotifier::new(config.telegram.clone())
        .send(&summary)
        .await);

    assert_eq!(calendar.requests().len(), 1);
    let sent = telegram.requests();
    let body: serde_json::Value = serde_json::from_str(&sent[0].body).unwrap();
    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("📅 **Calendar Summary for Tuesday, July 08, 2025**"));
    assert!(text.contains("1. **Team Meeting**"));
    assert!(text.contains("⏰ 09:00 AM - 10:00 AM"));
    assert!(text.contains("📍 Room A"));
    assert!(text.contains("📝 sync"));
    assert!(text.ends_with("Total events: 1"));
}

/// A failed fetch still delivers the empty-day message
#[tokio::test]
async fn test_failed_fetch_sends_no_events_message() {
    let calendar = MockServer::start(vec![(500, r#"{"error": "backend"}"#.into())]);
    let telegram = MockServer::start(vec![(200, r#"{"ok": true}"#.into())]);

    let client = GoogleCalendarClient::new(&calendar.base_url, "primary");
    let bounds = DigestZone::Local
        .day_bounds(NaiveDate::from_ymd_opt(2025, 7, 8).unwrap())
        .unwrap();

    let outcome = client
        .get_today_events(&CalendarSession::new("ya29.test"), &bounds)
        .await;
    assert!(outcome.is_failed());

    let today = NaiveDate::from_ymd_opt(2025, 7, 8).unwrap();
    let summary = format_event_summary(&outcome.into_events(), today);
    let notifier = TelegramNotifier::new(
        TelegramConfig::new(
            Some("123:abc".to_string()),
            Some("-1001".to_string()),
        )
        .with_api_base(&telegram.base_url),
    );
    assert!(notifier.send(&summary).await);

    let sent = telegram.requests();
    let body: serde_json::Value = serde_json::from_str(&sent[0].body).unwrap();
    assert_eq!(body["text"], NO_EVENTS_MESSAGE);
}

/// The whole run survives a failed fetch and a rejected send
#[tokio::test]
async fn test_run_degrades_on_fetch_and_send_failure() {
    let calendar = MockServer::start(vec![(500, r#"{"error": "backend"}"#.into())]);
    let telegram = MockServer::start(vec![(
        200,
        r#"{"ok": false, "description": "Forbidden: bot was kicked"}"#.into(),
    )]);

    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("token.json");
    let token = StoredToken {
        access_token: "ya29.cached".to_string(),
        refresh_token: None,
        expires_at: Some(Utc::now().timestamp() + 3600),
        scopes: vec![SCOPES[0].to_string()],
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        token_uri: "http://127.0.0.1:1/token".to_string(),
    };
    FileTokenStore::new(&token_file).save(&token).await.unwrap();

    let config = Config::from_sources(FileSettings::default(), |key| match key {
        "TELEGRAM_BOT_TOKEN" => Some("123:abc".to_string()),
        "TELEGRAM_CHAT_ID" => Some("5".to_string()),
        "TELEGRAM_API_BASE" => Some(telegram.base_url.clone()),
        "GOOGLE_CALENDAR_API_BASE" => Some(calendar.base_url.clone()),
        "GOOGLE_TOKEN_FILE" => Some(token_file.display().to_string()),
        "GOOGLE_CREDENTIALS_FILE" => {
            Some(dir.path().join("credentials.json").display().to_string())
        }
        "HEADLESS" => Some("true".to_string()),
        _ => None,
    })
    .unwrap();

    assert!(startup::run(config).await.is_ok());

    let fetched = calendar.requests();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].authorization.as_deref(), Some("Bearer ya29.cached"));

    let sent = telegram.requests();
    assert_eq!(sent.len(), 1);
    let body: serde_json::Value = serde_json::from_str(&sent[0].body).unwrap();
    assert_eq!(body["text"], NO_EVENTS_MESSAGE);
    assert_eq!(body["chat_id"], "5");
}
