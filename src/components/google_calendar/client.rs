use super::models::{CalendarEvent, EventsPage};
use crate::config::Config;
use crate::error::{google_calendar_error, BotResult};
use crate::utils::time::DayBounds;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Authenticated access to the Calendar API
#[derive(Debug, Clone)]
pub struct CalendarSession {
    access_token: String,
}

impl CalendarSession {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// Result of fetching a day's events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The query succeeded; the list may be empty
    Events(Vec<CalendarEvent>),
    /// The query failed and the day is treated as empty
    Failed(String),
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    /// Events found, or none if the fetch failed
    pub fn into_events(self) -> Vec<CalendarEvent> {
        match self {
            FetchOutcome::Events(events) => events,
            FetchOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Read-only client for one calendar
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    api_base: String,
    calendar_id: String,
}

impl GoogleCalendarClient {
    pub fn new(api_base: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            calendar_id: calendar_id.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.calendar_api_base, &config.calendar_id)
    }

    /// Events intersecting `bounds`, failures folded into [`FetchOutcome::Failed`]
    pub async fn get_today_events(
        &self,
        session: &CalendarSession,
        bounds: &DayBounds,
    ) -> FetchOutcome {
        match self.list_events(session, bounds).await {
            Ok(events) => FetchOutcome::Events(events),
            Err(e) => {
                warn!("An error occurred while fetching events: {}", e);
                FetchOutcome::Failed(e.to_string())
            }
        }
    }

    /// Expanded single events in `bounds`, ordered by start time, all pages
    pub async fn list_events(
        &self,
        session: &CalendarSession,
        bounds: &DayBounds,
    ) -> BotResult<Vec<CalendarEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.events_url(bounds, page_token.as_deref())?;

            // Make API request
            let response = self
                .client
                .get(url)
                .bearer_auth(session.access_token())
                .send()
                .await
                .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read error response".to_string());
                return Err(google_calendar_error(&format!(
                    "Failed to fetch events: HTTP {} - {}",
                    status, error_body
                )));
            }

            let page: EventsPage = response.json().await.map_err(|e| {
                google_calendar_error(&format!("Failed to parse events response: {}", e))
            })?;

            events.extend(page.items.into_iter().map(CalendarEvent::from));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Fetched {} events for {}", events.len(), self.calendar_id);
        Ok(events)
    }

    fn events_url(&self, bounds: &DayBounds, page_token: Option<&str>) -> BotResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API base cannot hold a path"))?
            .pop_if_empty()
            .extend(&["calendars", self.calendar_id.as_str(), "events"]);

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("timeMin", &bounds.time_min())
                .append_pair("timeMax", &bounds.time_max())
                .append_pair("singleEvents", "true")
                .append_pair("orderBy", "startTime");
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        Ok(url)
    }
}
