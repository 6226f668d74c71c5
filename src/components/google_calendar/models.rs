use serde::{Deserialize, Serialize};

/// Simplified calendar event representation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
    pub end_date_time: Option<String>,
    pub end_date: Option<String>,
}

/// `start`/`end` object of the Calendar API event resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date: Option<String>,
    pub date_time: Option<String>,
    pub time_zone: Option<String>,
}

/// Event resource as returned by `events.list`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEvent {
    #[serde(default)]
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventDateTime>,
    pub end: Option<EventDateTime>,
}

/// One page of an `events.list` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

impl From<ApiEvent> for CalendarEvent {
    fn from(event: ApiEvent) -> Self {
        let start = event.start.unwrap_or_default();
        let end = event.end.unwrap_or_default();

        CalendarEvent {
            id: event.id,
            summary: event.summary,
            description: event.description,
            location: event.location,
            start_date_time: start.date_time,
            start_date: start.date,
            end_date_time: end.date_time,
            end_date: end.date,
        }
    }
}
