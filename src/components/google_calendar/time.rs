use super::models::CalendarEvent;
use chrono::DateTime;

/// Rendered in place of a clock range for date-only events
pub const ALL_DAY: &str = "All day";

/// How an event occupies the day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTiming<'a> {
    Timed { start: &'a str, end: Option<&'a str> },
    AllDay,
}

/// Classify an event by the representation of its start
pub fn event_timing(event: &CalendarEvent) -> EventTiming<'_> {
    match event.start_date_time.as_deref() {
        Some(start) if !start.trim().is_empty() => EventTiming::Timed {
            start,
            end: event
                .end_date_time
                .as_deref()
                .filter(|end| !end.trim().is_empty()),
        },
        _ => EventTiming::AllDay,
    }
}

/// 12-hour clock time in the timestamp's own offset, e.g. `09:00 AM`.
/// Falls back to the raw string when it is not RFC 3339.
pub fn format_clock(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp.trim()) {
        Ok(dt) => dt.format("%I:%M %p").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// `"09:00 AM - 10:00 AM"` for timed events, `"All day"` otherwise
pub fn format_time_range(event: &CalendarEvent) -> String {
    match event_timing(event) {
        EventTiming::Timed {
            start,
            end: Some(end),
        } => format!("{} - {}", format_clock(start), format_clock(end)),
        EventTiming::Timed { start, end: None } => format_clock(start),
        EventTiming::AllDay => ALL_DAY.to_string(),
    }
}
