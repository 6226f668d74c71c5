use super::models::CalendarEvent;
use super::time::format_time_range;
use crate::utils::time::DigestZone;
use chrono::NaiveDate;

/// Sent instead of a digest when the day is empty
pub const NO_EVENTS_MESSAGE: &str = "📅 No events scheduled for today. Enjoy your free day!";
/// Placeholder for events without a summary
pub const NO_TITLE: &str = "No Title";
/// Descriptions longer than this many characters are cut
pub const DESCRIPTION_LIMIT: usize = 100;

/// Format the events of `today` into a digest.
///
/// Titles are wrapped in `**` for Telegram's Markdown dialect. Events are
/// listed in the order given. Never fails: missing or malformed
/// optional fields fall back to a default rendering.
pub fn format_event_summary(events: &[CalendarEvent], today: NaiveDate) -> String {
    if events.is_empty() {
        return NO_EVENTS_MESSAGE.to_string();
    }

    let mut summary = format!(
        "📅 **Calendar Summary for {}**\n\n",
        today.format("%A, %B %d, %Y")
    );

    for (i, event) in events.iter().enumerate() {
        summary.push_str(&format_event(i + 1, event));
    }

    summary.push_str(&format!("Total events: {}", events.len()));
    summary
}

/// [`format_event_summary`] for the current date in `zone`
pub fn format_event_summary_now(events: &[CalendarEvent], zone: &DigestZone) -> String {
    format_event_summary(events, zone.today())
}

fn format_event(number: usize, event: &CalendarEvent) -> String {
    let title = non_empty(&event.summary).unwrap_or(NO_TITLE);
    let time = format_time_range(event);

    let location = non_empty(&event.location)
        .map(|location| format!("\n📍 {}", location))
        .unwrap_or_default();

    let description = non_empty(&event.description)
        .map(|description| format!("\n📝 {}", truncate_description(description)))
        .unwrap_or_default();

    format!(
        "{}. **{}**\n⏰ {}{}{}\n\n",
        number, title, time, location, description
    )
}

fn truncate_description(description: &str) -> String {
    match description.char_indices().nth(DESCRIPTION_LIMIT) {
        Some((cut, _)) => format!("{}...", &description[..cut]),
        None => description.to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
