pub mod google_calendar;
pub mod telegram;

// Re-export the stage entry points
pub use google_calendar::{CalendarEvent, GoogleCalendarClient};
pub use telegram::TelegramNotifier;
