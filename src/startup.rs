use crate::components::google_calendar::{self, format_event_summary, FetchOutcome};
use crate::components::{GoogleCalendarClient, TelegramNotifier};
use crate::config::Config;
use crate::error::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Run the digest once: authenticate, fetch today's events, format, send.
///
/// Only configuration and authorization errors abort the run. A failed
/// fetch sends the empty-day message and a failed send is logged.
pub async fn run(config: Config) -> miette::Result<()> {
    info!("Authenticating with Google Calendar...");
    let session = google_calendar::authenticate(&config).await?;

    info!("Fetching today's events...");
    let today = config.zone.today();
    let bounds = config.zone.day_bounds(today)?;
    let calendar = GoogleCalendarClient::from_config(&config);
    let outcome = calendar.get_today_events(&session, &bounds).await;
    if let FetchOutcome::Failed(reason) = &outcome {
        warn!("Continuing without events after fetch failure: {}", reason);
    }
    let events = outcome.into_events();
    info!("Found {} events for {}", events.len(), today);

    info!("Formatting event summary...");
    let summary = format_event_summary(&events, today);

    info!("Sending summary to Telegram...");
    let notifier = TelegramNotifier::new(config.telegram.clone());
    if notifier.send(&summary).await {
        info!("Daily calendar summary sent successfully!");
    } else {
        error!("Failed to send daily calendar summary");
    }

    Ok(())
}
