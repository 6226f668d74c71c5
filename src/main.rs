use agenda_digest::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting Google Calendar to Telegram summary service...");

    // Load configuration
    let config = startup::load_config()?;

    // Authenticate, fetch, format and send
    startup::run(config).await
}
