use agenda_digest::components::google_calendar::{
    ConsentFlow, FileTokenStore, LocalServerConsent, OAuthCredentials, TokenStore, SCOPES,
};
use agenda_digest::startup;

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    // Load configuration
    let config = startup::load_config()?;

    // Fails early if the client secret has not been downloaded
    let credentials = OAuthCredentials::from_file(&config.credentials_file)?;

    // Run the browser consent flow
    println!("Opening browser for Google Calendar authorization...");
    let consent = LocalServerConsent::new(config.redirect_port);
    let token = consent.obtain_consent(&credentials, SCOPES).await?;

    if token.refresh_token.is_none() {
        println!("Warning: Google returned no refresh token, the cached token will expire");
    }

    // Save token to the cache file
    let store = FileTokenStore::new(&config.token_file);
    store.save(&token).await?;

    println!(
        "Token successfully saved to {}!",
        store.path().display()
    );

    Ok(())
}
