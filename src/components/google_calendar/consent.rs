use super::credentials::OAuthCredentials;
use super::token::{request_token, StoredToken};
use crate::error::{authorization_error, other_error, BotResult};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

/// Obtains a first token from the user
#[async_trait]
pub trait ConsentFlow: Send + Sync {
    async fn obtain_consent(
        &self,
        credentials: &OAuthCredentials,
        scopes: &[&str],
    ) -> BotResult<StoredToken>;
}

/// Browser consent with a loopback redirect listener
pub struct LocalServerConsent {
    port: u16,
    client: Client,
}

impl LocalServerConsent {
    /// `port` 0 lets the OS pick a free port
    pub fn new(port: u16) -> Self {
        Self {
            port,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ConsentFlow for LocalServerConsent {
    async fn obtain_consent(
        &self,
        credentials: &OAuthCredentials,
        scopes: &[&str],
    ) -> BotResult<StoredToken> {
        // Start local server to receive the callback
        let server = tiny_http::Server::http(("127.0.0.1", self.port)).map_err(|e| {
            authorization_error(&format!("Failed to start local callback server: {}", e))
        })?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| authorization_error("Callback server is not bound to a TCP port"))?;
        let redirect_uri = loopback_redirect_uri(port);

        // Generate random state for security
        let state = uuid::Uuid::new_v4().to_string();
        let auth_url = build_auth_url(credentials, &redirect_uri, scopes, &state)?;

        info!("Opening browser for Google Calendar authorization...");
        if let Err(e) = webbrowser::open(auth_url.as_str()) {
            warn!("Could not open a browser: {}", e);
        }
        info!("If the browser did not open, visit: {}", auth_url);

        let callback = tokio::task::spawn_blocking(move || wait_for_callback(server))
            .await
            .map_err(|e| other_error(&format!("Callback listener crashed: {}", e)))??;

        if callback.state != state {
            return Err(authorization_error(
                "State mismatch in authorization callback",
            ));
        }

        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code", callback.code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];
        let response = request_token(&self.client, &credentials.token_uri, &params).await?;

        Ok(StoredToken::from_response(
            response,
            credentials,
            scopes,
            Utc::now().timestamp(),
        ))
    }
}

/// Refuses to prompt; the token file must be provisioned beforehand
pub struct HeadlessConsent {
    token_file: PathBuf,
}

impl HeadlessConsent {
    pub fn new(token_file: impl Into<PathBuf>) -> Self {
        Self {
            token_file: token_file.into(),
        }
    }
}

#[async_trait]
impl ConsentFlow for HeadlessConsent {
    async fn obtain_consent(
        &self,
        _credentials: &OAuthCredentials,
        _scopes: &[&str],
    ) -> BotResult<StoredToken> {
        Err(authorization_error(&format!(
            "No valid token in {} and interactive consent is disabled; \
             run get_calendar_token on a machine with a browser and copy the file",
            self.token_file.display()
        )))
    }
}

/// Authorization code delivered to the redirect URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub code: String,
    pub state: String,
}

/// Redirect URI matching the address the callback server listens on
pub fn loopback_redirect_uri(port: u16) -> String {
    format!("http://127.0.0.1:{}", port)
}

/// Authorization endpoint URL for offline access
pub fn build_auth_url(
    credentials: &OAuthCredentials,
    redirect_uri: &str,
    scopes: &[&str],
    state: &str,
) -> BotResult<Url> {
    let mut url = Url::parse(&credentials.auth_uri)
        .map_err(|e| authorization_error(&format!("Invalid auth_uri: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("client_id", &credentials.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &scopes.join(" "))
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("state", state);

    Ok(url)
}

/// Inspect a request path hitting the loopback server.
///
/// `None` means the request is unrelated to the redirect (a favicon, say).
pub fn parse_callback(request_path: &str) -> Option<BotResult<Callback>> {
    let url = Url::parse(&format!("http://localhost{}", request_path)).ok()?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Some(Err(authorization_error(&format!(
            "Authorization was denied: {}",
            error
        ))));
    }

    let code = code?;
    Some(Ok(Callback {
        code,
        state: state.unwrap_or_default(),
    }))
}

fn wait_for_callback(server: tiny_http::Server) -> BotResult<Callback> {
    info!("Waiting for authorization callback...");
    loop {
        let request = server.recv()?;
        let outcome = parse_callback(request.url());

        let reply = match &outcome {
            Some(Ok(_)) => "Authorization successful! You can close this window.",
            Some(Err(_)) => "Authorization failed. You can close this window.",
            None => {
                let _ = request.respond(tiny_http::Response::empty(404));
                continue;
            }
        };
        if let Err(e) = request.respond(tiny_http::Response::from_string(reply)) {
            warn!("Failed to answer the browser: {}", e);
        }

        if let Some(outcome) = outcome {
            return outcome;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_auth_url() {
        let credentials = OAuthCredentials::new("client-1", "secret");
        let url = build_auth_url(
            &credentials,
            "http://localhost:8765",
            &["https://www.googleapis.com/auth/calendar.readonly"],
            "xyz",
        )
        .unwrap();

        assert!(url
            .as_str()
            .starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("client_id"), Some("client-1"));
        assert_eq!(get("redirect_uri"), Some("http://localhost:8765"));
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(
            get("scope"),
            Some("https://www.googleapis.com/auth/calendar.readonly")
        );
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("state"), Some("xyz"));
    }

    #[test]
    fn test_redirect_uri_uses_listener_address() {
        assert_eq!(loopback_redirect_uri(8765), "http://127.0.0.1:8765");
    }

    #[test]
    fn test_parse_callback() {
        let callback = parse_callback("/?state=abc&code=4%2F0Ab&scope=calendar")
            .unwrap()
            .unwrap();
        assert_eq!(callback.code, "4/0Ab");
        assert_eq!(callback.state, "abc");

        assert!(parse_callback("/favicon.ico").is_none());

        let denied = parse_callback("/?error=access_denied&state=abc").unwrap();
        assert!(matches!(denied, Err(Error::Authorization(_))));
    }

    #[tokio::test]
    async fn test_headless_refuses() {
        let consent = HeadlessConsent::new("token.json");
        let err = consent
            .obtain_consent(&OAuthCredentials::new("id", "secret"), &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("token.json"));
    }
}
