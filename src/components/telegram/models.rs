use serde::{Deserialize, Serialize};

/// Markup dialect the digest is written in
pub const PARSE_MODE: &str = "Markdown";

/// Body of a `sendMessage` call
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'a str,
}

/// Envelope of every Bot API response
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramResponse {
    pub ok: bool,
    pub description: Option<String>,
}
