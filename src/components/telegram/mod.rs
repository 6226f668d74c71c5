mod models;
mod notifier;

pub use models::{SendMessageRequest, TelegramResponse, PARSE_MODE};
pub use notifier::TelegramNotifier;
