//! Telegram relay (`with-telegram` feature): posts a text to a chat through
//! the Bot API `sendMessage` method.

mod error;

pub use error::RelayError;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const TELEGRAM_API: &str = "https://api.telegram.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

impl<'a> SendMessage<'a> {
    fn html(chat_id: &'a str, text: &'a str) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    result: Option<SentMessage>,
}

/// The part of Telegram's `Message` object we report back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

pub struct TelegramClient {
    http: reqwest::blocking::Client,
    api_base: String,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(bot_token: impl Into<String>) -> Result<Self, RelayError> {
        Self::with_api_base(TELEGRAM_API, bot_token, DEFAULT_TIMEOUT)
    }

    pub fn with_api_base(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RelayError::client)?;
        Ok(Self {
            http,
            api_base: api_base.into(),
            bot_token: bot_token.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }

    /// Sends `text` (HTML parse mode, link previews off) to `chat_id`.
    pub fn send_message(&self, chat_id: &str, text: &str) -> Result<SentMessage, RelayError> {
        let payload = SendMessage::html(chat_id, text);
        debug!(chat_id, bytes = text.len(), "posting message to Telegram");
        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .map_err(RelayError::request)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(RelayError::request)?;
        interpret_response(status, &body)
    }
}

/// Success needs a 2xx status and `"ok": true`; anything else is an API
/// error carrying the raw body.
pub(crate) fn interpret_response(status: u16, body: &str) -> Result<SentMessage, RelayError> {
    if !(200..300).contains(&status) {
        return Err(RelayError::api(status, body));
    }
    match serde_json::from_str::<ApiResponse>(body) {
        Ok(ApiResponse {
            ok: true,
            result: Some(message),
        }) => Ok(message),
        _ => Err(RelayError::api(status, body)),
    }
}
