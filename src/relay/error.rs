use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("HTTP client initialization failed: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request to the Telegram API failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("Telegram API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
}

impl RelayError {
    pub(crate) fn client(source: reqwest::Error) -> Self {
        Self::Client { source }
    }

    pub(crate) fn request(source: reqwest::Error) -> Self {
        // Strip the URL: it embeds the bot token.
        Self::Request {
            source: source.without_url(),
        }
    }

    pub(crate) fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }
}
