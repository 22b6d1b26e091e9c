use std::time::Duration;

/// Default time budget for a whole probe session.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Envelope sender used when none is configured. Never deliverable.
pub const DEFAULT_SENDER: &str = "probe@example.com";

/// Controls how [`probe`](crate::smtp::probe) talks to a mail exchanger.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub port: u16,
    /// Covers connect, greeting, EHLO/HELO, MAIL FROM and RCPT TO together.
    pub timeout: Duration,
    pub helo_domain: String,
    pub envelope_sender: String,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            timeout: DEFAULT_TIMEOUT,
            helo_domain: "localhost".to_string(),
            envelope_sender: DEFAULT_SENDER.to_string(),
        }
    }
}

impl ProbeOptions {
    pub fn helo_name(&self) -> &str {
        let trimmed = self.helo_domain.trim();
        if trimmed.is_empty() {
            "localhost"
        } else {
            trimmed
        }
    }

    pub fn sender(&self) -> &str {
        let trimmed = self.envelope_sender.trim();
        if trimmed.is_empty() {
            DEFAULT_SENDER
        } else {
            trimmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_probe_contract() {
        let options = ProbeOptions::default();
        assert_eq!(options.port, 25);
        assert_eq!(options.timeout, Duration::from_secs(8));
        assert_eq!(options.sender(), "probe@example.com");
    }

    #[test]
    fn blank_overrides_fall_back() {
        let options = ProbeOptions {
            helo_domain: "  ".to_string(),
            envelope_sender: String::new(),
            ..ProbeOptions::default()
        };
        assert_eq!(options.helo_name(), "localhost");
        assert_eq!(options.sender(), DEFAULT_SENDER);
    }
}
