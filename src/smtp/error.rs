use std::time::Duration;

use thiserror::Error;

use super::Stage;

/// Transport and protocol failures of an SMTP probe session.
#[derive(Debug, Error)]
pub enum SmtpProbeError {
    #[error("cannot resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no address found for {host}")]
    NoAddress { host: String },
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("session timed out after {}s during {stage}", .timeout.as_secs_f64())]
    Timeout { stage: Stage, timeout: Duration },
    #[error("I/O error during {stage}: {source}")]
    Io {
        stage: Stage,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {stage} reply: {detail}")]
    Protocol { stage: Stage, detail: String },
    #[error("{stage} refused: {code} {message}")]
    Refused {
        stage: Stage,
        code: u16,
        message: String,
    },
}

impl SmtpProbeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub(crate) fn timeout(stage: Stage, timeout: Duration) -> Self {
        Self::Timeout { stage, timeout }
    }

    pub(crate) fn protocol(stage: Stage, detail: impl Into<String>) -> Self {
        Self::Protocol {
            stage,
            detail: detail.into(),
        }
    }

    pub(crate) fn refused(stage: Stage, code: u16, message: impl Into<String>) -> Self {
        Self::Refused {
            stage,
            code,
            message: message.into(),
        }
    }
}
