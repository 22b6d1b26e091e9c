//! SMTP callout probe.
//!
//! [`probe`] opens one plaintext session to a mail exchanger, walks it up to
//! `RCPT TO` and classifies the reply into an [`SmtpVerdict`]. No message is
//! ever transferred.

mod error;
mod options;
mod probe;
mod session;
mod types;

pub use error::SmtpProbeError;
pub use options::{DEFAULT_SENDER, DEFAULT_TIMEOUT, ProbeOptions};
pub use probe::{MailboxProber, SmtpProber, probe};
pub use types::{SMTP_REJECT_CODES, SmtpReply, SmtpVerdict, Stage};

#[cfg(test)]
pub(crate) use probe::tests::spawn_mock_server;
