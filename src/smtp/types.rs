use std::fmt;

use phf::phf_set;

/// RCPT TO reply codes that count as an explicit refusal of the mailbox.
pub const SMTP_REJECT_CODES: phf::Set<u16> = phf_set! {
    450u16, 451u16, 452u16, 550u16, 551u16, 552u16, 553u16, 554u16,
};

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Greeting,
    Ehlo,
    Helo,
    MailFrom,
    RcptTo,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Greeting => "greeting",
            Self::Ehlo => "EHLO",
            Self::Helo => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
        })
    }
}

/// A raw SMTP reply, preserving the numeric status code and message text.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Message text on a single line (multi-line replies are joined by spaces).
    pub fn flat_message(&self) -> String {
        self.message.split('\n').collect::<Vec<_>>().join(" ")
    }
}

/// Outcome of the RCPT TO handshake against one mail exchanger.
#[cfg_attr(
    feature = "with-serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "verdict", rename_all = "kebab-case")
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpVerdict {
    /// 2xx reply to RCPT TO.
    Accepted(SmtpReply),
    /// One of [`SMTP_REJECT_CODES`].
    Rejected(SmtpReply),
    /// Any other reply code.
    Ambiguous(SmtpReply),
    /// The session broke down before a RCPT TO reply was read.
    HandshakeError { message: String },
}

impl SmtpVerdict {
    pub fn from_rcpt_reply(reply: SmtpReply) -> Self {
        if reply.is_positive_completion() {
            Self::Accepted(reply)
        } else if SMTP_REJECT_CODES.contains(&reply.code) {
            Self::Rejected(reply)
        } else {
            Self::Ambiguous(reply)
        }
    }

    pub fn handshake_error(message: impl Into<String>) -> Self {
        Self::HandshakeError {
            message: message.into(),
        }
    }

    pub fn reply(&self) -> Option<&SmtpReply> {
        match self {
            Self::Accepted(reply) | Self::Rejected(reply) | Self::Ambiguous(reply) => Some(reply),
            Self::HandshakeError { .. } => None,
        }
    }

    pub fn code(&self) -> Option<u16> {
        self.reply().map(|reply| reply.code)
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Accepted(reply) | Self::Rejected(reply) | Self::Ambiguous(reply) => {
                &reply.message
            }
            Self::HandshakeError { message } => message,
        }
    }
}

impl fmt::Display for SmtpVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted(reply) => {
                write!(f, "SMTP: user accepted ({} {})", reply.code, reply.flat_message())
            }
            Self::Rejected(reply) => {
                write!(f, "SMTP: user rejected ({} {})", reply.code, reply.flat_message())
            }
            Self::Ambiguous(reply) => {
                write!(f, "SMTP: ambiguous reply ({} {})", reply.code, reply.flat_message())
            }
            Self::HandshakeError { message } => write!(f, "SMTP: handshake error ({message})"),
        }
    }
}
