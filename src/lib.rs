#![forbid(unsafe_code)]
//! mailprobe: email address checks through DNS (NS/A/AAAA/MX) and an SMTP
//! `RCPT TO` probe, without sending mail.

pub mod batch;
pub mod classify;
pub mod dns;
pub mod input;
pub mod smtp;

#[cfg(feature = "with-telegram")]
pub mod relay;

pub use batch::{BatchError, BatchOptions, check_batch, classify_all, collect_candidates};
pub use classify::{
    Classifier, DomainStatus, EmailCheckResult, SmtpCheck, classify_email, is_plausible_email,
};
pub use dns::{
    DnsError, DnsLookup, DomainRecordSet, MxRecord, RecordKind, domain_exists, resolve_domain,
    resolve_mx, system_resolver,
};
pub use input::load_emails;
pub use smtp::{
    MailboxProber, ProbeOptions, SMTP_REJECT_CODES, SmtpProbeError, SmtpProber, SmtpReply,
    SmtpVerdict, probe,
};
