use std::fmt;

use crate::smtp::SmtpVerdict;

/// Domain-level outcome reported for every address.
#[cfg_attr(
    feature = "with-serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainStatus {
    /// Bad syntax, NXDOMAIN, or no record kind answered.
    DomainMissing,
    /// The domain exists but has no usable MX host.
    MxMissingOrInvalid,
    /// The domain exists and has at least one MX host.
    DomainValid,
}

impl DomainStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DomainMissing => "domain-missing",
            Self::MxMissingOrInvalid => "mx-missing-or-invalid",
            Self::DomainValid => "domain-valid",
        }
    }
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(
    feature = "with-serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpCheck {
    Skipped,
    Probed(SmtpVerdict),
}

impl SmtpCheck {
    pub fn verdict(&self) -> Option<&SmtpVerdict> {
        match self {
            Self::Skipped => None,
            Self::Probed(verdict) => Some(verdict),
        }
    }
}

impl fmt::Display for SmtpCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => f.write_str("SMTP: skipped"),
            Self::Probed(verdict) => fmt::Display::fmt(verdict, f),
        }
    }
}

/// Final record for one address. Only the classifier builds these, and an
/// SMTP probe is only ever attached to a `domain-valid` record with MX hosts.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCheckResult {
    email: String,
    status: DomainStatus,
    mx_hosts: Vec<String>,
    smtp: SmtpCheck,
}

impl EmailCheckResult {
    pub(crate) fn domain_missing(email: &str) -> Self {
        Self::skipped(email, DomainStatus::DomainMissing)
    }

    pub(crate) fn mx_missing(email: &str) -> Self {
        Self::skipped(email, DomainStatus::MxMissingOrInvalid)
    }

    fn skipped(email: &str, status: DomainStatus) -> Self {
        Self {
            email: email.to_string(),
            status,
            mx_hosts: Vec::new(),
            smtp: SmtpCheck::Skipped,
        }
    }

    pub(crate) fn probed(email: &str, mx_hosts: Vec<String>, verdict: SmtpVerdict) -> Self {
        debug_assert!(!mx_hosts.is_empty());
        Self {
            email: email.to_string(),
            status: DomainStatus::DomainValid,
            mx_hosts,
            smtp: SmtpCheck::Probed(verdict),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn status(&self) -> DomainStatus {
        self.status
    }

    pub fn mx_hosts(&self) -> &[String] {
        &self.mx_hosts
    }

    pub fn smtp(&self) -> &SmtpCheck {
        &self.smtp
    }

    /// Comma-joined MX hosts, or `-` when there are none.
    pub fn mx_summary(&self) -> String {
        if self.mx_hosts.is_empty() {
            "-".to_string()
        } else {
            self.mx_hosts.join(", ")
        }
    }
}

impl fmt::Display for EmailCheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}; MX: {}; {}",
            self.email,
            self.status,
            self.mx_summary(),
            self.smtp
        )
    }
}
