//! Per-address verdicts.
//!
//! [`Classifier::classify`] runs syntax check, domain existence, MX
//! resolution and the SMTP probe in that order, stopping at the first stage
//! that rules the address out. Every failure ends up in the returned
//! [`EmailCheckResult`]; nothing is raised to the caller.

mod syntax;
mod types;

pub use syntax::is_plausible_email;
pub use types::{DomainStatus, EmailCheckResult, SmtpCheck};

use tracing::debug;
use trust_dns_resolver::Resolver;

use crate::dns::{DnsError, DnsLookup, resolve_domain, system_resolver};
use crate::smtp::{MailboxProber, ProbeOptions, SmtpProber};

pub struct Classifier<R, P> {
    resolver: R,
    prober: P,
}

impl Classifier<Resolver, SmtpProber> {
    /// Live classifier: system DNS configuration and real SMTP sessions.
    pub fn from_system_conf(options: ProbeOptions) -> Result<Self, DnsError> {
        Ok(Self::new(system_resolver()?, SmtpProber::new(options)))
    }
}

impl<R, P> Classifier<R, P>
where
    R: DnsLookup,
    P: MailboxProber,
{
    pub fn new(resolver: R, prober: P) -> Self {
        Self { resolver, prober }
    }

    pub fn classify(&self, email: &str) -> EmailCheckResult {
        let Some(domain) = syntax::domain_of(email) else {
            debug!(email, "not an email address");
            return EmailCheckResult::domain_missing(email);
        };

        let records = match resolve_domain(&self.resolver, domain) {
            Ok(records) => records,
            Err(err) if err.is_nx_domain() => {
                debug!(email, error = %err, "MX lookup says the domain does not exist");
                return EmailCheckResult::domain_missing(email);
            }
            Err(err) => {
                debug!(email, error = %err, "MX lookup failed");
                return EmailCheckResult::mx_missing(email);
            }
        };
        if !records.exists() {
            return EmailCheckResult::domain_missing(email);
        }

        let Some(primary) = records.primary_mx() else {
            debug!(email, domain, "domain has no usable MX host");
            return EmailCheckResult::mx_missing(email);
        };
        let verdict = self.prober.probe(email, primary);
        EmailCheckResult::probed(email, records.into_mx_hosts(), verdict)
    }
}

/// Classifies a single address with the system resolver and default probe
/// options.
pub fn classify_email(email: &str) -> Result<EmailCheckResult, DnsError> {
    let classifier = Classifier::from_system_conf(ProbeOptions::default())?;
    Ok(classifier.classify(email))
}
