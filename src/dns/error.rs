use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

use super::RecordKind;

#[derive(Debug, Error)]
pub enum DnsError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain IDNA conversion failed")]
    IdnaConversion {
        #[source]
        source: idna::Errors,
    },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("domain {domain} does not exist")]
    NxDomain { domain: String },
    #[error("no {kind} records for {domain}")]
    NoAnswer { domain: String, kind: RecordKind },
    #[error("no nameserver could answer the {kind} query for {domain}")]
    NoNameservers { domain: String, kind: RecordKind },
    #[error("{kind} lookup for {domain} failed: {source}")]
    Lookup {
        domain: String,
        kind: RecordKind,
        #[source]
        source: ResolveError,
    },
}

impl DnsError {
    /// True for the authoritative "no such domain" answer.
    pub fn is_nx_domain(&self) -> bool {
        matches!(self, Self::NxDomain { .. })
    }

    pub(crate) fn idna(source: idna::Errors) -> Self {
        Self::IdnaConversion { source }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn nx_domain(domain: impl Into<String>) -> Self {
        Self::NxDomain {
            domain: domain.into(),
        }
    }

    pub(crate) fn no_answer(domain: impl Into<String>, kind: RecordKind) -> Self {
        Self::NoAnswer {
            domain: domain.into(),
            kind,
        }
    }

    pub(crate) fn no_nameservers(domain: impl Into<String>, kind: RecordKind) -> Self {
        Self::NoNameservers {
            domain: domain.into(),
            kind,
        }
    }

    pub(crate) fn lookup(domain: impl Into<String>, kind: RecordKind, source: ResolveError) -> Self {
        Self::Lookup {
            domain: domain.into(),
            kind,
            source,
        }
    }
}
