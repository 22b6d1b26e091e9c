//! Domain existence and MX resolution.
//!
//! [`resolve_domain`] is what the classifier uses: it runs the tiered
//! NS → A → AAAA existence check and, when the domain exists, the MX lookup.
//! All queries go through the [`DnsLookup`] trait, implemented for the
//! blocking `trust-dns` [`Resolver`](trust_dns_resolver::Resolver).

mod error;
mod resolver;
mod types;

pub use error::DnsError;
pub use resolver::{DnsLookup, domain_exists, resolve_domain, resolve_mx, system_resolver};
pub use types::{DomainRecordSet, MxRecord, RecordKind};
