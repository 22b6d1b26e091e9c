use tracing::debug;
use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
};

use super::{DnsError, DomainRecordSet, MxRecord, RecordKind};

/// Record kinds tried, in order, when deciding whether a domain exists.
const EXISTENCE_TIERS: [RecordKind; 3] = [RecordKind::Ns, RecordKind::A, RecordKind::Aaaa];

/// DNS queries needed by the checker. Implemented for the blocking
/// `trust-dns` resolver; tests plug in stubs.
pub trait DnsLookup {
    /// Returns whether `domain` has at least one record of `kind`.
    fn has_records(&self, domain: &str, kind: RecordKind) -> Result<bool, DnsError>;

    /// Returns the MX records of `domain` in DNS response order.
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError>;
}

impl<T: DnsLookup + ?Sized> DnsLookup for &T {
    fn has_records(&self, domain: &str, kind: RecordKind) -> Result<bool, DnsError> {
        (**self).has_records(domain, kind)
    }

    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        (**self).lookup_mx(domain)
    }
}

impl DnsLookup for Resolver {
    fn has_records(&self, domain: &str, kind: RecordKind) -> Result<bool, DnsError> {
        let found = match kind {
            RecordKind::Ns => self.ns_lookup(domain).map(|l| l.iter().next().is_some()),
            RecordKind::A => self.ipv4_lookup(domain).map(|l| l.iter().next().is_some()),
            RecordKind::Aaaa => self.ipv6_lookup(domain).map(|l| l.iter().next().is_some()),
            RecordKind::Mx => self.mx_lookup(domain).map(|l| l.iter().next().is_some()),
        };
        found.map_err(|err| classify_failure(domain, kind, err))
    }

    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup = self
            .mx_lookup(domain)
            .map_err(|err| classify_failure(domain, RecordKind::Mx, err))?;
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), mx.exchange().to_ascii()))
            .collect())
    }
}

/// Builds a resolver from the system configuration (`/etc/resolv.conf`).
pub fn system_resolver() -> Result<Resolver, DnsError> {
    Resolver::from_system_conf().map_err(DnsError::resolver_init)
}

/// Maps a resolver failure onto the no-answer / NXDOMAIN / no-nameserver
/// vocabulary used by the checker.
pub(crate) fn classify_failure(domain: &str, kind: RecordKind, err: ResolveError) -> DnsError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::NXDomain => DnsError::nx_domain(domain),
            ResponseCode::ServFail | ResponseCode::Refused => {
                DnsError::no_nameservers(domain, kind)
            }
            _ => DnsError::no_answer(domain, kind),
        },
        ResolveErrorKind::NoConnections => DnsError::no_nameservers(domain, kind),
        _ => DnsError::lookup(domain, kind, err),
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, DnsError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(DnsError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(DnsError::idna)
}

/// Strips trailing root-label dots; the root itself becomes empty.
pub(crate) fn normalize_exchange(exchange: &str) -> &str {
    exchange.trim_end_matches('.')
}

enum Tier {
    Found,
    Missing,
    Inconclusive,
}

fn tier_outcome(result: &Result<bool, DnsError>) -> Tier {
    match result {
        Ok(true) => Tier::Found,
        Ok(false) => Tier::Inconclusive,
        Err(err) if err.is_nx_domain() => Tier::Missing,
        Err(_) => Tier::Inconclusive,
    }
}

/// Checks NS, then A, then AAAA records for `domain`.
///
/// The first answer proves the domain exists and an NXDOMAIN proves it does
/// not; anything else moves on to the next record kind. When every kind is
/// inconclusive the domain is reported as missing.
pub fn domain_exists<R: DnsLookup + ?Sized>(resolver: &R, domain: &str) -> bool {
    match normalize_domain(domain) {
        Ok(ascii) => exists_ascii(resolver, &ascii),
        Err(err) => {
            debug!(domain, error = %err, "domain cannot be queried");
            false
        }
    }
}

pub(crate) fn exists_ascii<R: DnsLookup + ?Sized>(resolver: &R, ascii_domain: &str) -> bool {
    for kind in EXISTENCE_TIERS {
        let result = resolver.has_records(ascii_domain, kind);
        match tier_outcome(&result) {
            Tier::Found => {
                debug!(domain = ascii_domain, %kind, "domain exists");
                return true;
            }
            Tier::Missing => {
                debug!(domain = ascii_domain, %kind, "authoritative NXDOMAIN");
                return false;
            }
            Tier::Inconclusive => {
                if let Err(err) = &result {
                    debug!(domain = ascii_domain, %kind, error = %err, "inconclusive lookup");
                } else {
                    debug!(domain = ascii_domain, %kind, "empty answer");
                }
            }
        }
    }
    debug!(domain = ascii_domain, "no record kind answered, treating domain as missing");
    false
}

/// Resolves the MX hosts of `domain`, highest priority (lowest preference)
/// first. Records sharing a preference keep their DNS response order and
/// null MX entries (`.`) are dropped.
pub fn resolve_mx<R: DnsLookup + ?Sized>(resolver: &R, domain: &str) -> Result<Vec<String>, DnsError> {
    let ascii = normalize_domain(domain)?;
    resolve_mx_ascii(resolver, &ascii)
}

pub(crate) fn resolve_mx_ascii<R: DnsLookup + ?Sized>(
    resolver: &R,
    ascii_domain: &str,
) -> Result<Vec<String>, DnsError> {
    let mut records = resolver.lookup_mx(ascii_domain)?;
    records.sort_by_key(|record| record.preference);

    let hosts: Vec<String> = records
        .iter()
        .map(|record| normalize_exchange(&record.exchange))
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect();
    debug!(domain = ascii_domain, hosts = ?hosts, "MX resolved");
    Ok(hosts)
}

/// Runs the existence check and, for existing domains, the MX lookup.
///
/// A domain that cannot be expressed in ASCII is reported as missing. MX
/// failures are returned as-is so callers can tell NXDOMAIN apart.
pub fn resolve_domain<R: DnsLookup + ?Sized>(
    resolver: &R,
    domain: &str,
) -> Result<DomainRecordSet, DnsError> {
    let ascii = match normalize_domain(domain) {
        Ok(ascii) => ascii,
        Err(err) => {
            debug!(domain, error = %err, "domain cannot be queried");
            return Ok(DomainRecordSet::missing());
        }
    };
    if !exists_ascii(resolver, &ascii) {
        return Ok(DomainRecordSet::missing());
    }
    resolve_mx_ascii(resolver, &ascii).map(DomainRecordSet::with_mx)
}
