use std::fmt;

/// DNS record types queried while checking a domain.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Ns,
    A,
    Aaaa,
    Mx,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ns => "NS",
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Mx => "MX",
        })
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// What DNS told us about a domain during one classification.
///
/// A missing domain never carries MX hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecordSet {
    exists: bool,
    mx_hosts: Vec<String>,
}

impl DomainRecordSet {
    pub fn missing() -> Self {
        Self {
            exists: false,
            mx_hosts: Vec::new(),
        }
    }

    /// An existing domain with its MX hosts, highest priority first.
    pub fn with_mx(mx_hosts: Vec<String>) -> Self {
        Self {
            exists: true,
            mx_hosts,
        }
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn mx_hosts(&self) -> &[String] {
        &self.mx_hosts
    }

    pub fn primary_mx(&self) -> Option<&str> {
        self.mx_hosts.first().map(String::as_str)
    }

    pub fn into_mx_hosts(self) -> Vec<String> {
        self.mx_hosts
    }
}
