//! Hostname value object
//!
//! Hostnames are compared by exact string after normalization, so the same
//! normalization is applied when registering a domain and when reading a
//! `Host` header.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Maximum length of a fully qualified hostname
const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum length of a single label
const MAX_LABEL_LEN: usize = 63;

/// Normalized, validated hostname
///
/// Normalization lowercases the input, strips a `:port` suffix and a
/// trailing dot.
///
/// # Examples
///
/// ```
/// use domain::Hostname;
///
/// let host = Hostname::parse("Acme.Example.com:8443").unwrap();
/// assert_eq!(host.as_str(), "acme.example.com");
/// assert_eq!(host.first_label(), "acme");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hostname(String);

impl Hostname {
    /// Parse and normalize a hostname
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let mut host = raw.trim().to_ascii_lowercase();

        // Strip port (IPv6 literals are not valid tenant domains anyway)
        if let Some((name, port)) = host.rsplit_once(':') {
            if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) {
                host = name.to_string();
            }
        }

        if host.ends_with('.') {
            host.pop();
        }

        if host.is_empty() || host.len() > MAX_HOSTNAME_LEN {
            return Err(DomainError::InvalidHostname(raw.to_string()));
        }

        for label in host.split('.') {
            let valid = !label.is_empty()
                && label.len() <= MAX_LABEL_LEN
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
            if !valid {
                return Err(DomainError::InvalidHostname(raw.to_string()));
            }
        }

        Ok(Self(host))
    }

    /// Get the normalized hostname
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leftmost label (`acme` for `acme.example.com`)
    pub fn first_label(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }

    /// Return the subdomain label if this host is exactly one label below `base`
    ///
    /// ```
    /// use domain::Hostname;
    ///
    /// let host = Hostname::parse("acme.example.com").unwrap();
    /// assert_eq!(host.subdomain_of("example.com"), Some("acme"));
    /// assert_eq!(host.subdomain_of("other.com"), None);
    /// ```
    pub fn subdomain_of(&self, base: &str) -> Option<&str> {
        let base = base.trim().trim_end_matches('.').to_ascii_lowercase();
        let prefix = self.0.strip_suffix(base.as_str())?.strip_suffix('.')?;
        if prefix.is_empty() || prefix.contains('.') {
            None
        } else {
            Some(prefix)
        }
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Hostname {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Hostname> for String {
    fn from(host: Hostname) -> Self {
        host.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_port_and_trailing_dot() {
        assert_eq!(
            Hostname::parse("ACME.example.com.").unwrap().as_str(),
            "acme.example.com"
        );
        assert_eq!(
            Hostname::parse("portal.clinic.org:3000").unwrap().as_str(),
            "portal.clinic.org"
        );
    }

    #[test]
    fn rejects_malformed_hosts() {
        for bad in ["", "bad host.com", "-acme.com", "acme..com", "acme_x.com"] {
            assert!(Hostname::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn rejects_overlong_label() {
        let host = format!("{}.com", "a".repeat(64));
        assert!(Hostname::parse(&host).is_err());
    }

    #[test]
    fn localhost_is_valid() {
        assert_eq!(Hostname::parse("localhost:8080").unwrap().as_str(), "localhost");
    }

    #[test]
    fn subdomain_requires_exactly_one_label() {
        let host = Hostname::parse("a.b.example.com").unwrap();
        assert_eq!(host.subdomain_of("example.com"), None);
        assert_eq!(host.subdomain_of("b.example.com"), Some("a"));

        let apex = Hostname::parse("example.com").unwrap();
        assert_eq!(apex.subdomain_of("example.com"), None);
    }

    #[test]
    fn subdomain_does_not_match_partial_label() {
        let host = Hostname::parse("acme.notexample.com").unwrap();
        assert_eq!(host.subdomain_of("example.com"), None);
    }
}
