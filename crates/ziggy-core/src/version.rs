use std::cmp::Ordering;
use std::fmt;

use semver::Version;

use crate::error::ZiggyError;

pub const DEV_SENTINEL: &str = "master";

const DEV_MARKER: &str = "-dev.";

/// Released versions, newest first.
pub static KNOWN_VERSIONS: &[&str] = &[
    "0.15.2", "0.15.1", "0.14.1", "0.14.0", "0.13.0", "0.12.1", "0.12.0", "0.11.0", "0.10.1",
    "0.10.0", "0.9.1", "0.9.0", "0.8.1", "0.8.0", "0.7.1", "0.7.0", "0.6.0", "0.5.0", "0.4.0",
    "0.3.0", "0.2.0", "0.1.1",
];

fn is_known_version(version: &str) -> bool {
    KNOWN_VERSIONS.contains(&version)
}

pub fn is_dev_version(version: &str) -> bool {
    version.contains(DEV_MARKER)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionRequest {
    Release(String),
    Development,
}

impl VersionRequest {
    pub fn parse(input: &str) -> Result<Self, ZiggyError> {
        let trimmed = input.trim();
        if trimmed == DEV_SENTINEL {
            return Ok(Self::Development);
        }
        if is_known_version(trimmed) {
            return Ok(Self::Release(trimmed.to_string()));
        }
        Err(ZiggyError::UnknownVersion {
            version: trimmed.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Release(version) => version,
            Self::Development => DEV_SENTINEL,
        }
    }

    /// Exact comparison against the version component of an artifact or
    /// entry name; never a substring test, so `0.9.0` does not satisfy
    /// `0.9.0-dev.1+abc`.
    pub fn matches(&self, version: &str) -> bool {
        match self {
            Self::Release(requested) => requested == version,
            Self::Development => is_dev_version(version),
        }
    }
}

impl fmt::Display for VersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orders version strings newest first; strings semver cannot parse sort
/// after every parseable one, in lexical order.
pub fn compare_newest_first(left: &str, right: &str) -> Ordering {
    match (Version::parse(left), Version::parse(right)) {
        (Ok(left), Ok(right)) => right.cmp(&left),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

pub fn version_precedes(version: &str, cutoff: &str) -> bool {
    match (Version::parse(version), Version::parse(cutoff)) {
        (Ok(version), Ok(cutoff)) => version < cutoff,
        _ => false,
    }
}
