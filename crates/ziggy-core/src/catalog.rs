use std::collections::HashSet;

use crate::archive::{split_archive_name, ArchiveType};
use crate::version::is_dev_version;

const TOOL_PREFIX: &str = "zig";

/// The pieces of an artifact or installed entry name such as
/// `zig-linux-x86_64-0.12.0` or `zig-x86_64-linux-0.14.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryName {
    pub platform_tokens: Vec<String>,
    pub version: String,
}

impl EntryName {
    /// The version component starts at the first dash-delimited token that
    /// begins with a digit and runs to the end of the name. Everything
    /// between the tool prefix and the version is platform tokens.
    pub fn parse(stem: &str) -> Option<Self> {
        let rest = stem.strip_prefix(TOOL_PREFIX)?.strip_prefix('-')?;

        let mut platform_tokens = Vec::new();
        let mut remaining = rest;
        loop {
            if remaining.starts_with(|ch: char| ch.is_ascii_digit()) {
                return Some(Self {
                    platform_tokens,
                    version: remaining.to_string(),
                });
            }
            let (token, tail) = remaining.split_once('-')?;
            if token.is_empty() {
                return None;
            }
            platform_tokens.push(token.to_string());
            remaining = tail;
        }
    }

    pub fn is_dev(&self) -> bool {
        is_dev_version(&self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub version: String,
    pub platform_tokens: Vec<String>,
    pub artifact_name: String,
    pub download_url: String,
    pub archive: ArchiveType,
}

impl CatalogEntry {
    /// Parses an absolute href into an entry. Source tarballs, signatures
    /// and anything not shaped like `zig-<platform>-<version>.<archive>`
    /// are rejected.
    pub fn from_href(href: &str) -> Option<Self> {
        let without_fragment = href.split('#').next().unwrap_or(href);
        let without_query = without_fragment
            .split('?')
            .next()
            .unwrap_or(without_fragment);
        let artifact_name = without_query.rsplit('/').next()?;
        let (stem, archive) = split_archive_name(artifact_name)?;
        let parsed = EntryName::parse(stem)?;
        if parsed.platform_tokens.is_empty() || parsed.platform_tokens.len() > 2 {
            return None;
        }

        Some(Self {
            version: parsed.version,
            platform_tokens: parsed.platform_tokens,
            artifact_name: artifact_name.to_string(),
            download_url: without_query.to_string(),
            archive,
        })
    }

    pub fn entry_name(&self) -> &str {
        self.artifact_name
            .strip_suffix(self.archive.extension())
            .unwrap_or(&self.artifact_name)
    }

    pub fn is_dev(&self) -> bool {
        is_dev_version(&self.version)
    }
}

/// Parses hrefs in discovery order, dropping non-artifact links and repeated
/// artifact names (the first occurrence wins).
pub fn parse_catalog<S: AsRef<str>>(hrefs: &[S]) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    hrefs
        .iter()
        .filter_map(|href| CatalogEntry::from_href(href.as_ref()))
        .filter(|entry| seen.insert(entry.artifact_name.clone()))
        .collect()
}
