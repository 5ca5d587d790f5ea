use ziggy_core::{ArchiveType, CatalogEntry, ZiggyError};

/// The concrete download a version request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    pub version: String,
    pub artifact_name: String,
    pub download_url: String,
    pub entry_name: String,
    pub archive: ArchiveType,
}

impl From<&CatalogEntry> for ArtifactReference {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            version: entry.version.clone(),
            artifact_name: entry.artifact_name.clone(),
            download_url: entry.download_url.clone(),
            entry_name: entry.entry_name().to_string(),
            archive: entry.archive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    UnknownVersion,
    UnsupportedOnPlatform,
    AmbiguousOrMissingDevBuild { candidates: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    pub requested: String,
    pub platform: String,
    pub reason: NotFoundReason,
}

impl From<NotFound> for ZiggyError {
    fn from(not_found: NotFound) -> Self {
        match not_found.reason {
            NotFoundReason::UnknownVersion => ZiggyError::UnknownVersion {
                version: not_found.requested,
            },
            NotFoundReason::UnsupportedOnPlatform => ZiggyError::UnsupportedOnPlatform {
                version: not_found.requested,
                platform: not_found.platform,
            },
            NotFoundReason::AmbiguousOrMissingDevBuild { candidates } => {
                ZiggyError::AmbiguousOrMissingDevBuild {
                    platform: not_found.platform,
                    candidates,
                }
            }
        }
    }
}
