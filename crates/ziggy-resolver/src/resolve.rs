use std::collections::BTreeSet;

use tracing::debug;
use ziggy_core::{compare_newest_first, CatalogEntry, PlatformKey, VersionRequest};

use crate::filter::filter_for_platform;
use crate::types::{ArtifactReference, NotFound, NotFoundReason};

pub fn resolve(
    requested: &str,
    platform: PlatformKey,
    catalog: &[CatalogEntry],
) -> Result<ArtifactReference, NotFound> {
    let not_found = |reason| NotFound {
        requested: requested.trim().to_string(),
        platform: platform.to_string(),
        reason,
    };

    let request = VersionRequest::parse(requested)
        .map_err(|_| not_found(NotFoundReason::UnknownVersion))?;
    let candidates = filter_for_platform(catalog, platform);
    debug!(
        requested = %request,
        platform = %platform,
        candidates = candidates.len(),
        "resolving version"
    );

    match request {
        VersionRequest::Release(_) => candidates
            .into_iter()
            .find(|entry| request.matches(&entry.version))
            .map(ArtifactReference::from)
            .ok_or_else(|| not_found(NotFoundReason::UnsupportedOnPlatform)),
        VersionRequest::Development => {
            let dev_builds = candidates
                .into_iter()
                .filter(|entry| entry.is_dev())
                .collect::<Vec<_>>();
            match dev_builds.as_slice() {
                [only] => Ok(ArtifactReference::from(*only)),
                _ => Err(not_found(NotFoundReason::AmbiguousOrMissingDevBuild {
                    candidates: dev_builds.len(),
                })),
            }
        }
    }
}

/// Distinct versions published for `platform`, newest first.
pub fn supported_versions(platform: PlatformKey, catalog: &[CatalogEntry]) -> Vec<String> {
    let distinct = filter_for_platform(catalog, platform)
        .into_iter()
        .map(|entry| entry.version.as_str())
        .collect::<BTreeSet<_>>();
    let mut versions = distinct
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    versions.sort_by(|left, right| compare_newest_first(left, right));
    versions
}
