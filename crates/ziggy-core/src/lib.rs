mod archive;
mod catalog;
mod config;
mod error;
mod platform;
mod version;

pub use archive::{split_archive_name, ArchiveType};
pub use catalog::{parse_catalog, CatalogEntry, EntryName};
pub use config::{default_store_root, CatalogFormat, ConfigOverrides, ZiggyConfig};
pub use error::{Result, ZiggyError};
pub use platform::{Arch, Os, PlatformKey};
pub use version::{
    compare_newest_first, is_dev_version, version_precedes, VersionRequest, DEV_SENTINEL,
    KNOWN_VERSIONS,
};

#[cfg(test)]
mod tests;
