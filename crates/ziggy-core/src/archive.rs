#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveType {
    TarXz,
    Zip,
}

impl ArchiveType {
    pub fn extension(self) -> &'static str {
        match self {
            Self::TarXz => ".tar.xz",
            Self::Zip => ".zip",
        }
    }
}

/// Splits `zig-linux-x86_64-0.12.0.tar.xz` into `zig-linux-x86_64-0.12.0`
/// and its archive type. Names with any other suffix (signatures,
/// checksums) yield `None`.
pub fn split_archive_name(name: &str) -> Option<(&str, ArchiveType)> {
    [ArchiveType::TarXz, ArchiveType::Zip]
        .into_iter()
        .find_map(|archive| {
            name.strip_suffix(archive.extension())
                .filter(|stem| !stem.is_empty())
                .map(|stem| (stem, archive))
        })
}
