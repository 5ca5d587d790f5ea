use ziggy_core::{version_precedes, Arch, CatalogEntry, Os, PlatformKey};

const WIN64_ALIAS: &str = "win64";
const LEGACY_X86_ALIAS: &str = "i386";
const LINUX_I386_CUTOFF: &str = "0.11.0";
const WINDOWS_I386_VERSIONS: &[&str] = &["0.8.0", "0.8.1", "0.9.0", "0.9.1", "0.10.0", "0.10.1"];

/// Upstream has spelled platforms as `linux-x86_64`, `x86_64-linux`,
/// `macos-aarch64`, `win64` and `windows-i386` over the years; every
/// spelling is matched here and nowhere else.
pub fn matches_platform(entry: &CatalogEntry, key: PlatformKey) -> bool {
    match entry.platform_tokens.as_slice() {
        [single] => single == WIN64_ALIAS && key.os == Os::Windows && key.arch == Arch::X86_64,
        [first, second] => {
            pair_matches(first, second, &entry.version, key)
                || pair_matches(second, first, &entry.version, key)
        }
        _ => false,
    }
}

fn pair_matches(os_token: &str, arch_token: &str, version: &str, key: PlatformKey) -> bool {
    if Os::parse(os_token) != Some(key.os) {
        return false;
    }
    if arch_token == key.arch.as_str() {
        return true;
    }
    arch_token == LEGACY_X86_ALIAS && legacy_x86_allowed(key, version)
}

fn legacy_x86_allowed(key: PlatformKey, version: &str) -> bool {
    if key.arch != Arch::X86 {
        return false;
    }
    match key.os {
        Os::Linux => version_precedes(version, LINUX_I386_CUTOFF),
        Os::Windows => WINDOWS_I386_VERSIONS.contains(&version),
        _ => false,
    }
}

pub fn filter_for_platform(catalog: &[CatalogEntry], key: PlatformKey) -> Vec<&CatalogEntry> {
    catalog
        .iter()
        .filter(|entry| matches_platform(entry, key))
        .collect()
}
