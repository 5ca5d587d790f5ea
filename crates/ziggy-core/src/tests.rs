use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::*;

fn linux_x86_64() -> PlatformKey {
    PlatformKey::new(Os::Linux, Arch::X86_64).expect("linux-x86_64 must be supported")
}

#[test]
fn platform_key_normalizes_host_spellings() {
    let key = PlatformKey::from_raw("Linux", "AMD64").expect("must normalize");
    assert_eq!(key, linux_x86_64());
    assert_eq!(key.to_string(), "linux-x86_64");

    let mac = PlatformKey::from_raw("macos", "arm64").expect("must normalize");
    assert_eq!(mac.to_string(), "darwin-aarch64");

    let pi = PlatformKey::from_raw("linux", "armv7l").expect("must normalize");
    assert_eq!(pi.arch, Arch::Armv7a);

    let legacy = PlatformKey::from_raw("Windows", "i686").expect("must normalize");
    assert_eq!(legacy.to_string(), "windows-x86");
}

#[test]
fn platform_key_rejects_pairs_outside_support_table() {
    let err = PlatformKey::from_raw("freebsd", "aarch64").expect_err("must reject");
    assert!(matches!(err, ZiggyError::UnsupportedPlatform { .. }));
    assert_eq!(err.to_string(), "Platform Not Supported: freebsd-aarch64");
    assert_eq!(err.exit_code(), 2);

    let err = PlatformKey::from_raw("haiku", "x86_64").expect_err("must reject");
    assert_eq!(err.to_string(), "Platform Not Supported: haiku-x86_64");
}

#[test]
fn platform_key_parses_display_form() {
    let key: PlatformKey = "darwin-x86_64".parse().expect("must parse");
    assert_eq!(key.os, Os::Darwin);
    assert_eq!(key.executable_name(), "zig");

    let windows: PlatformKey = "windows-aarch64".parse().expect("must parse");
    assert_eq!(windows.executable_name(), "zig.exe");

    assert!("linux".parse::<PlatformKey>().is_err());
}

#[test]
fn supported_platforms_round_trip_through_display() {
    for &(os, arch) in crate::platform::SUPPORTED_PLATFORMS {
        let key = PlatformKey::new(os, arch).expect("table entry must construct");
        let parsed: PlatformKey = key.to_string().parse().expect("display form must parse");
        assert_eq!(parsed, key);
    }
}

#[test]
fn version_request_accepts_known_versions_and_sentinel() {
    assert_eq!(
        VersionRequest::parse("0.12.0").expect("known"),
        VersionRequest::Release("0.12.0".to_string())
    );
    assert_eq!(
        VersionRequest::parse("master").expect("sentinel"),
        VersionRequest::Development
    );

    let err = VersionRequest::parse("0.12.7").expect_err("unknown");
    assert!(matches!(err, ZiggyError::UnknownVersion { ref version } if version == "0.12.7"));
    assert_eq!(err.exit_code(), 1);

    assert!(VersionRequest::parse("0.12.0-dev.1+abc").is_err());
}

#[test]
fn version_request_matches_exact_components_only() {
    let release = VersionRequest::Release("0.9.0".to_string());
    assert!(release.matches("0.9.0"));
    assert!(!release.matches("0.9.0-dev.1+abc"));
    assert!(!release.matches("0.9.01"));

    let dev = VersionRequest::Development;
    assert!(dev.matches("0.14.0-dev.3028+cdc9d65b0"));
    assert!(!dev.matches("0.14.0"));
}

#[test]
fn known_versions_are_newest_first() {
    let mut sorted = KNOWN_VERSIONS.to_vec();
    sorted.sort_by(|left, right| compare_newest_first(left, right));
    assert_eq!(sorted, KNOWN_VERSIONS.to_vec());
}

#[test]
fn compare_newest_first_puts_unparseable_last() {
    assert_eq!(compare_newest_first("0.12.0", "0.11.0"), Ordering::Less);
    assert_eq!(
        compare_newest_first("0.14.0-dev.1+abc", "0.14.0"),
        Ordering::Greater
    );
    assert_eq!(compare_newest_first("0.1.1", "nightly"), Ordering::Less);
    assert!(version_precedes("0.10.1", "0.11.0"));
    assert!(!version_precedes("0.11.0", "0.11.0"));
}

#[test]
fn split_archive_name_strips_known_extensions() {
    assert_eq!(
        split_archive_name("zig-linux-x86_64-0.12.0.tar.xz"),
        Some(("zig-linux-x86_64-0.12.0", ArchiveType::TarXz))
    );
    assert_eq!(
        split_archive_name("zig-windows-x86_64-0.12.0.zip"),
        Some(("zig-windows-x86_64-0.12.0", ArchiveType::Zip))
    );
    assert_eq!(split_archive_name("zig-linux-x86_64-0.12.0.tar.xz.minisig"), None);
    assert_eq!(split_archive_name(".zip"), None);
    assert_eq!(
        split_archive_name("zig-win64-0.1.1.zip"),
        Some(("zig-win64-0.1.1", ArchiveType::Zip))
    );
}

#[test]
fn entry_name_splits_platform_tokens_from_version() {
    let parsed = EntryName::parse("zig-linux-x86_64-0.14.0-dev.3028+cdc9d65b0").expect("must parse");
    assert_eq!(parsed.platform_tokens, vec!["linux", "x86_64"]);
    assert_eq!(parsed.version, "0.14.0-dev.3028+cdc9d65b0");
    assert!(parsed.is_dev());

    let reordered = EntryName::parse("zig-x86_64-linux-0.14.1").expect("must parse");
    assert_eq!(reordered.platform_tokens, vec!["x86_64", "linux"]);
    assert_eq!(reordered.version, "0.14.1");

    let legacy = EntryName::parse("zig-win64-0.1.1").expect("must parse");
    assert_eq!(legacy.platform_tokens, vec!["win64"]);

    assert!(EntryName::parse("ziglang-linux-0.12.0").is_none());
    assert!(EntryName::parse("zig-linux-x86_64").is_none());
}

#[test]
fn catalog_entry_from_href_derives_names() {
    let entry = CatalogEntry::from_href(
        "https://ziglang.org/download/0.12.0/zig-linux-x86_64-0.12.0.tar.xz?mirror=1#top",
    )
    .expect("must parse");
    assert_eq!(entry.version, "0.12.0");
    assert_eq!(entry.artifact_name, "zig-linux-x86_64-0.12.0.tar.xz");
    assert_eq!(entry.entry_name(), "zig-linux-x86_64-0.12.0");
    assert_eq!(
        entry.download_url,
        "https://ziglang.org/download/0.12.0/zig-linux-x86_64-0.12.0.tar.xz"
    );
    assert_eq!(entry.archive, ArchiveType::TarXz);
    assert!(!entry.is_dev());
}

#[test]
fn catalog_entry_rejects_non_artifacts() {
    for href in [
        "https://ziglang.org/download/0.12.0/zig-0.12.0.tar.xz",
        "https://ziglang.org/download/0.12.0/zig-linux-x86_64-0.12.0.tar.xz.minisig",
        "https://ziglang.org/documentation/0.12.0/",
        "https://ziglang.org/download/0.12.0/release-notes.html",
    ] {
        assert!(CatalogEntry::from_href(href).is_none(), "{href} must be rejected");
    }
}

#[test]
fn parse_catalog_keeps_discovery_order_and_drops_duplicates() {
    let hrefs = vec![
        "https://ziglang.org/download/0.11.0/zig-linux-x86_64-0.11.0.tar.xz",
        "https://ziglang.org/download/0.12.0/zig-linux-x86_64-0.12.0.tar.xz",
        "https://mirror.test/zig-linux-x86_64-0.11.0.tar.xz",
        "https://ziglang.org/download/0.12.0/zig-0.12.0.tar.xz",
    ];
    let entries = parse_catalog(&hrefs);
    let names = entries
        .iter()
        .map(|entry| entry.artifact_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "zig-linux-x86_64-0.11.0.tar.xz",
            "zig-linux-x86_64-0.12.0.tar.xz"
        ]
    );
    assert_eq!(
        entries[0].download_url,
        "https://ziglang.org/download/0.11.0/zig-linux-x86_64-0.11.0.tar.xz"
    );
}

#[test]
fn config_defaults_follow_home_and_platform() {
    let home = Path::new("/home/tester");
    let config = ZiggyConfig::from_parts(
        home,
        default_store_root(home),
        Some("platform = \"linux-x86_64\"\n"),
        &ConfigOverrides::default(),
    )
    .expect("config must load");

    assert_eq!(config.store_root, PathBuf::from("/home/tester/.ziggy"));
    assert_eq!(config.link_path, PathBuf::from("/home/tester/.local/bin/zig"));
    assert_eq!(config.platform, linux_x86_64());
    assert_eq!(config.catalog_format, CatalogFormat::Html);
    assert_eq!(config.catalog_url, "https://ziglang.org/download/");
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.connect_retries, 1);
    assert!(!config.activate_on_upgrade);
}

#[test]
fn config_file_values_yield_to_overrides() {
    let home = Path::new("/home/tester");
    let raw = r#"
platform = "windows-x86_64"
link_path = "/opt/bin/zig.exe"
catalog_format = "json"
timeout_secs = 15
connect_retries = 3
activate_on_upgrade = true
"#;
    let overrides = ConfigOverrides {
        store_root: None,
        link_path: Some(PathBuf::from("/custom/zig.exe")),
        timeout_secs: Some(5),
    };
    let config = ZiggyConfig::from_parts(home, PathBuf::from("/store"), Some(raw), &overrides)
        .expect("config must load");

    assert_eq!(config.link_path, PathBuf::from("/custom/zig.exe"));
    assert_eq!(config.catalog_format, CatalogFormat::Json);
    assert_eq!(config.catalog_url, "https://ziglang.org/download/index.json");
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.connect_retries, 3);
    assert!(config.activate_on_upgrade);
    assert_eq!(config.platform.executable_name(), "zig.exe");
}

#[test]
fn config_anchors_relative_paths_to_working_directory() {
    let overrides = ConfigOverrides {
        store_root: None,
        link_path: Some(PathBuf::from("bin/zig")),
        timeout_secs: None,
    };
    let config = ZiggyConfig::from_parts(
        Path::new("/home/tester"),
        PathBuf::from("relative-store"),
        Some("platform = \"linux-x86_64\"\n"),
        &overrides,
    )
    .expect("config must load");

    let cwd = std::env::current_dir().expect("must read cwd");
    assert!(config.store_root.is_absolute());
    assert_eq!(config.store_root, cwd.join("relative-store"));
    assert!(config.link_path.is_absolute());
    assert!(config.link_path.ends_with("bin/zig"));
}

#[test]
fn config_rejects_unknown_keys_and_bad_values() {
    let home = Path::new("/home/tester");
    let store = PathBuf::from("/store");
    let overrides = ConfigOverrides::default();

    let err = ZiggyConfig::from_parts(
        home,
        store.clone(),
        Some("platform = \"linux-x86_64\"\nmirror = \"x\"\n"),
        &overrides,
    )
    .expect_err("unknown key must fail");
    assert!(matches!(err, ZiggyError::Config(_)));

    let err = ZiggyConfig::from_parts(
        home,
        store.clone(),
        Some("platform = \"linux-x86_64\"\ntimeout_secs = 0\n"),
        &overrides,
    )
    .expect_err("zero timeout must fail");
    assert!(err.to_string().contains("timeout_secs"));

    let err = ZiggyConfig::from_parts(
        home,
        store,
        Some("platform = \"linux-x86_64\"\ncatalog_url = \"ftp://example.test\"\n"),
        &overrides,
    )
    .expect_err("non-http url must fail");
    assert!(err.to_string().contains("catalog_url"));

    for url in ["https://", "http://exa mple.test/download/", "https//ziglang.org"] {
        let raw = format!("platform = \"linux-x86_64\"\ncatalog_url = \"{url}\"\n");
        let err = ZiggyConfig::from_parts(home, PathBuf::from("/store"), Some(&raw), &overrides)
            .expect_err("malformed url must fail");
        assert!(matches!(err, ZiggyError::Config(_)), "{url}");
    }
}

#[test]
fn error_classes_map_to_exit_codes() {
    let not_installed = ZiggyError::NotInstalled {
        version: "0.12.0".to_string(),
    };
    assert_eq!(not_installed.exit_code(), 1);
    assert!(!not_installed.is_retryable());

    let connection = ZiggyError::Connection {
        url: "https://ziglang.org/download/".to_string(),
        message: "timed out".to_string(),
    };
    assert_eq!(connection.exit_code(), 2);
    assert!(connection.is_retryable());

    let download = ZiggyError::DownloadFailed {
        url: "https://ziglang.org/x.tar.xz".to_string(),
        message: "HTTP 404".to_string(),
    };
    assert!(download.to_string().starts_with("download of"));
    assert!(!download.is_retryable());
}
