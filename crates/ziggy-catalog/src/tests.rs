use std::cell::Cell;
use std::time::Duration;

use reqwest::Url;
use ziggy_core::ZiggyError;

use super::*;

const DOWNLOAD_PAGE: &str = r#"
<html><body>
<h2 id="release-0.12.0">0.12.0</h2>
<a href="https://ziglang.org/download/0.12.0/zig-0.12.0.tar.xz">Source</a>
<a href="https://ziglang.org/download/0.12.0/zig-linux-x86_64-0.12.0.tar.xz">Binary</a>
<a href='https://ziglang.org/download/0.12.0/zig-linux-x86_64-0.12.0.tar.xz.minisig'>minisig</a>
<a HREF = "/builds/zig-x86_64-linux-0.16.0-dev.42+abcdef.tar.xz">master</a>
<a href="0.11.0/zig-windows-x86_64-0.11.0.zip">Windows</a>
<a href="0.12.0/release-notes.html">Release Notes</a>
</body></html>
"#;

const INDEX_JSON: &str = r#"{
  "master": {
    "version": "0.16.0-dev.42+abcdef",
    "date": "2026-10-01",
    "docs": "https://ziglang.org/documentation/master/",
    "src": { "tarball": "https://ziglang.org/builds/zig-0.16.0-dev.42+abcdef.tar.xz" },
    "x86_64-linux": {
      "tarball": "https://ziglang.org/builds/zig-x86_64-linux-0.16.0-dev.42+abcdef.tar.xz",
      "shasum": "00",
      "size": "1"
    }
  },
  "0.12.0": {
    "date": "2024-04-20",
    "x86_64-linux": { "tarball": "https://ziglang.org/download/0.12.0/zig-linux-x86_64-0.12.0.tar.xz" },
    "x86_64-windows": { "tarball": "https://ziglang.org/download/0.12.0/zig-windows-x86_64-0.12.0.zip" }
  }
}"#;

struct FixedSource(Vec<String>);

impl CatalogSource for FixedSource {
    fn fetch(&self) -> ziggy_core::Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

struct FailingSource;

impl CatalogSource for FailingSource {
    fn fetch(&self) -> ziggy_core::Result<Vec<String>> {
        Err(connection_error())
    }
}

fn connection_error() -> ZiggyError {
    ZiggyError::Connection {
        url: "https://ziglang.org/download/".to_string(),
        message: "timed out".to_string(),
    }
}

#[test]
fn extract_hrefs_resolves_relative_links_against_page() {
    let base = Url::parse("https://ziglang.org/download/").expect("base url must parse");
    let hrefs = extract_hrefs(DOWNLOAD_PAGE, &base).expect("page must scan");

    assert_eq!(hrefs.len(), 6);
    assert!(hrefs.contains(
        &"https://ziglang.org/builds/zig-x86_64-linux-0.16.0-dev.42+abcdef.tar.xz".to_string()
    ));
    assert!(hrefs
        .contains(&"https://ziglang.org/download/0.11.0/zig-windows-x86_64-0.11.0.zip".to_string()));
}

#[test]
fn scraped_page_parses_into_artifact_entries_only() {
    let base = Url::parse("https://ziglang.org/download/").expect("base url must parse");
    let hrefs = extract_hrefs(DOWNLOAD_PAGE, &base).expect("page must scan");
    let entries = load_catalog(&FixedSource(hrefs)).expect("catalog must load");

    let names = entries
        .iter()
        .map(|entry| entry.artifact_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "zig-linux-x86_64-0.12.0.tar.xz",
            "zig-x86_64-linux-0.16.0-dev.42+abcdef.tar.xz",
            "zig-windows-x86_64-0.11.0.zip",
        ]
    );
}

#[test]
fn extract_tarballs_flattens_every_target() {
    let mut tarballs = extract_tarballs(INDEX_JSON).expect("index must parse");
    tarballs.sort();
    assert_eq!(
        tarballs,
        vec![
            "https://ziglang.org/builds/zig-0.16.0-dev.42+abcdef.tar.xz",
            "https://ziglang.org/builds/zig-x86_64-linux-0.16.0-dev.42+abcdef.tar.xz",
            "https://ziglang.org/download/0.12.0/zig-linux-x86_64-0.12.0.tar.xz",
            "https://ziglang.org/download/0.12.0/zig-windows-x86_64-0.12.0.zip",
        ]
    );
}

#[test]
fn extract_tarballs_rejects_malformed_json() {
    assert!(extract_tarballs("{ not json").is_err());
    assert!(extract_tarballs("[]").expect("array is valid json").is_empty());
}

#[test]
fn load_catalog_propagates_source_failure() {
    let err = load_catalog(&FailingSource).expect_err("source failure must surface");
    assert!(err.is_retryable());
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn retry_connection_retries_only_connection_errors() {
    let calls = Cell::new(0);
    let value = retry_connection(1, Duration::ZERO, |attempt| {
        calls.set(calls.get() + 1);
        if attempt == 0 {
            Err(connection_error())
        } else {
            Ok("page")
        }
    })
    .expect("second attempt must succeed");
    assert_eq!(value, "page");
    assert_eq!(calls.get(), 2);

    let calls = Cell::new(0);
    let err = retry_connection(3, Duration::ZERO, |_| -> ziggy_core::Result<()> {
        calls.set(calls.get() + 1);
        Err(ZiggyError::DownloadFailed {
            url: "https://ziglang.org/x.tar.xz".to_string(),
            message: "HTTP 404".to_string(),
        })
    })
    .expect_err("non-retryable error must surface");
    assert!(matches!(err, ZiggyError::DownloadFailed { .. }));
    assert_eq!(calls.get(), 1);
}

#[test]
fn retry_connection_gives_up_after_budget() {
    let calls = Cell::new(0);
    let err = retry_connection(2, Duration::ZERO, |_| -> ziggy_core::Result<()> {
        calls.set(calls.get() + 1);
        Err(connection_error())
    })
    .expect_err("must give up");
    assert!(err.is_retryable());
    assert_eq!(calls.get(), 3);
}
