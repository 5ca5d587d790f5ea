use serde_json::Value;
use tracing::debug;
use ziggy_core::{Result, ZiggyError};

use crate::http::HttpFetcher;
use crate::CatalogSource;

const TARBALL_KEY: &str = "tarball";

/// Reads the machine-readable `index.json` published next to the download
/// page.
pub struct JsonIndexSource {
    url: String,
    fetcher: HttpFetcher,
}

impl JsonIndexSource {
    pub fn new(url: &str, fetcher: HttpFetcher) -> Self {
        Self {
            url: url.to_string(),
            fetcher,
        }
    }
}

impl CatalogSource for JsonIndexSource {
    fn fetch(&self) -> Result<Vec<String>> {
        let response = self.fetcher.get(&self.url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ZiggyError::Connection {
                url: self.url.clone(),
                message: format!("HTTP {status}"),
            });
        }
        let body = response.text().map_err(|err| ZiggyError::Connection {
            url: self.url.clone(),
            message: format!("failed to read index: {err}"),
        })?;

        let tarballs = extract_tarballs(&body).map_err(|err| ZiggyError::Connection {
            url: self.url.clone(),
            message: format!("malformed index: {err}"),
        })?;
        debug!(url = %self.url, links = tarballs.len(), "read download index");
        Ok(tarballs)
    }
}

/// Flattens `{ "<release>": { "<target>": { "tarball": "<url>" } } }` into
/// the list of tarball URLs. Non-object members such as `date` or `docs`
/// are ignored.
pub fn extract_tarballs(body: &str) -> serde_json::Result<Vec<String>> {
    let index: Value = serde_json::from_str(body)?;
    let Some(releases) = index.as_object() else {
        return Ok(Vec::new());
    };

    let mut tarballs = Vec::new();
    for release in releases.values().filter_map(Value::as_object) {
        for target in release.values().filter_map(Value::as_object) {
            if let Some(url) = target.get(TARBALL_KEY).and_then(Value::as_str) {
                tarballs.push(url.to_string());
            }
        }
    }
    Ok(tarballs)
}
