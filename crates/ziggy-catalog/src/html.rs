use regex::Regex;
use reqwest::Url;
use tracing::debug;
use ziggy_core::{Result, ZiggyError};

use crate::http::HttpFetcher;
use crate::CatalogSource;

const HREF_PATTERN: &str = r#"(?i)href\s*=\s*["']([^"']+)["']"#;

/// Scrapes artifact links from the human-facing download page.
pub struct HtmlCatalogSource {
    page_url: Url,
    fetcher: HttpFetcher,
}

impl HtmlCatalogSource {
    pub fn new(page_url: &str, fetcher: HttpFetcher) -> Result<Self> {
        let page_url = Url::parse(page_url)
            .map_err(|err| ZiggyError::Config(format!("invalid catalog_url '{page_url}': {err}")))?;
        Ok(Self { page_url, fetcher })
    }
}

impl CatalogSource for HtmlCatalogSource {
    fn fetch(&self) -> Result<Vec<String>> {
        let url = self.page_url.as_str();
        let response = self.fetcher.get(url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ZiggyError::Connection {
                url: url.to_string(),
                message: format!("HTTP {status}"),
            });
        }
        let page = response.text().map_err(|err| ZiggyError::Connection {
            url: url.to_string(),
            message: format!("failed to read page: {err}"),
        })?;

        let hrefs = extract_hrefs(&page, &self.page_url)?;
        debug!(url, links = hrefs.len(), "scraped download page");
        Ok(hrefs)
    }
}

/// Every `href` attribute in `page`, resolved against `base`. Links that do
/// not join into a valid URL are skipped.
pub fn extract_hrefs(page: &str, base: &Url) -> Result<Vec<String>> {
    let pattern = Regex::new(HREF_PATTERN)
        .map_err(|err| ZiggyError::Config(format!("invalid href pattern: {err}")))?;
    Ok(pattern
        .captures_iter(page)
        .filter_map(|captures| captures.get(1))
        .filter_map(|href| base.join(href.as_str().trim()).ok())
        .map(String::from)
        .collect())
}
