mod html;
mod http;
mod json;

use tracing::debug;
use ziggy_core::{parse_catalog, CatalogEntry, CatalogFormat, Result, ZiggyConfig};

pub use html::{extract_hrefs, HtmlCatalogSource};
pub use http::{retry_connection, HttpFetcher};
pub use json::{extract_tarballs, JsonIndexSource};

/// Enumerates every published artifact link, as absolute URLs, in the order
/// upstream lists them.
pub trait CatalogSource {
    fn fetch(&self) -> Result<Vec<String>>;
}

pub fn load_catalog(source: &dyn CatalogSource) -> Result<Vec<CatalogEntry>> {
    let hrefs = source.fetch()?;
    let entries = parse_catalog(&hrefs);
    debug!(
        hrefs = hrefs.len(),
        entries = entries.len(),
        "parsed catalog"
    );
    Ok(entries)
}

pub fn catalog_source_for(config: &ZiggyConfig) -> Result<Box<dyn CatalogSource>> {
    let fetcher = HttpFetcher::from_config(config)?;
    let source: Box<dyn CatalogSource> = match config.catalog_format {
        CatalogFormat::Html => Box::new(HtmlCatalogSource::new(&config.catalog_url, fetcher)?),
        CatalogFormat::Json => Box::new(JsonIndexSource::new(&config.catalog_url, fetcher)),
    };
    Ok(source)
}

#[cfg(test)]
mod tests;
