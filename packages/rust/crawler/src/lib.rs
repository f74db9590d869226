//! Site crawling: scheduling, fetch policy, link discovery, and readable
//! content extraction.
//!
//! This crate provides:
//! - [`fetch_site`]: crawl a site from a seed URL into a [`PageMap`]
//! - [`Crawler`]: the configurable engine behind it (custom transports)
//! - [`serialize_pages`]: JSON or `<page>` text output
//! - [`adapters`]: platform-aware readability extraction

pub mod adapters;
pub mod engine;
pub mod links;
pub mod output;
pub mod policy;

pub use adapters::{AdapterRegistry, Article, PlatformAdapter};
pub use engine::{CrawlTarget, Crawler};
pub use output::{OutputFormat, serialize_pages};

use sitefetch_shared::{CrawlConfig, PageMap, Result, SiteFetchError};
use url::Url;

/// Crawl the site at `url` and return its pages keyed by pathname.
///
/// Fails only for a malformed seed URL or an invalid configuration; problems
/// with individual pages leave those pages out of the result.
pub async fn fetch_site(url: &str, config: CrawlConfig) -> Result<PageMap> {
    let seed = parse_seed(url)?;
    Crawler::new(config)?.crawl(&seed).await
}

/// Parse and check a seed URL.
pub fn parse_seed(url: &str) -> Result<Url> {
    let seed = Url::parse(url.trim())
        .map_err(|e| SiteFetchError::validation(format!("invalid URL '{url}': {e}")))?;

    if !matches!(seed.scheme(), "http" | "https") {
        return Err(SiteFetchError::validation(format!(
            "unsupported URL scheme '{}' (expected http or https)",
            seed.scheme()
        )));
    }

    Ok(seed)
}
