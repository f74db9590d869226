//! Sitemap discovery for crawl seeding.
//!
//! When sitemap seeding is enabled, the crawler asks this crate for the page
//! URLs listed in `<origin>/sitemap.xml` before organic link discovery starts.
//! A missing or broken sitemap is never fatal: discovery logs the problem and
//! yields no URLs, and the crawl proceeds from the seed alone.

mod parser;

use sitefetch_shared::{Fetch, RequestInit, Result, SiteFetchError};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Path of the sitemap document relative to the site origin.
const SITEMAP_PATH: &str = "/sitemap.xml";

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Fetch and parse the sitemap for `url`'s origin.
///
/// Returns every listed URL in document order, without any host filtering.
/// Entries whose `loc` is not an absolute URL are skipped. Any failure
/// (transport error, non-2xx status, malformed XML, wrong root element)
/// is logged and yields an empty list.
#[instrument(skip_all, fields(url = %url))]
pub async fn discover_sitemap(fetcher: &dyn Fetch, url: &Url, init: &RequestInit) -> Vec<Url> {
    match fetch_sitemap(fetcher, url, init).await {
        Ok(urls) => {
            info!(count = urls.len(), "sitemap discovered");
            urls
        }
        Err(e) => {
            warn!(error = %e, "sitemap unavailable, crawling from seed only");
            Vec::new()
        }
    }
}

/// `{origin}/sitemap.xml` for the given page URL.
pub fn sitemap_url(url: &Url) -> Result<Url> {
    url.join(SITEMAP_PATH)
        .map_err(|e| SiteFetchError::validation(format!("cannot derive sitemap URL from {url}: {e}")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn fetch_sitemap(fetcher: &dyn Fetch, url: &Url, init: &RequestInit) -> Result<Vec<Url>> {
    let sitemap = sitemap_url(url)?;
    debug!(%sitemap, "fetching sitemap");

    let response = fetcher.fetch(&sitemap, init).await?;
    if !response.ok() {
        return Err(SiteFetchError::Network(format!(
            "{sitemap}: HTTP {} {}",
            response.status,
            response.status_text()
        )));
    }

    let locs = parser::parse_sitemap(response.text())?;

    let urls = locs
        .into_iter()
        .filter_map(|loc| match Url::parse(&loc) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(%loc, error = %e, "skipping invalid sitemap entry");
                None
            }
        })
        .collect();

    Ok(urls)
}
