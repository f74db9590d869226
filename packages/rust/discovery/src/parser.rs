//! Sitemap XML parser.
//!
//! Accepts the `urlset` flavour of the sitemap protocol
//! (<https://www.sitemaps.org/protocol.html>):
//! - Root element: `<urlset>`, namespace optional
//! - One or more `<url>` children, each with a `<loc>` page URL
//! - Other children (`lastmod`, `priority`, extension tags) are ignored

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use sitefetch_shared::{Result, SiteFetchError};

// ---------------------------------------------------------------------------
// XML structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Urlset {
    #[serde(default)]
    url: Vec<UrlEntry>,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    loc: Option<String>,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a sitemap document into the list of `loc` values, in document order.
///
/// Fails when the root element is not `urlset`, when the XML is malformed, or
/// when no `url` entry carries a `loc`.
pub(crate) fn parse_sitemap(xml: &str) -> Result<Vec<String>> {
    let root = root_element(xml)?;
    if root != "urlset" {
        return Err(SiteFetchError::parse(format!(
            "invalid sitemap.xml: expected <urlset> root, found <{root}>"
        )));
    }

    let urlset: Urlset = quick_xml::de::from_str(xml)
        .map_err(|e| SiteFetchError::parse(format!("invalid sitemap.xml: {e}")))?;

    let locs: Vec<String> = urlset
        .url
        .into_iter()
        .filter_map(|entry| entry.loc)
        .map(|loc| loc.trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect();

    if locs.is_empty() {
        return Err(SiteFetchError::parse("invalid sitemap.xml: no <url><loc> entries"));
    }

    Ok(locs)
}

/// Local name of the document's first element.
fn root_element(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => {
                return Err(SiteFetchError::parse("invalid sitemap.xml: empty document"));
            }
            Ok(_) => continue,
            Err(e) => {
                return Err(SiteFetchError::parse(format!("invalid sitemap.xml: {e}")));
            }
        }
    }
}
