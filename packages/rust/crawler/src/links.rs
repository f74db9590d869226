//! Fetched page documents: cleanup, link discovery, and selector narrowing.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use sitefetch_shared::{Result, SiteFetchError};

use crate::policy::same_host;

/// Elements removed before links are collected or content is extracted.
static NON_CONTENT_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script, style, link, img, video").expect("valid selector")
});
static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

/// A parsed page with non-content nodes already removed.
pub struct PageDocument {
    html: Html,
}

impl PageDocument {
    /// Parse a response body and strip `script`, `style`, `link`, `img`
    /// and `video` elements.
    pub fn parse(body: &str) -> Self {
        let mut html = Html::parse_document(body);

        let doomed: Vec<_> = html.select(&NON_CONTENT_SEL).map(|el| el.id()).collect();
        for id in doomed {
            if let Some(mut node) = html.tree.get_mut(id) {
                node.detach();
            }
        }

        Self { html }
    }

    /// Text of the document `<title>`, empty when absent.
    pub fn title(&self) -> String {
        self.html
            .select(&TITLE_SEL)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// Absolute same-host links, in document order, fragments removed.
    ///
    /// Hrefs are resolved against `base`; links to another `host:port`,
    /// non-http(s) schemes and unresolvable hrefs are dropped. Duplicates are
    /// kept, the crawl gate absorbs them.
    pub fn links(&self, base: &Url) -> Vec<Url> {
        self.html
            .select(&ANCHOR_SEL)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| base.join(href.trim()).ok())
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .filter(|url| same_host(url, base))
            .map(|mut url| {
                url.set_fragment(None);
                url
            })
            .collect()
    }

    /// HTML handed to the content pipeline.
    ///
    /// Without a selector this is the whole cleaned document. With one, it is
    /// the outer HTML of the first matching element, or `None` when nothing
    /// matches. A selector that does not parse is an error.
    pub fn content_html(&self, selector: Option<&str>) -> Result<Option<String>> {
        let Some(selector) = selector else {
            return Ok(Some(self.html.html()));
        };

        let sel = Selector::parse(selector).map_err(|e| {
            SiteFetchError::parse(format!("invalid content selector '{selector}': {e}"))
        })?;

        Ok(self.html.select(&sel).next().map(|el| el.html()))
    }
}
