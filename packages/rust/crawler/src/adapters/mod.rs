//! Readability: locate a page's main article with platform adapters.
//!
//! Adapters recognise specific documentation platforms (Docusaurus, VitePress,
//! etc.) and know where each keeps its article body and which chrome to cut
//! from it. [`GenericAdapter`] covers everything else.

mod docusaurus;
mod generic;
mod gitbook;
mod readthedocs;
mod vitepress;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

pub use docusaurus::DocusaurusAdapter;
pub use generic::GenericAdapter;
pub use gitbook::GitBookAdapter;
pub use readthedocs::ReadTheDocsAdapter;
pub use vitepress::VitePressAdapter;

/// Chrome removed from every article, whatever the platform.
const COMMON_CHROME: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript", ".sidebar", ".nav",
];

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The main readable content of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Article heading, when the page has one.
    pub title: Option<String>,
    /// Article HTML with chrome removed.
    pub html: String,
}

/// Platform-specific knowledge for article extraction.
pub trait PlatformAdapter: Send + Sync {
    /// Whether this adapter should handle the document.
    fn detect(&self, doc: &Html) -> bool;

    /// Candidate article containers, most specific first.
    fn content_selectors(&self) -> &'static [&'static str];

    /// Platform chrome to cut from the container, on top of [`COMMON_CHROME`].
    fn chrome_selectors(&self) -> &'static [&'static str] {
        &[]
    }

    /// Human-readable adapter name for tracing.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds platform adapters in priority order.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn PlatformAdapter>>,
}

impl AdapterRegistry {
    /// Create a registry with all built-in adapters.
    pub fn new() -> Self {
        Self {
            adapters: vec![
                Box::new(DocusaurusAdapter),
                Box::new(VitePressAdapter),
                Box::new(GitBookAdapter),
                Box::new(ReadTheDocsAdapter),
            ],
        }
    }

    /// The adapter for `doc`, falling back to [`GenericAdapter`].
    pub fn detect(&self, doc: &Html) -> &dyn PlatformAdapter {
        self.adapters
            .iter()
            .map(AsRef::as_ref)
            .find(|adapter| adapter.detect(doc))
            .unwrap_or(&GenericAdapter)
    }

    /// Extract the article from an HTML document or fragment.
    ///
    /// Returns `None` when no container holds any text.
    pub fn parse(&self, html: &str) -> Option<Article> {
        let doc = Html::parse_document(html);
        let adapter = self.detect(&doc);
        debug!(adapter = adapter.name(), "extracting article");
        extract_article(doc, adapter)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

fn extract_article(mut doc: Html, adapter: &dyn PlatformAdapter) -> Option<Article> {
    let container = adapter
        .content_selectors()
        .iter()
        .chain(&["body"])
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|sel| doc.select(&sel).next())?;
    let container_id = container.id();

    let title = first_heading(&container).or_else(|| {
        Selector::parse("h1")
            .ok()
            .and_then(|h1| doc.select(&h1).find_map(|el| non_empty_text(&el)))
    });

    let chrome: Vec<_> = COMMON_CHROME
        .iter()
        .chain(adapter.chrome_selectors())
        .filter_map(|s| Selector::parse(s).ok())
        .flat_map(|sel| {
            container
                .select(&sel)
                .map(|el| el.id())
                .filter(|id| *id != container_id)
                .collect::<Vec<_>>()
        })
        .collect();

    for id in chrome {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    let container = doc.tree.get(container_id).and_then(ElementRef::wrap)?;
    if container.text().all(|t| t.trim().is_empty()) {
        return None;
    }

    Some(Article {
        title,
        html: container.html(),
    })
}

fn first_heading(container: &ElementRef) -> Option<String> {
    let h1 = Selector::parse("h1").ok()?;
    container.select(&h1).find_map(|el| non_empty_text(&el))
}

fn non_empty_text(el: &ElementRef) -> Option<String> {
    let text = el.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Whether any of `selectors` matches somewhere in `doc`.
pub(crate) fn has_any(doc: &Html, selectors: &[&str]) -> bool {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .any(|sel| doc.select(&sel).next().is_some())
}
