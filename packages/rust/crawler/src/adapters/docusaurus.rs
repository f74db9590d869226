//! Docusaurus platform adapter.

use super::{PlatformAdapter, has_any};
use scraper::{Html, Selector};

/// Docusaurus-powered documentation sites.
pub struct DocusaurusAdapter;

impl PlatformAdapter for DocusaurusAdapter {
    fn detect(&self, doc: &Html) -> bool {
        // <meta name="generator" content="Docusaurus v3...">
        let generator = Selector::parse(r#"meta[name="generator"]"#)
            .ok()
            .and_then(|sel| {
                doc.select(&sel)
                    .find_map(|el| el.value().attr("content").map(str::to_lowercase))
            });

        generator.is_some_and(|g| g.contains("docusaurus"))
            || has_any(doc, &["[data-docusaurus-version]", ".theme-doc-markdown"])
    }

    fn content_selectors(&self) -> &'static [&'static str] {
        &["article .markdown", ".theme-doc-markdown", "article", "main"]
    }

    fn chrome_selectors(&self) -> &'static [&'static str] {
        &[".theme-doc-footer", ".pagination-nav", ".theme-doc-toc-mobile", ".hash-link"]
    }

    fn name(&self) -> &'static str {
        "docusaurus"
    }
}
