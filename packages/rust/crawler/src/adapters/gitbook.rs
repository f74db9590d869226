//! GitBook platform adapter.

use super::{PlatformAdapter, has_any};
use scraper::Html;

/// Legacy GitBook and honkit books.
pub struct GitBookAdapter;

impl PlatformAdapter for GitBookAdapter {
    fn detect(&self, doc: &Html) -> bool {
        has_any(doc, &[r#"meta[name="gitbook"]"#, ".gitbook-root", ".book-summary"])
    }

    fn content_selectors(&self) -> &'static [&'static str] {
        &[".markdown-section", ".page-inner section", "main section", "main"]
    }

    fn chrome_selectors(&self) -> &'static [&'static str] {
        &[".navigation", ".book-summary"]
    }

    fn name(&self) -> &'static str {
        "gitbook"
    }
}
