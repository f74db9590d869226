//! Read the Docs / Sphinx platform adapter.

use super::{PlatformAdapter, has_any};
use scraper::Html;

/// Sphinx sites, typically hosted on Read the Docs.
pub struct ReadTheDocsAdapter;

impl PlatformAdapter for ReadTheDocsAdapter {
    fn detect(&self, doc: &Html) -> bool {
        has_any(
            doc,
            &[
                r#"meta[name="readthedocs"]"#,
                ".wy-nav-side",
                ".wy-body-for-nav",
                ".rst-content",
            ],
        )
    }

    fn content_selectors(&self) -> &'static [&'static str] {
        &[r#"[role="main"]"#, ".document", ".rst-content .section", "main"]
    }

    fn chrome_selectors(&self) -> &'static [&'static str] {
        &[r#"[role="navigation"]"#, ".headerlink", ".rst-footer-buttons"]
    }

    fn name(&self) -> &'static str {
        "readthedocs"
    }
}
