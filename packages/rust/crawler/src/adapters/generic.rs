//! Generic (fallback) platform adapter.

use super::PlatformAdapter;
use scraper::Html;

/// Arbitrary HTML pages. Used when no platform adapter matches.
pub struct GenericAdapter;

impl PlatformAdapter for GenericAdapter {
    fn detect(&self, _doc: &Html) -> bool {
        true
    }

    fn content_selectors(&self) -> &'static [&'static str] {
        &["main", "article", r#"[role="main"]"#, ".content"]
    }

    fn name(&self) -> &'static str {
        "generic"
    }
}
