//! VitePress platform adapter.

use super::{PlatformAdapter, has_any};
use scraper::Html;

/// VitePress-generated sites.
pub struct VitePressAdapter;

impl PlatformAdapter for VitePressAdapter {
    fn detect(&self, doc: &Html) -> bool {
        has_any(doc, &["#VPContent", ".VPDoc", ".vp-doc"])
    }

    fn content_selectors(&self) -> &'static [&'static str] {
        &[".vp-doc", ".VPDoc", "#VPContent main", "main"]
    }

    fn chrome_selectors(&self) -> &'static [&'static str] {
        &[".header-anchor", ".edit-info", ".prev-next"]
    }

    fn name(&self) -> &'static str {
        "vitepress"
    }
}
