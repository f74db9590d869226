//! Core domain types for crawl results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A successfully crawled page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Article title, or the document `<title>` when the extractor found none.
    pub title: String,
    /// The URL that was requested for this page.
    pub url: String,
    /// Main content as Markdown.
    pub content: String,
}

// ---------------------------------------------------------------------------
// PageMap
// ---------------------------------------------------------------------------

/// Ordered mapping from pathname to [`Page`].
///
/// Iteration follows insertion order, which for a crawl is completion order.
/// Re-inserting an existing pathname replaces the page in place.
pub type PageMap = IndexMap<String, Page>;
