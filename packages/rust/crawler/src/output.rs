//! Rendering crawl results for output.

use std::fmt;
use std::str::FromStr;

use sitefetch_shared::{PageMap, Result, SiteFetchError};

/// Serialization format for a crawl result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON array of `{title, url, content}` objects.
    Json,
    /// `<page>` blocks separated by blank lines.
    #[default]
    Text,
}

impl FromStr for OutputFormat {
    type Err = SiteFetchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            other => Err(SiteFetchError::validation(format!(
                "unknown output format '{other}' (expected json or text)"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Text => "text",
        })
    }
}

/// Serialize pages in map order.
///
/// Text output is one trimmed `<page>` block per page, joined by a blank
/// line. Field values are written as-is, without escaping.
pub fn serialize_pages(pages: &PageMap, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let values: Vec<_> = pages.values().collect();
            serde_json::to_string(&values)
                .map_err(|e| SiteFetchError::Serialization(format!("JSON encoding failed: {e}")))
        }
        OutputFormat::Text => Ok(pages
            .values()
            .map(|page| {
                format!(
                    "<page>\n  <title>{}</title>\n  <url>{}</url>\n  <content>{}</content>\n</page>",
                    page.title, page.url, page.content
                )
                .trim()
                .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n\n")),
    }
}
