//! HTML-to-Markdown conversion and cleanup passes.
//!
//! Takes the article HTML chosen by the readability step and turns it into
//! Markdown with the `htmd` crate, then normalizes the result with a short
//! cleanup pipeline (blank lines, code fence languages, stray tags, links).

mod cleanup;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use sitefetch_shared::{Result, SiteFetchError};

/// Tags whose content never belongs in the Markdown output.
const SKIP_TAGS: [&str; 6] = ["script", "style", "nav", "iframe", "noscript", "svg"];

static TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));
static TR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("valid selector"));

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Convert article HTML to Markdown.
///
/// Relative links are resolved against `base_url` when one is given. The
/// returned text has no leading or trailing blank lines; it is empty when
/// the HTML carried no convertible content.
#[instrument(skip_all, fields(base = base_url.map(Url::as_str)))]
pub fn convert(content_html: &str, base_url: Option<&Url>) -> Result<String> {
    let (content_html, tables) = extract_tables(content_html);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(SKIP_TAGS.to_vec())
        .build();

    let raw_markdown = converter
        .convert(&content_html)
        .map_err(|e| SiteFetchError::Conversion(format!("htmd conversion failed: {e}")))?;

    let markdown = cleanup::run_pipeline(&restore_tables(&raw_markdown, &tables), base_url);

    debug!(
        raw_len = raw_markdown.len(),
        final_len = markdown.len(),
        "markdown conversion complete"
    );

    Ok(markdown)
}

// ---------------------------------------------------------------------------
// Table pre-processing
// ---------------------------------------------------------------------------

/// Marker prefix for tables lifted out of the HTML before conversion.
const TABLE_MARKER: &str = "SITEFETCHTABLE";

/// Lift `<table>` elements out of the HTML, rendering each as a Markdown
/// pipe table.
///
/// `htmd` 0.1 flattens tables into loose text, so every outermost table is
/// swapped for a placeholder paragraph and spliced back in after conversion
/// by [`restore_tables`].
fn extract_tables(html: &str) -> (String, Vec<String>) {
    let doc = Html::parse_fragment(html);
    if doc.select(&TABLE_SEL).next().is_none() {
        return (html.to_string(), Vec::new());
    }

    // Work on the re-serialized fragment so table markup matches byte for byte.
    let mut result = doc.root_element().inner_html();
    let mut tables = Vec::new();
    for table in doc.select(&TABLE_SEL) {
        // Nested tables are rendered as part of their outermost table.
        if table
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| el.value().name() == "table")
        {
            continue;
        }

        let outer = table.html();
        let marker = format!("<p>{TABLE_MARKER}{}</p>", tables.len());
        result = result.replacen(&outer, &marker, 1);
        tables.push(render_table(&table));
    }

    (result, tables)
}

/// Replace table placeholders in converted Markdown with the rendered tables.
fn restore_tables(markdown: &str, tables: &[String]) -> String {
    let mut result = markdown.to_string();
    // Highest index first so `..TABLE1` never clobbers `..TABLE10`.
    for (i, table) in tables.iter().enumerate().rev() {
        result = result.replacen(&format!("{TABLE_MARKER}{i}"), table, 1);
    }
    result
}

/// Render one table element as a Markdown pipe table.
///
/// The first row becomes the header row, whether or not it used `<th>`.
fn render_table(table: &ElementRef) -> String {
    let mut rows: Vec<Vec<String>> = table
        .select(&TR_SEL)
        .map(|tr| tr.select(&CELL_SEL).map(|cell| cell_text(&cell)).collect::<Vec<_>>())
        .filter(|row| !row.is_empty())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    for row in &mut rows {
        row.resize(width, String::new());
    }

    let mut md = String::new();
    for (i, row) in rows.iter().enumerate() {
        md.push_str("| ");
        md.push_str(&row.join(" | "));
        md.push_str(" |\n");

        if i == 0 {
            md.push_str("| ");
            md.push_str(&vec!["---"; width].join(" | "));
            md.push_str(" |\n");
        }
    }
    md.truncate(md.trim_end().len());
    md
}

/// Cell text on one line, with pipes escaped.
fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
