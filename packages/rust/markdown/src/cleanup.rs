//! Post-conversion cleanup pipeline for Markdown output.
//!
//! Each pass is a `&str -> String` function applied in sequence.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

/// Run the full cleanup pipeline on raw Markdown text.
pub(crate) fn run_pipeline(md: &str, base_url: Option<&Url>) -> String {
    let mut result = fix_code_block_languages(md);
    result = strip_leftover_html(&result);
    if let Some(base) = base_url {
        result = resolve_links(&result, base);
    }
    result = trim_line_ends(&result);
    result = collapse_blank_lines(&result);

    result.trim_matches('\n').to_string()
}

// ---------------------------------------------------------------------------
// Code fences
// ---------------------------------------------------------------------------

/// Turn class-style fence hints (`language-js`, `lang-py`, `highlight-rust`)
/// into bare language names.
fn fix_code_block_languages(md: &str) -> String {
    static LANG_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^(\s*)```(?:language-|lang-|highlight-)([\w+#-]+)").expect("valid regex")
    });

    LANG_PREFIX_RE.replace_all(md, "$1```$2").into_owned()
}

// ---------------------------------------------------------------------------
// Leftover markup
// ---------------------------------------------------------------------------

/// Drop layout tags that `htmd` passes through verbatim, keeping their text.
fn strip_leftover_html(md: &str) -> String {
    static LAYOUT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"</?(?:div|span|section|article|aside|header|footer|figure|figcaption|details|summary|main)(?:\s[^>]*)?>",
        )
        .expect("valid regex")
    });

    map_prose_lines(md, |line| LAYOUT_TAG_RE.replace_all(line, "").into_owned())
}

/// Apply `f` to every line outside fenced code blocks. Fence lines and code
/// are copied unchanged.
fn map_prose_lines(md: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut in_fence = false;
    md.lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                return line.to_string();
            }
            if in_fence { line.to_string() } else { f(line) }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// Resolve relative link and image targets against `base`.
///
/// Absolute URLs, in-page anchors and `mailto:` targets are kept as written.
fn resolve_links(md: &str, base: &Url) -> String {
    static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(!?)\[([^\]]*)\]\(([^)\s]+)((?:\s+"[^"]*")?)\)"#).expect("valid regex")
    });

    LINK_RE
        .replace_all(md, |caps: &Captures| {
            let href = &caps[3];
            let keep = href.starts_with('#')
                || href.starts_with("mailto:")
                || Url::parse(href).is_ok();

            let target = if keep {
                href.to_string()
            } else {
                base.join(href)
                    .map(String::from)
                    .unwrap_or_else(|_| href.to_string())
            };

            format!("{}[{}]({target}{})", &caps[1], &caps[2], &caps[4])
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Whitespace
// ---------------------------------------------------------------------------

fn trim_line_ends(md: &str) -> String {
    map_prose_lines(md, |line| line.trim_end().to_string())
}

/// Collapse runs of blank lines to a single blank line. Blank lines inside
/// fenced code are kept.
fn collapse_blank_lines(md: &str) -> String {
    let mut in_fence = false;
    let mut previous_blank = false;
    let mut lines = Vec::new();

    for line in md.split('\n') {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        } else if !in_fence && line.is_empty() {
            if previous_blank {
                continue;
            }
            previous_blank = true;
            lines.push(line);
            continue;
        }
        previous_blank = false;
        lines.push(line);
    }

    lines.join("\n")
}
