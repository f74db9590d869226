//! Glob-style pathname matching.
//!
//! Patterns are case-sensitive and slash-delimited:
//! - `*` matches within one path segment; a lone `*` segment needs at least one character
//! - `**` as a whole segment matches across segments; a trailing `/**` also matches the bare directory
//! - `?`, `[...]` and `[!...]` follow shell glob rules
//! - `{a,b}` alternation
//! - a leading `!` turns the whole pattern into an exclusion
//!
//! Wildcards never match a segment starting with `.` unless the dot is written
//! out in the pattern.

use glob::{MatchOptions, Pattern};

use crate::error::{Result, SiteFetchError};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Compiled set of include/exclude glob patterns.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathMatcher {
    /// Compile a list of patterns. Fails on malformed patterns.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut matcher = Self::default();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            match pattern.strip_prefix('!') {
                Some(negated) => matcher.exclude.extend(compile(negated)?),
                None => matcher.include.extend(compile(pattern)?),
            }
        }

        Ok(matcher)
    }

    /// `true` if the matcher has no patterns at all.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Whether `pathname` matches any include pattern and no exclude pattern.
    ///
    /// With only exclusions configured, every other pathname matches.
    pub fn is_match(&self, pathname: &str) -> bool {
        let hit = |p: &Pattern| p.matches_with(pathname, MATCH_OPTIONS);
        let included = self.include.is_empty() || self.include.iter().any(hit);
        included && !self.exclude.iter().any(hit)
    }
}

/// One-shot helper: compile `patterns` and test `pathname`.
pub fn match_path<S: AsRef<str>>(pathname: &str, patterns: &[S]) -> Result<bool> {
    Ok(PathMatcher::new(patterns)?.is_match(pathname))
}

/// Expand one user pattern into the `glob` patterns it stands for.
fn compile(pattern: &str) -> Result<Vec<Pattern>> {
    let mut globs = Vec::new();
    for alternative in expand_braces(pattern)? {
        let glob = normalize_segments(&alternative);
        if let Some(dir) = glob.strip_suffix("/**").filter(|dir| !dir.is_empty()) {
            globs.push(dir.to_string());
        }
        globs.push(glob);
    }

    globs
        .iter()
        .map(|glob| {
            Pattern::new(glob).map_err(|e| {
                SiteFetchError::config(format!("invalid match pattern '{pattern}': {e}"))
            })
        })
        .collect()
}

/// Expand `{a,b}` groups, innermost alternatives included. A group without a
/// comma is kept literally.
fn expand_braces(pattern: &str) -> Result<Vec<String>> {
    let Some(open) = pattern.find('{') else {
        return Ok(vec![pattern.to_string()]);
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut commas = Vec::new();
    for (offset, c) in pattern[open..].char_indices() {
        let i = open + offset;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            ',' if depth == 1 => commas.push(i),
            _ => {}
        }
    }

    let close = close.ok_or_else(|| {
        SiteFetchError::config(format!("unbalanced braces in match pattern '{pattern}'"))
    })?;
    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];

    if commas.is_empty() {
        let group = &pattern[open..=close];
        return Ok(expand_braces(suffix)?
            .into_iter()
            .map(|rest| format!("{prefix}{group}{rest}"))
            .collect());
    }

    let mut expanded = Vec::new();
    let mut start = open + 1;
    for end in commas.into_iter().chain([close]) {
        let alternative = &pattern[start..end];
        expanded.extend(expand_braces(&format!("{prefix}{alternative}{suffix}"))?);
        start = end + 1;
    }
    Ok(expanded)
}

/// `**` only spans segments when it is a whole segment; elsewhere it acts as
/// `*`. A lone `*` segment must not match an empty segment.
fn normalize_segments(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| {
            if segment == "**" {
                return segment.to_string();
            }
            let mut segment = segment.to_string();
            while segment.contains("**") {
                segment = segment.replace("**", "*");
            }
            if segment == "*" { "?*".to_string() } else { segment }
        })
        .collect::<Vec<_>>()
        .join("/")
}
