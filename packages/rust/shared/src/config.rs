//! Application configuration for sitefetch.
//!
//! User config lives at `~/.sitefetch/sitefetch.toml`.
//! CLI flags override config file values, which override defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteFetchError};
use crate::matcher::PathMatcher;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sitefetch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sitefetch";

/// Default number of pages fetched at the same time.
pub const DEFAULT_CONCURRENCY: usize = 3;

// ---------------------------------------------------------------------------
// Config structs (matching sitefetch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Crawl policies.
    #[serde(default)]
    pub crawl_policies: CrawlPoliciesConfig,

    /// Per-path content selector rules, first match wins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_selectors: Vec<SelectorRule>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// How many pages are fetched at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Seed the crawl from `/sitemap.xml` when available.
    #[serde(default)]
    pub enable_sitemap: bool,

    /// Keep processing pages that redirect to another host.
    #[serde(default)]
    pub follow_domain_redirects: bool,

    /// Stop collecting once this many pages are stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            enable_sitemap: false,
            follow_domain_redirects: false,
            limit: None,
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

/// `[crawl_policies]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlPoliciesConfig {
    /// Pathname glob patterns; only matching pages are fetched.
    #[serde(rename = "match", default)]
    pub match_patterns: Vec<String>,

    /// CSS selector narrowing each page to its content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_selector: Option<String>,
}

/// `[[content_selectors]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorRule {
    /// Pathname glob pattern this rule applies to.
    #[serde(rename = "match")]
    pub pattern: String,
    /// CSS selector used for matching pages.
    pub selector: String,
}

// ---------------------------------------------------------------------------
// Content selector strategy
// ---------------------------------------------------------------------------

/// Picks the CSS selector that narrows a page to its main content.
#[derive(Clone)]
pub enum ContentSelector {
    /// The same selector for every page.
    Static(String),
    /// Selector computed from the pathname; `None` means the whole document.
    Dynamic(Arc<dyn Fn(&str) -> Option<String> + Send + Sync>),
}

impl ContentSelector {
    /// Build a per-pathname selector from a closure.
    pub fn dynamic(f: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(f))
    }

    /// Resolve the selector for one page.
    pub fn resolve(&self, pathname: &str) -> Option<String> {
        match self {
            Self::Static(selector) => Some(selector.clone()),
            Self::Dynamic(f) => f(pathname),
        }
    }
}

impl fmt::Debug for ContentSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(selector) => f.debug_tuple("Static").field(selector).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for ContentSelector {
    fn from(selector: &str) -> Self {
        Self::Static(selector.to_string())
    }
}

impl From<String> for ContentSelector {
    fn from(selector: String) -> Self {
        Self::Static(selector)
    }
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration. Read-only for the duration of a crawl.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Maximum number of pages processed at the same time.
    pub concurrency: usize,
    /// Pathname glob patterns; empty means every page matches.
    pub match_patterns: Vec<String>,
    /// Selector narrowing pages to their content.
    pub content_selector: Option<ContentSelector>,
    /// Maximum number of pages in the result.
    pub limit: Option<usize>,
    /// Seed the queue from `/sitemap.xml`.
    pub enable_sitemap: bool,
    /// Process pages whose final URL is on another host.
    pub follow_domain_redirects: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            match_patterns: Vec::new(),
            content_selector: None,
            limit: None,
            enable_sitemap: false,
            follow_domain_redirects: false,
        }
    }
}

impl CrawlConfig {
    /// Reject settings no crawl can run with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(SiteFetchError::config("concurrency must be greater than 0"));
        }
        if self.limit == Some(0) {
            return Err(SiteFetchError::config("limit must be greater than 0"));
        }
        PathMatcher::new(&self.match_patterns)?;
        Ok(())
    }
}

impl TryFrom<&AppConfig> for CrawlConfig {
    type Error = SiteFetchError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let fallback = config.crawl_policies.content_selector.clone();

        let content_selector = if config.content_selectors.is_empty() {
            fallback.map(ContentSelector::Static)
        } else {
            let rules = config
                .content_selectors
                .iter()
                .map(|rule| -> Result<(PathMatcher, String)> {
                    Ok((PathMatcher::new(&[&rule.pattern])?, rule.selector.clone()))
                })
                .collect::<Result<Vec<_>>>()?;

            Some(ContentSelector::dynamic(move |pathname| {
                rules
                    .iter()
                    .find(|(matcher, _)| matcher.is_match(pathname))
                    .map(|(_, selector)| selector.clone())
                    .or_else(|| fallback.clone())
            }))
        };

        Ok(Self {
            concurrency: config.defaults.concurrency,
            match_patterns: config.crawl_policies.match_patterns.clone(),
            content_selector,
            limit: config.defaults.limit,
            enable_sitemap: config.defaults.enable_sitemap,
            follow_domain_redirects: config.defaults.follow_domain_redirects,
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sitefetch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SiteFetchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sitefetch/sitefetch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SiteFetchError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SiteFetchError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SiteFetchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SiteFetchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SiteFetchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("concurrency = 3"));
        assert!(toml_str.contains("enable_sitemap = false"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.concurrency, 3);
        assert!(parsed.defaults.limit.is_none());
    }

    #[test]
    fn config_with_policies_and_rules() {
        let toml_str = r#"
[defaults]
concurrency = 5
enable_sitemap = true
limit = 20

[crawl_policies]
match = ["/docs/**", "!/docs/internal/**"]
content_selector = "main"

[[content_selectors]]
match = "/blog/**"
selector = "article"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.concurrency, 5);
        assert!(config.defaults.enable_sitemap);
        assert_eq!(config.crawl_policies.match_patterns.len(), 2);
        assert_eq!(config.content_selectors[0].selector, "article");

        let crawl = CrawlConfig::try_from(&config).expect("crawl config");
        assert_eq!(crawl.limit, Some(20));
        let selector = crawl.content_selector.expect("selector");
        assert_eq!(selector.resolve("/blog/post"), Some("article".into()));
        assert_eq!(selector.resolve("/docs/intro"), Some("main".into()));
    }

    #[test]
    fn selector_rules_without_fallback_resolve_to_none() {
        let config = AppConfig {
            content_selectors: vec![SelectorRule {
                pattern: "/blog/**".into(),
                selector: "article".into(),
            }],
            ..AppConfig::default()
        };
        let crawl = CrawlConfig::try_from(&config).expect("crawl config");
        let selector = crawl.content_selector.expect("selector");
        assert_eq!(selector.resolve("/about"), None);
    }

    #[test]
    fn crawl_config_from_app_config() {
        let app = AppConfig::default();
        let crawl = CrawlConfig::try_from(&app).expect("crawl config");
        assert_eq!(crawl.concurrency, 3);
        assert!(crawl.content_selector.is_none());
        assert!(!crawl.follow_domain_redirects);
    }

    #[test]
    fn validate_rejects_zero_concurrency_and_limit() {
        let config = CrawlConfig {
            concurrency: 0,
            ..CrawlConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CrawlConfig {
            limit: Some(0),
            ..CrawlConfig::default()
        };
        assert!(config.validate().is_err());

        assert!(CrawlConfig::default().validate().is_ok());
    }

    #[test]
    fn load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[defaults]\nconcurrency = 7").expect("write");

        let config = load_config_from(file.path()).expect("load");
        assert_eq!(config.defaults.concurrency, 7);
        assert!(config.crawl_policies.match_patterns.is_empty());
    }

    #[test]
    fn load_config_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "this is not toml {{{{").expect("write");

        let err = load_config_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
