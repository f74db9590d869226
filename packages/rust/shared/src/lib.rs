//! Shared types, error model, configuration, and HTTP transport for sitefetch.
//!
//! This crate is the foundation depended on by all other sitefetch crates.
//! It provides:
//! - [`SiteFetchError`]: the unified error type
//! - Crawl output types ([`Page`], [`PageMap`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)
//! - Pathname glob matching ([`PathMatcher`])
//! - The pluggable transport ([`Fetch`], [`HttpFetcher`])

pub mod config;
pub mod error;
pub mod http;
pub mod matcher;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContentSelector, CrawlConfig, CrawlPoliciesConfig, DEFAULT_CONCURRENCY,
    DefaultsConfig, SelectorRule, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{Rejection, Result, SiteFetchError};
pub use http::{Fetch, FetchResponse, HttpFetcher, RequestInit, USER_AGENT};
pub use matcher::{PathMatcher, match_path};
pub use types::{Page, PageMap};
