//! Concurrent single-site crawler engine.
//!
//! The crawler starts from a seed URL (optionally preceded by the site's
//! sitemap entries), fetches pages with bounded concurrency, follows same-host
//! links, and collects each page's readable content as Markdown, keyed by
//! pathname.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, instrument, warn};
use url::Url;

use sitefetch_shared::{
    CrawlConfig, Fetch, HttpFetcher, Page, PageMap, PathMatcher, RequestInit, Result,
    SiteFetchError,
};

use crate::adapters::AdapterRegistry;
use crate::links::PageDocument;
use crate::policy;

// ---------------------------------------------------------------------------
// CrawlTarget
// ---------------------------------------------------------------------------

/// One unit of crawl work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Absolute URL to fetch.
    pub url: Url,
    /// Fetch even when the pathname fails the match patterns.
    pub skip_match: bool,
}

impl CrawlTarget {
    fn seed(url: Url) -> Self {
        Self {
            url,
            skip_match: true,
        }
    }

    fn discovered(url: Url) -> Self {
        Self {
            url,
            skip_match: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Concurrent crawler for a single site.
pub struct Crawler {
    config: Arc<CrawlConfig>,
    matcher: PathMatcher,
    fetcher: Arc<dyn Fetch>,
    registry: Arc<AdapterRegistry>,
    init: RequestInit,
}

impl Crawler {
    /// Create a crawler using the default HTTP transport.
    ///
    /// Fails when the configuration is invalid (zero concurrency, zero limit,
    /// malformed match patterns).
    pub fn new(config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let matcher = PathMatcher::new(&config.match_patterns)?;

        Ok(Self {
            config: Arc::new(config),
            matcher,
            fetcher: Arc::new(HttpFetcher::new()?),
            registry: Arc::new(AdapterRegistry::new()),
            init: RequestInit::default(),
        })
    }

    /// Replace the HTTP transport.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Crawl the site starting at `seed` and return every collected page.
    ///
    /// Per-page failures are logged and leave the page out of the result;
    /// they never fail the crawl.
    #[instrument(skip_all, fields(seed = %seed))]
    pub async fn crawl(&self, seed: &Url) -> Result<PageMap> {
        info!(concurrency = self.config.concurrency, "started fetching");

        let mut sitemap_targets = VecDeque::new();
        if self.config.enable_sitemap {
            info!("crawling sitemap");
            let urls =
                sitefetch_discovery::discover_sitemap(self.fetcher.as_ref(), seed, &self.init)
                    .await;
            sitemap_targets.extend(urls.into_iter().map(CrawlTarget::discovered));
        }

        let session = Arc::new(Session {
            config: Arc::clone(&self.config),
            matcher: self.matcher.clone(),
            fetcher: Arc::clone(&self.fetcher),
            registry: Arc::clone(&self.registry),
            init: self.init.clone(),
            visited: Mutex::new(HashSet::new()),
            pages: Mutex::new(PageMap::new()),
        });

        let seed_target = CrawlTarget::seed(seed.clone());
        run_scheduler(Arc::clone(&session), seed_target, sitemap_targets).await;

        let pages = std::mem::take(&mut *session.pages.lock().await);
        info!(pages = pages.len(), "crawl completed");

        Ok(pages)
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Run targets until the queue is drained and no task is in flight.
///
/// The seed runs alone; `held` targets join the queue once it finishes, so
/// the seed pathname and its page-limit slot are claimed first.
///
/// Tasks enqueue discovered links through an unbounded channel. The driver
/// keeps its own sender, so the channel never closes while the loop runs and
/// idleness is decided by the queue and the join set alone.
async fn run_scheduler(session: Arc<Session>, seed: CrawlTarget, held: VecDeque<CrawlTarget>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<CrawlTarget>();
    let mut tasks: JoinSet<(Url, Result<()>)> = JoinSet::new();
    let concurrency = session.config.concurrency;

    let mut queue = VecDeque::from([seed]);
    let mut held = Some(held);

    loop {
        while let Ok(target) = rx.try_recv() {
            queue.push_back(target);
        }

        while tasks.len() < concurrency {
            let Some(target) = queue.pop_front() else {
                break;
            };
            let session = Arc::clone(&session);
            let tx = tx.clone();
            tasks.spawn(async move {
                let result = session.visit(&target, &tx).await;
                (target.url, result)
            });
        }

        if tasks.is_empty() {
            break;
        }

        tokio::select! {
            Some(target) = rx.recv() => queue.push_back(target),
            Some(joined) = tasks.join_next() => {
                log_outcome(joined);
                if let Some(held) = held.take() {
                    queue.extend(held);
                }
            }
        }
    }
}

fn log_outcome(joined: std::result::Result<(Url, Result<()>), JoinError>) {
    match joined {
        Ok((_, Ok(()))) => {}
        Ok((url, Err(SiteFetchError::Rejected(rejection)))) => {
            warn!(%url, reason = %rejection, "page skipped");
        }
        Ok((url, Err(e))) => warn!(%url, error = %e, "failed to fetch page"),
        Err(e) if e.is_panic() => warn!(error = %e, "crawl task panicked"),
        Err(e) => warn!(error = %e, "crawl task aborted"),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Shared state for one crawl.
struct Session {
    config: Arc<CrawlConfig>,
    matcher: PathMatcher,
    fetcher: Arc<dyn Fetch>,
    registry: Arc<AdapterRegistry>,
    init: RequestInit,
    /// Pathnames already taken by a task.
    visited: Mutex<HashSet<String>>,
    pages: Mutex<PageMap>,
}

impl Session {
    /// Process one target: gate, fetch, policy, link discovery, content.
    async fn visit(
        &self,
        target: &CrawlTarget,
        tx: &mpsc::UnboundedSender<CrawlTarget>,
    ) -> Result<()> {
        let url = &target.url;
        let pathname = url.path().to_string();

        if !self.admit(&pathname).await {
            return Ok(());
        }

        if !target.skip_match && !self.matcher.is_match(&pathname) {
            debug!(%url, "pathname not matched, skipping");
            return Ok(());
        }

        info!(%url, "fetching");
        let response = self.fetcher.fetch(url, &self.init).await?;
        policy::check_response(url, &response, self.config.follow_domain_redirects)?;

        if self.limit_reached().await {
            debug!(%url, "page limit reached, dropping response");
            return Ok(());
        }

        // Links resolve against the final URL, which differs from `url` only
        // after a followed redirect.
        let base = &response.url;
        let (links, page) = {
            let document = PageDocument::parse(response.text());
            let links = document.links(base);
            let page = self.build_page(&document, url, &pathname, base);
            (links, page)
        };

        let outcome = match page {
            Ok(Some(page)) => {
                self.record(pathname, page).await;
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };

        debug!(%url, links = links.len(), "discovered links");
        for link in links {
            // The driver holds a sender, so the channel is open for the whole crawl.
            let _ = tx.send(CrawlTarget::discovered(link));
        }

        outcome
    }

    /// Mark `pathname` visited unless it already is or the limit is reached.
    async fn admit(&self, pathname: &str) -> bool {
        let mut visited = self.visited.lock().await;
        if visited.contains(pathname) || self.limit_reached().await {
            return false;
        }
        visited.insert(pathname.to_string());
        true
    }

    async fn limit_reached(&self) -> bool {
        match self.config.limit {
            Some(limit) => self.pages.lock().await.len() >= limit,
            None => false,
        }
    }

    /// Run the content pipeline. `Ok(None)` means the page has no readable content.
    fn build_page(
        &self,
        document: &PageDocument,
        url: &Url,
        pathname: &str,
        base: &Url,
    ) -> Result<Option<Page>> {
        let selector = self
            .config
            .content_selector
            .as_ref()
            .and_then(|s| s.resolve(pathname))
            .filter(|s| !s.trim().is_empty());

        let Some(html) = document.content_html(selector.as_deref())? else {
            warn!(%pathname, "no readable content");
            return Ok(None);
        };

        let Some(article) = self.registry.parse(&html) else {
            warn!(%pathname, "no readable content");
            return Ok(None);
        };

        let content = sitefetch_markdown::convert(&article.html, Some(base))?;
        let title = article
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| document.title());

        Ok(Some(Page {
            title,
            url: url.to_string(),
            content,
        }))
    }

    /// Store a finished page unless the limit filled up in the meantime.
    async fn record(&self, pathname: String, page: Page) {
        let mut pages = self.pages.lock().await;
        if self.config.limit.is_some_and(|limit| pages.len() >= limit) {
            debug!(%pathname, "page limit reached, discarding page");
            return;
        }
        pages.insert(pathname, page);
    }
}

#[cfg(test)]
mod crawler_tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use sitefetch_shared::{ContentSelector, FetchResponse};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn html(body: impl Into<String>) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
    }

    fn article(title: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{href}">{href}</a> "#))
            .collect();
        format!(
            "<html><head><title>{title} | Site</title></head><body>\
             <main><h1>{title}</h1><p>Welcome to {title}.</p><p>{anchors}</p></main>\
             </body></html>"
        )
    }

    async fn mount_page(server: &MockServer, at: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(html(body))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_unreachable(server: &MockServer, at: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(html(article("Unreachable", &[])))
            .expect(0)
            .mount(server)
            .await;
    }

    async fn crawl(server: &MockServer, config: CrawlConfig) -> PageMap {
        let seed = Url::parse(&format!("{}/", server.uri())).unwrap();
        Crawler::new(config).unwrap().crawl(&seed).await.unwrap()
    }

    fn keys(pages: &PageMap) -> Vec<&str> {
        let mut keys: Vec<&str> = pages.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    #[tokio::test]
    async fn test_crawl_follows_links() {
        let server = MockServer::start().await;

        mount_page(&server, "/", article("Home", &["/page2"])).await;
        mount_page(&server, "/page2", article("Page Two", &["/page3", "/"])).await;
        mount_page(&server, "/page3", article("Page Three", &["/page2#top"])).await;

        let pages = crawl(&server, CrawlConfig::default()).await;

        assert_eq!(keys(&pages), vec!["/", "/page2", "/page3"]);
        let page2 = pages.get("/page2").unwrap();
        assert_eq!(page2.title, "Page Two");
        assert_eq!(page2.url, format!("{}/page2", server.uri()));
        assert!(page2.content.contains("Welcome to Page Two."));
    }

    #[tokio::test]
    async fn test_duplicate_links_fetched_once() {
        let server = MockServer::start().await;

        mount_page(&server, "/", article("Home", &["/a", "/b", "/a?x=1", "/a#frag"])).await;
        mount_page(&server, "/a", article("A", &["/b", "/", "/a"])).await;
        mount_page(&server, "/b", article("B", &["/a", "/"])).await;

        let pages = crawl(
            &server,
            CrawlConfig {
                concurrency: 4,
                ..CrawlConfig::default()
            },
        )
        .await;

        assert_eq!(keys(&pages), vec!["/", "/a", "/b"]);
        // `expect(1)` on every mock is verified when the server drops.
    }

    #[tokio::test]
    async fn test_limit_caps_result() {
        let server = MockServer::start().await;

        let links = ["/p1", "/p2", "/p3", "/p4", "/p5"];
        mount_page(&server, "/", article("Home", &links)).await;
        for link in links {
            Mock::given(path(link))
                .respond_with(html(article(link, &[])))
                .mount(&server)
                .await;
        }

        let pages = crawl(
            &server,
            CrawlConfig {
                limit: Some(2),
                ..CrawlConfig::default()
            },
        )
        .await;

        assert_eq!(pages.len(), 2);
        assert!(pages.contains_key("/"));
    }

    #[tokio::test]
    async fn test_match_patterns_filter_discovered_pages() {
        let server = MockServer::start().await;

        mount_page(&server, "/", article("Home", &["/docs/intro", "/blog/post"])).await;
        mount_page(&server, "/docs/intro", article("Intro", &[])).await;
        // Never fetched, so its links are never discovered either.
        mount_unreachable(&server, "/blog/post").await;
        mount_unreachable(&server, "/docs/only-linked-from-blog").await;

        let pages = crawl(
            &server,
            CrawlConfig {
                match_patterns: vec!["/docs/**".into()],
                ..CrawlConfig::default()
            },
        )
        .await;

        // The seed is kept even though it does not match.
        assert_eq!(keys(&pages), vec!["/", "/docs/intro"]);
    }

    #[tokio::test]
    async fn test_cross_host_links_not_followed() {
        let server = MockServer::start().await;
        let other = MockServer::start().await;

        let external = format!("{}/external", other.uri());
        mount_page(&server, "/", article("Home", &[external.as_str(), "/local"])).await;
        mount_page(&server, "/local", article("Local", &[])).await;
        mount_unreachable(&other, "/external").await;

        let pages = crawl(&server, CrawlConfig::default()).await;
        assert_eq!(keys(&pages), vec!["/", "/local"]);
    }

    #[tokio::test]
    async fn test_stripped_elements_hide_links() {
        let server = MockServer::start().await;

        let home = r#"<html><body><main><h1>Home</h1><p>Text.</p>
            <video><a href="/in-video">video fallback</a></video>
            <script>document.write('<a href="/in-script">x</a>')</script>
        </main></body></html>"#;
        mount_page(&server, "/", home.to_string()).await;
        mount_unreachable(&server, "/in-video").await;
        mount_unreachable(&server, "/in-script").await;

        let pages = crawl(&server, CrawlConfig::default()).await;
        assert_eq!(keys(&pages), vec!["/"]);
    }

    #[tokio::test]
    async fn test_failed_pages_are_skipped() {
        let server = MockServer::start().await;

        mount_page(&server, "/", article("Home", &["/missing", "/data", "/ok"])).await;
        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/data"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"a":1}"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_page(&server, "/ok", article("Ok", &[])).await;

        let pages = crawl(&server, CrawlConfig::default()).await;
        assert_eq!(keys(&pages), vec!["/", "/ok"]);
    }

    #[tokio::test]
    async fn test_sitemap_seeds_queue() {
        let server = MockServer::start().await;

        let sitemap = format!(
            "<urlset><url><loc>{0}/a</loc></url><url><loc>{0}/b</loc></url></urlset>",
            server.uri()
        );
        Mock::given(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
            .expect(1)
            .mount(&server)
            .await;
        mount_page(&server, "/", article("Home", &[])).await;
        mount_page(&server, "/a", article("A", &[])).await;
        mount_page(&server, "/b", article("B", &[])).await;

        let pages = crawl(
            &server,
            CrawlConfig {
                enable_sitemap: true,
                ..CrawlConfig::default()
            },
        )
        .await;

        assert_eq!(keys(&pages), vec!["/", "/a", "/b"]);
    }

    #[tokio::test]
    async fn test_sitemap_entries_respect_match_but_seed_does_not() {
        let server = MockServer::start().await;

        let sitemap = format!(
            "<urlset><url><loc>{0}/</loc></url><url><loc>{0}/docs/a</loc></url>\
             <url><loc>{0}/blog/b</loc></url></urlset>",
            server.uri()
        );
        Mock::given(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
            .mount(&server)
            .await;
        mount_page(&server, "/", article("Home", &[])).await;
        mount_page(&server, "/docs/a", article("A", &[])).await;
        mount_unreachable(&server, "/blog/b").await;

        let pages = crawl(
            &server,
            CrawlConfig {
                enable_sitemap: true,
                match_patterns: vec!["/docs/**".into()],
                ..CrawlConfig::default()
            },
        )
        .await;

        assert_eq!(keys(&pages), vec!["/", "/docs/a"]);
    }

    #[tokio::test]
    async fn test_missing_sitemap_falls_back_to_links() {
        let server = MockServer::start().await;

        Mock::given(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        mount_page(&server, "/", article("Home", &["/next"])).await;
        mount_page(&server, "/next", article("Next", &[])).await;

        let pages = crawl(
            &server,
            CrawlConfig {
                enable_sitemap: true,
                ..CrawlConfig::default()
            },
        )
        .await;

        assert_eq!(keys(&pages), vec!["/", "/next"]);
    }

    #[tokio::test]
    async fn test_seed_kept_when_sitemap_pages_answer_first() {
        let server = MockServer::start().await;

        let sitemap = format!(
            "<urlset><url><loc>{0}/a</loc></url><url><loc>{0}/b</loc></url>\
             <url><loc>{0}/c</loc></url></urlset>",
            server.uri()
        );
        Mock::given(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
            .mount(&server)
            .await;
        Mock::given(path("/"))
            .respond_with(html(article("Home", &[])).set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&server)
            .await;
        for page in ["/a", "/b", "/c"] {
            mount_unreachable(&server, page).await;
        }

        let pages = crawl(
            &server,
            CrawlConfig {
                enable_sitemap: true,
                limit: Some(1),
                ..CrawlConfig::default()
            },
        )
        .await;

        assert_eq!(keys(&pages), vec!["/"]);
    }

    async fn redirecting_pair() -> (MockServer, MockServer) {
        let origin = MockServer::start().await;
        let target = MockServer::start().await;

        Mock::given(path("/"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/landing", target.uri()).as_str()),
            )
            .mount(&origin)
            .await;

        let origin_only = format!("{}/origin-only", origin.uri());
        let landing = article("Landing", &["/next", origin_only.as_str()]);
        Mock::given(path("/landing"))
            .respond_with(html(landing))
            .mount(&target)
            .await;
        Mock::given(path("/next"))
            .respond_with(html(article("Next", &[])))
            .mount(&target)
            .await;
        mount_unreachable(&origin, "/origin-only").await;

        (origin, target)
    }

    #[tokio::test]
    async fn test_cross_domain_redirect_rejected_by_default() {
        let (origin, _target) = redirecting_pair().await;

        let pages = crawl(&origin, CrawlConfig::default()).await;
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn test_cross_domain_redirect_followed_when_enabled() {
        let (origin, target) = redirecting_pair().await;

        let pages = crawl(
            &origin,
            CrawlConfig {
                follow_domain_redirects: true,
                ..CrawlConfig::default()
            },
        )
        .await;

        // Keyed by the requested pathname, links taken from the target host.
        let home = pages.get("/").unwrap();
        assert_eq!(home.title, "Landing");
        assert_eq!(home.url, format!("{}/", origin.uri()));

        let next = pages.get("/next").unwrap();
        assert_eq!(next.url, format!("{}/next", target.uri()));
        assert_eq!(pages.len(), 2);
    }

    #[tokio::test]
    async fn test_content_selector_narrows_and_filters() {
        let server = MockServer::start().await;

        let home = r#"<html><head><title>Home Title</title></head><body>
            <div class="doc"><p>Selected text.</p><a href="/plain">plain</a></div>
            <div class="other"><p>Ignored text.</p></div>
        </body></html>"#;
        mount_page(&server, "/", home.to_string()).await;
        mount_page(&server, "/plain", "<html><body><p>No doc div.</p></body></html>".into()).await;

        let pages = crawl(
            &server,
            CrawlConfig {
                content_selector: Some(ContentSelector::from(".doc")),
                ..CrawlConfig::default()
            },
        )
        .await;

        assert_eq!(keys(&pages), vec!["/"]);
        let home = pages.get("/").unwrap();
        assert_eq!(home.title, "Home Title");
        assert!(home.content.contains("Selected text."));
        assert!(!home.content.contains("Ignored text."));
    }

    #[tokio::test]
    async fn test_dynamic_content_selector() {
        let server = MockServer::start().await;

        mount_page(&server, "/", article("Home", &["/blog/post"])).await;
        let post = r#"<html><body><article class="post"><h1>Post</h1><p>Body.</p></article>
            <div class="comments">Comment spam</div></body></html>"#;
        mount_page(&server, "/blog/post", post.to_string()).await;

        let selector = ContentSelector::dynamic(|pathname| {
            pathname.starts_with("/blog/").then(|| "article.post".to_string())
        });
        let pages = crawl(
            &server,
            CrawlConfig {
                content_selector: Some(selector),
                ..CrawlConfig::default()
            },
        )
        .await;

        assert_eq!(keys(&pages), vec!["/", "/blog/post"]);
        let post = pages.get("/blog/post").unwrap();
        assert!(post.content.contains("Body."));
        assert!(!post.content.contains("Comment spam"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        for config in [
            CrawlConfig {
                concurrency: 0,
                ..CrawlConfig::default()
            },
            CrawlConfig {
                limit: Some(0),
                ..CrawlConfig::default()
            },
            CrawlConfig {
                match_patterns: vec!["/docs/{a,b".into()],
                ..CrawlConfig::default()
            },
        ] {
            assert!(matches!(Crawler::new(config), Err(SiteFetchError::Config { .. })));
        }
    }

    /// In-memory transport keyed by path; panics on `/boom`.
    struct ScriptedFetch {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl Fetch for ScriptedFetch {
        async fn fetch(&self, url: &Url, _init: &RequestInit) -> Result<FetchResponse> {
            if url.path() == "/boom" {
                panic!("transport exploded");
            }
            let response = match self.pages.get(url.path()) {
                Some(body) => FetchResponse::new(url.clone(), 200)
                    .with_header("content-type", "text/html")
                    .with_body(body.clone()),
                None => FetchResponse::new(url.clone(), 404),
            };
            Ok(response)
        }
    }

    /// Transport that records the highest number of overlapping fetches.
    #[derive(Default)]
    struct CountingFetch {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Fetch for CountingFetch {
        async fn fetch(&self, url: &Url, _init: &RequestInit) -> Result<FetchResponse> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let links: &[&str] = if url.path() == "/" {
                &["/p1", "/p2", "/p3", "/p4", "/p5", "/p6"]
            } else {
                &[]
            };
            Ok(FetchResponse::new(url.clone(), 200)
                .with_header("content-type", "text/html")
                .with_body(article(url.path(), links)))
        }
    }

    #[tokio::test]
    async fn test_concurrency_bounds_in_flight_fetches() {
        let fetcher = Arc::new(CountingFetch::default());
        let transport: Arc<dyn Fetch> = fetcher.clone();
        let crawler = Crawler::new(CrawlConfig {
            concurrency: 2,
            ..CrawlConfig::default()
        })
        .unwrap()
        .with_fetcher(transport);

        let seed = Url::parse("https://site.test/").unwrap();
        let pages = crawler.crawl(&seed).await.unwrap();

        assert_eq!(pages.len(), 7);
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_custom_fetcher_and_task_panic_isolation() {
        let pages = HashMap::from([
            ("/".to_string(), article("Home", &["/boom", "/fine", "/gone"])),
            ("/fine".to_string(), article("Fine", &[])),
        ]);
        let crawler = Crawler::new(CrawlConfig::default())
            .unwrap()
            .with_fetcher(Arc::new(ScriptedFetch { pages }));

        let seed = Url::parse("https://site.test/").unwrap();
        let result = crawler.crawl(&seed).await.unwrap();

        assert_eq!(keys(&result), vec!["/", "/fine"]);
        assert_eq!(result.get("/fine").unwrap().url, "https://site.test/fine");
    }
}
