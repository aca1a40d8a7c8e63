// src/pipeline/engine.rs

//! The page crawl engine: plain and content-checked variants.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{SiteConfig, UrlCategory};
use crate::pipeline::{continue_crawling, pop_any, restore_frontier};
use crate::services::checkers::CheckerFn;
use crate::services::fetch::PageFetcher;
use crate::services::politeness::{DelayRange, RobotsGate};
use crate::services::{classify, extract};
use crate::storage::{GoalDirs, Log, PageStore, TrackingFiles};

/// A named content checker plus the flag deciding whether board pages also
/// have to pass it before being stored.
#[derive(Clone, Copy)]
pub struct CheckerSpec {
    pub func: CheckerFn,
    pub check_board: bool,
}

impl CheckerSpec {
    pub fn new(func: CheckerFn) -> Self {
        Self {
            func,
            check_board: true,
        }
    }
}

/// Sequential fetch/classify/store/enqueue loop over one site.
///
/// State is rebuilt from the tracking logs at construction, so killing the
/// process and constructing a new engine on the same directory resumes the
/// crawl without re-fetching anything already visited.
pub struct CrawlEngine {
    site: SiteConfig,
    logs: TrackingFiles,
    store: PageStore,
    fetcher: Box<dyn PageFetcher>,
    robots: Option<RobotsGate>,
    delay: DelayRange,
    checker: Option<CheckerSpec>,
    frontier: HashSet<String>,
    visited: HashSet<String>,
}

impl CrawlEngine {
    /// Plain variant: URL shape alone decides where a page is stored.
    pub fn classic(
        site_root: impl AsRef<Path>,
        site: SiteConfig,
        fetcher: Box<dyn PageFetcher>,
        delay: DelayRange,
    ) -> Result<Self> {
        Self::init(site_root, site, fetcher, delay, None)
    }

    /// Checked variant: storage additionally requires the checker to accept
    /// the fetched content.
    pub fn checked(
        site_root: impl AsRef<Path>,
        site: SiteConfig,
        fetcher: Box<dyn PageFetcher>,
        delay: DelayRange,
        checker: CheckerSpec,
    ) -> Result<Self> {
        Self::init(site_root, site, fetcher, delay, Some(checker))
    }

    fn init(
        site_root: impl AsRef<Path>,
        site: SiteConfig,
        fetcher: Box<dyn PageFetcher>,
        delay: DelayRange,
        checker: Option<CheckerSpec>,
    ) -> Result<Self> {
        let site_root = site_root.as_ref();
        let logs = TrackingFiles::new(site_root);
        let store = PageStore::new(GoalDirs::detect(site_root));
        let (frontier, visited) = restore_frontier(&logs, &site)?;

        Ok(Self {
            site,
            logs,
            store,
            fetcher,
            robots: None,
            delay,
            checker,
            frontier,
            visited,
        })
    }

    /// Attach an advisory robots.txt ruleset.
    pub fn with_robots(mut self, robots: Option<RobotsGate>) -> Self {
        self.robots = robots;
        self
    }

    /// URLs awaiting a fetch.
    pub fn frontier(&self) -> &HashSet<String> {
        &self.frontier
    }

    /// URLs already dequeued, success or failure.
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Startup precondition: a populated frontier is required, an empty
    /// visited set only deserves a warning.
    fn ready_to_crawl(&self) -> Result<()> {
        if self.frontier.is_empty() {
            return Err(AppError::NoLinks);
        }
        if self.visited.is_empty() {
            log::warn!("No previously visited URLs on record. Fresh crawl?");
        }
        Ok(())
    }

    /// Run the crawl until the frontier drains or `max_pages` is reached.
    pub async fn run(&mut self, max_pages: Option<usize>) -> Result<()> {
        self.ready_to_crawl()?;

        let mut pages_done = 0usize;
        while continue_crawling(max_pages, pages_done, self.frontier.len()) {
            let Some(url) = pop_any(&mut self.frontier) else {
                break;
            };
            pages_done += 1;

            // Logged before the fetch: a crash mid-fetch must still mark the
            // URL as attempted, or a poisoned URL would be retried forever.
            self.logs.append(Log::Visited, &url)?;
            self.visited.insert(url.clone());
            log::info!("{pages_done}: {url}");

            if let Err(error) = self.step(&url).await {
                log::warn!("Skipping {url}: {error}");
                self.logs.append(Log::Error, &url)?;
                self.delay.wait().await;
            }
        }

        // The last in-loop graph line is stale when a run is cut short, so a
        // clean exit always appends the authoritative final size.
        self.logs
            .append(Log::Graph, &self.frontier.len().to_string())?;
        Ok(())
    }

    /// One iteration past the visited append: fetch, classify, store,
    /// extract, enqueue. Any error here is recovered at the loop boundary.
    async fn step(&mut self, url: &str) -> Result<()> {
        if let Some(gate) = &self.robots {
            if !gate.is_allowed(url) {
                log::info!("robots.txt disallows {url}");
                self.logs.append(Log::Forbidden, url)?;
                self.logs
                    .append(Log::Graph, &self.frontier.len().to_string())?;
                return Ok(());
            }
        }

        let html = self.fetcher.fetch_text(url).await?;

        // The popped URL is re-classified by shape on every iteration,
        // independent of how it entered the frontier.
        match (&self.checker, self.site.classify(url)) {
            (None, UrlCategory::Article) => {
                self.store.write_article(url, &html)?;
            }
            (None, UrlCategory::Board) => {
                self.store.write_board(url, &html)?;
            }
            (None, UrlCategory::Irrelevant) => {
                self.logs.append(Log::Irrelevant, url)?;
            }
            (Some(spec), UrlCategory::Article) if (spec.func)(&html, url) => {
                self.store.write_article(url, &html)?;
            }
            (Some(spec), UrlCategory::Board)
                if spec.check_board && (spec.func)(&html, url) =>
            {
                self.store.write_board(url, &html)?;
            }
            (Some(_), _) => {
                // Failed check or irrelevant shape: log it and move to the
                // next URL without extracting links from this page.
                self.logs.append(Log::Irrelevant, url)?;
                self.logs
                    .append(Log::Graph, &self.frontier.len().to_string())?;
                self.delay.wait().await;
                return Ok(());
            }
        }

        let links = extract::links_from_html(&html);
        let (relevant, irrelevant) = classify::sort_incoming(links, &self.site, &self.visited);

        self.frontier.extend(relevant.iter().cloned());
        self.logs.append_lines(Log::Queue, &relevant)?;
        self.logs.append_lines(Log::Irrelevant, &irrelevant)?;
        self.logs
            .append(Log::Graph, &self.frontier.len().to_string())?;

        self.delay.wait().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SitePatterns;
    use crate::storage::scaffold_site;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct FakeFetcher {
        pages: HashMap<String, String>,
    }

    impl FakeFetcher {
        fn new(pages: &[(&str, &str)]) -> Box<Self> {
            Box::new(Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::fetch(url, "stubbed timeout"))
        }

        async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
            self.fetch_text(url).await.map(String::into_bytes)
        }
    }

    fn site() -> SiteConfig {
        SiteConfig::compile(SitePatterns {
            base_url: "https://site.example".to_string(),
            article_url: "https://site\\.example/a".to_string(),
            board_url: "https://site\\.example/b".to_string(),
            irrelevant_url: "forbidden".to_string(),
            forum_root: "/phpbb".to_string(),
        })
        .unwrap()
    }

    fn no_delay() -> DelayRange {
        DelayRange::new(0.0, 0.0)
    }

    fn lines(path: &std::path::Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn classic_crawl_stores_pages_and_follows_links() {
        let tmp = TempDir::new().unwrap();
        scaffold_site(tmp.path(), false).unwrap();

        let fetcher = FakeFetcher::new(&[
            (
                "https://site.example/",
                r#"<a href="/a/1">post</a><a href="/b/1">board</a>"#,
            ),
            ("https://site.example/a/1", "<p>article</p>"),
            ("https://site.example/b/1", "<p>listing</p>"),
        ]);
        let mut engine =
            CrawlEngine::classic(tmp.path(), site(), fetcher, no_delay()).unwrap();
        engine.run(None).await.unwrap();

        assert_eq!(crate::utils::count_files(tmp.path().join("article_pages")), 1);
        assert_eq!(
            crate::utils::count_files(tmp.path().join("nonarticle_pages")),
            1
        );

        let logs = TrackingFiles::new(tmp.path());
        let visited = logs.read_all(Log::Visited).unwrap();
        assert_eq!(visited.len(), 3);
        let queue = logs.read_all(Log::Queue).unwrap();
        assert!(queue.contains("https://site.example/a/1"));
        assert!(queue.contains("https://site.example/b/1"));
        // One graph line per iteration plus the final tail-write.
        assert_eq!(lines(&logs.path(Log::Graph)).len(), 4);
        assert!(engine.frontier().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_is_logged_and_loop_continues() {
        let tmp = TempDir::new().unwrap();
        scaffold_site(tmp.path(), false).unwrap();
        let logs = TrackingFiles::new(tmp.path());
        logs.append_lines(
            Log::Queue,
            ["https://site.example/a/ok", "https://site.example/a/down"],
        )
        .unwrap();

        let fetcher = FakeFetcher::new(&[("https://site.example/a/ok", "<p>fine</p>")]);
        let mut engine =
            CrawlEngine::classic(tmp.path(), site(), fetcher, no_delay()).unwrap();
        engine.run(None).await.unwrap();

        // The failing URL produced exactly one error line, was still marked
        // visited, and enqueued nothing.
        assert_eq!(
            lines(&logs.path(Log::Error)),
            vec!["https://site.example/a/down".to_string()]
        );
        let visited = logs.read_all(Log::Visited).unwrap();
        assert!(visited.contains("https://site.example/a/down"));
        assert!(visited.contains("https://site.example/a/ok"));
        assert_eq!(
            lines(&logs.path(Log::Visited)).len(),
            2,
            "visited must be appended exactly once per URL"
        );
        assert!(logs.read_all(Log::Queue).unwrap().len() == 2);
        assert_eq!(crate::utils::count_files(tmp.path().join("article_pages")), 1);
    }

    #[tokio::test]
    async fn rejected_check_skips_storage_and_extraction() {
        let tmp = TempDir::new().unwrap();
        scaffold_site(tmp.path(), false).unwrap();
        let logs = TrackingFiles::new(tmp.path());
        logs.append(Log::Queue, "https://site.example/a/1").unwrap();

        fn reject_all(_html: &str, _url: &str) -> bool {
            false
        }

        let fetcher = FakeFetcher::new(&[(
            "https://site.example/a/1",
            r#"<a href="/a/2">never followed</a>"#,
        )]);
        let mut engine = CrawlEngine::checked(
            tmp.path(),
            site(),
            fetcher,
            no_delay(),
            CheckerSpec::new(reject_all),
        )
        .unwrap();
        engine.run(None).await.unwrap();

        assert_eq!(
            lines(&logs.path(Log::Irrelevant)),
            vec!["https://site.example/a/1".to_string()]
        );
        assert_eq!(crate::utils::count_files(tmp.path().join("article_pages")), 0);
        assert!(logs.read_all(Log::Queue).unwrap().len() == 1, "no extraction");
    }

    #[tokio::test]
    async fn accepted_check_stores_and_extracts() {
        let tmp = TempDir::new().unwrap();
        scaffold_site(tmp.path(), false).unwrap();
        let logs = TrackingFiles::new(tmp.path());
        logs.append(Log::Queue, "https://site.example/a/1").unwrap();

        fn accept_all(_html: &str, _url: &str) -> bool {
            true
        }

        let fetcher = FakeFetcher::new(&[
            ("https://site.example/a/1", r#"<a href="/a/2">next</a>"#),
            ("https://site.example/a/2", "<p>end</p>"),
        ]);
        let mut engine = CrawlEngine::checked(
            tmp.path(),
            site(),
            fetcher,
            no_delay(),
            CheckerSpec::new(accept_all),
        )
        .unwrap();
        engine.run(None).await.unwrap();

        assert_eq!(crate::utils::count_files(tmp.path().join("article_pages")), 2);
        assert!(logs
            .read_all(Log::Queue)
            .unwrap()
            .contains("https://site.example/a/2"));
    }

    #[tokio::test]
    async fn duplicate_record_becomes_an_error_line_without_clobbering() {
        let tmp = TempDir::new().unwrap();
        scaffold_site(tmp.path(), false).unwrap();
        let logs = TrackingFiles::new(tmp.path());
        logs.append(Log::Queue, "https://site.example/a/1").unwrap();

        let store = PageStore::new(GoalDirs::new(tmp.path()));
        let existing = store
            .write_article("https://site.example/a/1", "original")
            .unwrap();
        let before = std::fs::read_to_string(&existing).unwrap();

        let fetcher = FakeFetcher::new(&[("https://site.example/a/1", "replacement")]);
        let mut engine =
            CrawlEngine::classic(tmp.path(), site(), fetcher, no_delay()).unwrap();
        engine.run(None).await.unwrap();

        assert_eq!(
            lines(&logs.path(Log::Error)),
            vec!["https://site.example/a/1".to_string()]
        );
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), before);
    }

    #[tokio::test]
    async fn robots_disallow_goes_to_forbidden_log_without_fetch() {
        let tmp = TempDir::new().unwrap();
        scaffold_site(tmp.path(), false).unwrap();
        let logs = TrackingFiles::new(tmp.path());
        logs.append(Log::Queue, "https://site.example/a/private")
            .unwrap();

        // Fetcher has no pages: a fetch attempt would show up as an error.
        let fetcher = FakeFetcher::new(&[]);
        let gate = RobotsGate::from_content(
            "User-agent: *\nDisallow: /a/private\n",
            "corpus-crawler",
        );
        let mut engine = CrawlEngine::classic(tmp.path(), site(), fetcher, no_delay())
            .unwrap()
            .with_robots(Some(gate));
        engine.run(None).await.unwrap();

        assert_eq!(
            lines(&logs.path(Log::Forbidden)),
            vec!["https://site.example/a/private".to_string()]
        );
        assert!(lines(&logs.path(Log::Error)).is_empty());
    }

    #[tokio::test]
    async fn max_pages_bounds_the_run() {
        let tmp = TempDir::new().unwrap();
        scaffold_site(tmp.path(), false).unwrap();
        let logs = TrackingFiles::new(tmp.path());
        logs.append_lines(
            Log::Queue,
            [
                "https://site.example/a/1",
                "https://site.example/a/2",
                "https://site.example/a/3",
            ],
        )
        .unwrap();

        let fetcher = FakeFetcher::new(&[
            ("https://site.example/a/1", "<p>1</p>"),
            ("https://site.example/a/2", "<p>2</p>"),
            ("https://site.example/a/3", "<p>3</p>"),
        ]);
        let mut engine =
            CrawlEngine::classic(tmp.path(), site(), fetcher, no_delay()).unwrap();
        engine.run(Some(2)).await.unwrap();

        assert_eq!(lines(&logs.path(Log::Visited)).len(), 2);
        assert_eq!(engine.frontier().len(), 1);
    }

    #[tokio::test]
    async fn resume_never_requeues_visited_urls() {
        let tmp = TempDir::new().unwrap();
        scaffold_site(tmp.path(), false).unwrap();
        let logs = TrackingFiles::new(tmp.path());
        logs.append(Log::Queue, "https://site.example/a/1").unwrap();

        let fetcher = FakeFetcher::new(&[("https://site.example/a/1", "<p>done</p>")]);
        let mut engine =
            CrawlEngine::classic(tmp.path(), site(), fetcher, no_delay()).unwrap();
        engine.run(None).await.unwrap();

        // Second engine over the same logs: the only queued URL is already
        // visited, so recovery falls back to the seed.
        let fetcher = FakeFetcher::new(&[]);
        let engine =
            CrawlEngine::classic(tmp.path(), site(), fetcher, no_delay()).unwrap();
        assert!(!engine.frontier().contains("https://site.example/a/1"));
        assert_eq!(
            engine.frontier(),
            &HashSet::from(["https://site.example/".to_string()])
        );
    }

    #[tokio::test]
    async fn frontier_and_visited_stay_disjoint() {
        let tmp = TempDir::new().unwrap();
        scaffold_site(tmp.path(), false).unwrap();
        let logs = TrackingFiles::new(tmp.path());
        logs.append(Log::Queue, "https://site.example/b/1").unwrap();

        // The board page links back to itself and to a fresh article.
        let fetcher = FakeFetcher::new(&[
            (
                "https://site.example/b/1",
                r#"<a href="/b/1">self</a><a href="/a/9">new</a>"#,
            ),
            ("https://site.example/a/9", "<p>ok</p>"),
        ]);
        let mut engine =
            CrawlEngine::classic(tmp.path(), site(), fetcher, no_delay()).unwrap();
        engine.run(Some(1)).await.unwrap();

        assert!(engine.frontier().is_disjoint(engine.visited()));
        assert!(engine.frontier().contains("https://site.example/a/9"));
    }
}
