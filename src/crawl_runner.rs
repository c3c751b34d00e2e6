use anyhow::Context;
use log::{error, info, warn};

use crate::{
    CRAWLER_LOG,
    article_repository::{ArticleRepository, ArticleStore, MySqlArticleStore},
    article_scraper::ArticleScraper,
    config::{CrawlerConfig, DatabaseConfig},
    crawl_list::CrawlListProvider,
    readiness::retry_with_backoff,
    requests::{PageSource, RequestClient},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Init,
    Connecting,
    Connected,
    Running,
    Done,
    ConnectFailed,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub attempted: usize,
    pub crawled: usize,
    pub saved: usize,
    pub aborted: bool,
}

/// Crawls every URL in order and saves what could be extracted. A store that
/// stops working ends the loop; the remaining URLs are skipped.
pub async fn crawl_and_save<P, S>(
    scraper: &ArticleScraper<P>,
    repo: &mut ArticleRepository<S>,
    urls: &[String],
) -> CrawlReport
where
    P: PageSource,
    S: ArticleStore,
{
    let mut report = CrawlReport::default();
    for url in urls {
        report.attempted += 1;
        let Some(article) = scraper.crawl(url).await else {
            continue;
        };
        report.crawled += 1;

        match repo.save(Some(&article)).await {
            Ok(true) => report.saved += 1,
            Ok(false) => {}
            Err(e) => {
                error!(target: CRAWLER_LOG, "Stopping crawl after {url}: {e}");
                report.aborted = true;
                break;
            }
        }
    }
    report
}

pub struct CrawlRunner {
    db: DatabaseConfig,
    crawler: CrawlerConfig,
    state: RunnerState,
}

impl CrawlRunner {
    pub fn new(db: DatabaseConfig, crawler: CrawlerConfig) -> Self {
        Self {
            db,
            crawler,
            state: RunnerState::Init,
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    fn transition(&mut self, next: RunnerState) {
        info!(target: CRAWLER_LOG, "{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Failing to connect is fatal and returned. Everything after that is
    /// absorbed, and the connection is closed once on the way out.
    pub async fn run(&mut self) -> anyhow::Result<CrawlReport> {
        let scraper = ArticleScraper::new(RequestClient::new(&self.crawler.user_agent)?)?;
        let urls = CrawlListProvider::new(self.crawler.startup_delay())
            .get_crawl_list()
            .await;

        self.transition(RunnerState::Connecting);
        let policy = self.crawler.connect_policy();
        let db = &self.db;
        let connected = retry_with_backoff(&policy, "MariaDB", || db.connect()).await;
        let conn = match connected {
            Ok(conn) => conn,
            Err(e) => {
                self.transition(RunnerState::ConnectFailed);
                return Err(e).with_context(|| {
                    format!("could not connect to MariaDB at {}:{}", self.db.host, self.db.port)
                });
            }
        };
        self.transition(RunnerState::Connected);

        let mut repo = ArticleRepository::new(MySqlArticleStore::new(conn));
        self.transition(RunnerState::Running);
        let report = crawl_and_save(&scraper, &mut repo, &urls).await;

        if let Err(e) = repo.into_store().close().await {
            warn!(target: CRAWLER_LOG, "Connection did not close cleanly: {e}");
        }
        self.transition(RunnerState::Done);

        info!(
            target: CRAWLER_LOG,
            "Crawled {}/{} pages, saved {}",
            report.crawled, report.attempted, report.saved
        );
        Ok(report)
    }
}
