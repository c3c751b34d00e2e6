use dotenv::dotenv;
use log::{LevelFilter, error};
use mariadb_ingest::{
    CRAWLER_LOG, CrawlRunner,
    config::{CRAWLER_DB_USER, CrawlerConfig, DatabaseConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let db = DatabaseConfig::from_env(CRAWLER_DB_USER)?;
    let crawler = CrawlerConfig::from_env()?;

    let mut runner = CrawlRunner::new(db, crawler);
    if let Err(e) = runner.run().await {
        error!(target: CRAWLER_LOG, "Crawler stopped in state {:?}: {e:#}", runner.state());
        return Err(e);
    }
    Ok(())
}
