use dotenv::dotenv;
use log::LevelFilter;
use mariadb_ingest::{
    LoadRunner,
    config::{DatabaseConfig, LOADER_DB_USER, LoaderConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let db = DatabaseConfig::from_env(LOADER_DB_USER)?;
    let loader = LoaderConfig::from_env()?;

    LoadRunner::new(db, loader).run().await;
    Ok(())
}
