mod article_repository;
mod article_scraper;
mod crawl_list;
mod crawl_runner;
mod error;
mod load_runner;
mod record_cleaner;
mod record_repository;
mod requests;
mod spreadsheet;
mod text_manipulators;
mod trade_record;

pub mod config;
pub mod readiness;

/// Log target shared by the crawler components.
pub const CRAWLER_LOG: &str = "wiki_crawler";
/// Log target shared by the loader components.
pub const LOADER_LOG: &str = "data_loader";

pub use article_repository::{ArticleRepository, ArticleStore, MySqlArticleStore};
pub use article_scraper::{Article, ArticleScraper, FieldExtractor};
pub use crawl_list::CrawlListProvider;
pub use crawl_runner::{CrawlReport, CrawlRunner, RunnerState, crawl_and_save};
pub use error::{BatchError, CrawlError, LoadError, RepositoryError};
pub use load_runner::{LoadReport, LoadRunner, load_and_clean_data, to_records};
pub use record_cleaner::{RecordCleaner, coerce_arrival_date};
pub use record_repository::{MySqlRecordWriter, RecordRepository, RecordWriter, write_batch};
pub use requests::{PageSource, RequestClient};
pub use spreadsheet::{Cell, SpreadsheetReader, Table};
pub use trade_record::{ColumnMapping, TRADE_COLUMNS, TradeRecord};
