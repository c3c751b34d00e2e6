use thiserror::Error;

/// Why a single page could not be turned into an [`Article`](crate::Article).
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("server answered {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("page has no title heading")]
    MissingTitle,

    #[error("invalid selector {selector:?}: {details}")]
    Selector {
        selector: &'static str,
        details: String,
    },
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("insert failed: {0}")]
    Insert(#[source] sqlx::Error),

    #[error("rollback failed: {0}")]
    Rollback(#[source] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read spreadsheet: {0}")]
    Read(#[from] calamine::Error),

    #[error("spreadsheet has no worksheet or no header row")]
    EmptySheet,

    #[error("column {0:?} not found in spreadsheet")]
    MissingColumn(String),
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("insert of row {row} failed: {source}")]
    Row {
        row: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("commit failed: {0}")]
    Commit(#[source] sqlx::Error),

    #[error("could not open transaction: {0}")]
    Begin(#[source] sqlx::Error),
}
