use std::path::Path;

use log::{error, info};

use crate::{
    LOADER_LOG,
    config::{DatabaseConfig, LoaderConfig},
    record_cleaner::RecordCleaner,
    record_repository::RecordRepository,
    spreadsheet::{SpreadsheetReader, Table},
    trade_record::{ColumnMapping, TradeRecord},
};

/// Reads the spreadsheet and cleans it. `None` only when the file itself
/// cannot be read; cleaning problems are logged and the table returned.
pub fn load_and_clean_data(path: &Path) -> Option<Table> {
    info!(target: LOADER_LOG, "Starting to load Excel file.");
    let table = match SpreadsheetReader::read(path) {
        Ok(table) => table,
        Err(e) => {
            error!(target: LOADER_LOG, "Error loading file {}: {e}", path.display());
            return None;
        }
    };
    info!(target: LOADER_LOG, "Data successfully loaded from: {}", path.display());
    Some(RecordCleaner::clean(table))
}

/// Maps every cleaned row to a [`TradeRecord`] by header name.
pub fn to_records(table: &Table) -> Option<Vec<TradeRecord>> {
    match ColumnMapping::resolve(&table.headers) {
        Ok(mapping) => Some(table.rows.iter().map(|row| mapping.record(row)).collect()),
        Err(e) => {
            error!(target: LOADER_LOG, "Spreadsheet does not match trade_records: {e}");
            None
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub cleaned_rows: usize,
    pub inserted: usize,
}

pub struct LoadRunner {
    db: DatabaseConfig,
    loader: LoaderConfig,
}

impl LoadRunner {
    pub fn new(db: DatabaseConfig, loader: LoaderConfig) -> Self {
        Self { db, loader }
    }

    pub async fn run(&self) -> LoadReport {
        let mut report = LoadReport::default();
        let Some(table) = load_and_clean_data(&self.loader.file) else {
            return report;
        };
        report.cleaned_rows = table.len();

        let Some(records) = to_records(&table) else {
            return report;
        };
        report.inserted = RecordRepository::new(self.db.clone())
            .insert_data(&records)
            .await;

        info!(
            target: LOADER_LOG,
            "Loaded {} of {} cleaned rows",
            report.inserted, report.cleaned_rows
        );
        report
    }
}
