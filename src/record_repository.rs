use log::{error, info, warn};
use sqlx::{
    Connection, MySql, Transaction,
    mysql::MySqlArguments,
    query::Query,
};

use crate::{
    LOADER_LOG,
    config::DatabaseConfig,
    error::BatchError,
    spreadsheet::{Cell, DATETIME_FORMAT},
    trade_record::{TRADE_COLUMNS, TradeRecord},
};

pub fn insert_statement() -> String {
    let columns = TRADE_COLUMNS
        .iter()
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; TRADE_COLUMNS.len()].join(", ");
    format!("INSERT INTO trade_records ({columns}) VALUES ({placeholders})")
}

fn bind_cell<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    cell: &'q Cell,
) -> Query<'q, MySql, MySqlArguments> {
    match cell {
        Cell::Empty | Cell::Error(_) => query.bind(None::<&str>),
        Cell::Text(s) => query.bind(s.as_str()),
        Cell::Int(i) => query.bind(*i),
        Cell::Float(f) => query.bind(*f),
        Cell::Bool(b) => query.bind(*b),
        Cell::DateTime(dt) => query.bind(dt.format(DATETIME_FORMAT).to_string()),
    }
}

/// Receives the rows of one batch. Nothing is durable until `commit`; a
/// writer dropped before that discards the batch.
#[allow(async_fn_in_trait)]
pub trait RecordWriter {
    async fn insert(&mut self, record: &TradeRecord) -> Result<(), sqlx::Error>;
    async fn commit(self) -> Result<(), sqlx::Error>
    where
        Self: Sized;
}

pub struct MySqlRecordWriter<'c> {
    tx: Transaction<'c, MySql>,
    statement: String,
}

impl<'c> MySqlRecordWriter<'c> {
    pub fn new(tx: Transaction<'c, MySql>) -> Self {
        Self {
            tx,
            statement: insert_statement(),
        }
    }
}

impl RecordWriter for MySqlRecordWriter<'_> {
    async fn insert(&mut self, record: &TradeRecord) -> Result<(), sqlx::Error> {
        let query = record
            .values()
            .into_iter()
            .fold(sqlx::query(&self.statement), bind_cell);
        query.execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

/// Inserts every record in order and commits once. The first failing row
/// abandons the whole batch.
pub async fn write_batch<W: RecordWriter>(
    mut writer: W,
    records: &[TradeRecord],
) -> Result<usize, BatchError> {
    for (i, record) in records.iter().enumerate() {
        writer
            .insert(record)
            .await
            .map_err(|source| BatchError::Row { row: i + 1, source })?;
    }
    writer.commit().await.map_err(BatchError::Commit)?;
    Ok(records.len())
}

pub struct RecordRepository {
    db: DatabaseConfig,
}

impl RecordRepository {
    pub fn new(db: DatabaseConfig) -> Self {
        Self { db }
    }

    /// Opens its own connection, writes all records in one transaction and
    /// closes the connection again. Failures are logged, never returned; the
    /// result is the number of committed rows.
    pub async fn insert_data(&self, records: &[TradeRecord]) -> usize {
        let mut conn = match self.db.connect().await {
            Ok(conn) => conn,
            Err(e) => {
                error!(target: LOADER_LOG, "Error connecting to MariaDB: {e}");
                return 0;
            }
        };

        let written = match conn.begin().await {
            Ok(tx) => write_batch(MySqlRecordWriter::new(tx), records).await,
            Err(e) => Err(BatchError::Begin(e)),
        };
        let inserted = match written {
            Ok(n) => {
                info!(target: LOADER_LOG, "Inserted {n} rows into trade_records.");
                n
            }
            Err(e) => {
                error!(target: LOADER_LOG, "Error inserting data into MariaDB: {e}");
                0
            }
        };

        if let Err(e) = conn.close().await {
            warn!(target: LOADER_LOG, "Connection did not close cleanly: {e}");
        }
        inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade_record::{
        ColumnMapping,
        tests::{sheet_headers, sheet_row},
    };

    #[derive(Default)]
    struct WriteLog {
        issued: Vec<Cell>,
        committed: bool,
    }

    struct FakeWriter<'a> {
        log: &'a mut WriteLog,
        fail_at: Option<usize>,
    }

    impl RecordWriter for FakeWriter<'_> {
        async fn insert(&mut self, record: &TradeRecord) -> Result<(), sqlx::Error> {
            if self.fail_at == Some(self.log.issued.len() + 1) {
                return Err(sqlx::Error::Protocol("Incorrect decimal value".into()));
            }
            self.log.issued.push(record.no.clone());
            Ok(())
        }

        async fn commit(self) -> Result<(), sqlx::Error> {
            self.log.committed = true;
            Ok(())
        }
    }

    fn records(n: i64) -> Vec<TradeRecord> {
        let mapping = ColumnMapping::resolve(&sheet_headers()).unwrap();
        (1..=n).map(|i| mapping.record(&sheet_row(i))).collect()
    }

    #[test]
    fn statement_binds_all_columns_in_order() {
        let sql = insert_statement();
        assert!(sql.starts_with("INSERT INTO trade_records (`NO`, `ARRIVAL_DATE`, `HS_CODE`,"));
        assert!(sql.contains("`MANUFACTURING_COMPANY`, `VOLUME`)"));
        assert_eq!(sql.matches('?').count(), 25);
    }

    #[tokio::test]
    async fn whole_batch_is_committed_once() {
        let mut log = WriteLog::default();
        let writer = FakeWriter {
            log: &mut log,
            fail_at: None,
        };
        let written = write_batch(writer, &records(10)).await.unwrap();

        assert_eq!(written, 10);
        assert_eq!(log.issued.len(), 10);
        assert!(log.committed);
    }

    #[tokio::test]
    async fn failing_row_abandons_the_batch() {
        let mut log = WriteLog::default();
        let writer = FakeWriter {
            log: &mut log,
            fail_at: Some(5),
        };
        let err = write_batch(writer, &records(10)).await.unwrap_err();

        assert!(matches!(err, BatchError::Row { row: 5, .. }));
        assert_eq!(
            log.issued,
            vec![Cell::Int(1), Cell::Int(2), Cell::Int(3), Cell::Int(4)]
        );
        assert!(!log.committed);
    }

    #[tokio::test]
    async fn empty_batch_still_commits() {
        let mut log = WriteLog::default();
        let writer = FakeWriter {
            log: &mut log,
            fail_at: None,
        };
        assert_eq!(write_batch(writer, &[]).await.unwrap(), 0);
        assert!(log.committed);
    }
}
