use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use log::{error, info};

use crate::{
    LOADER_LOG,
    error::LoadError,
    spreadsheet::{Cell, DATETIME_FORMAT, Table},
};

pub const ARRIVAL_DATE: &str = "ARRIVAL DATE";
pub const EXPORTER_ADDRESS: &str = "EXPORTER ADDRESS";

const DATETIME_FORMATS: &[&str] = &[
    DATETIME_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

// Day zero of the Excel 1900 date system, adjusted for its 1900 leap-year bug.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
// 9999-12-31 as an Excel serial.
const EXCEL_MAX_SERIAL: f64 = 2_958_466.0;

pub struct RecordCleaner;

impl RecordCleaner {
    /// Drops exact duplicate rows, keeping the first occurrence of each, and
    /// normalises the arrival date and exporter address columns. A coercion
    /// problem is logged and the table is still returned.
    pub fn clean(mut table: Table) -> Table {
        let removed = Self::remove_duplicates(&mut table);
        info!(target: LOADER_LOG, "Removed {removed} duplicate rows.");

        match Self::coerce_types(&mut table) {
            Ok(()) => info!(target: LOADER_LOG, "Data types successfully converted."),
            Err(e) => error!(target: LOADER_LOG, "Error converting data types: {e}"),
        }
        table
    }

    pub fn remove_duplicates(table: &mut Table) -> usize {
        let before = table.rows.len();
        let mut seen = HashSet::with_capacity(before);
        table.rows.retain(|row| seen.insert(row.clone()));
        before - table.rows.len()
    }

    /// Arrival dates first, then exporter addresses. A missing column stops
    /// the coercion at that point; whatever was already converted stays.
    pub fn coerce_types(table: &mut Table) -> Result<(), LoadError> {
        let date_col = table
            .column_index(ARRIVAL_DATE)
            .ok_or_else(|| LoadError::MissingColumn(ARRIVAL_DATE.to_string()))?;
        for row in &mut table.rows {
            if let Some(cell) = row.get_mut(date_col) {
                *cell = coerce_arrival_date(cell);
            }
        }

        let address_col = table
            .column_index(EXPORTER_ADDRESS)
            .ok_or_else(|| LoadError::MissingColumn(EXPORTER_ADDRESS.to_string()))?;
        for row in &mut table.rows {
            if let Some(cell) = row.get_mut(address_col) {
                *cell = Cell::Text(cell.to_text());
            }
        }
        Ok(())
    }
}

/// `Cell::Text("YYYY-MM-DD HH:MM:SS")` for anything that reads as a point in
/// time, `Cell::Empty` otherwise.
pub fn coerce_arrival_date(cell: &Cell) -> Cell {
    let parsed = match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Int(serial) => from_excel_serial(*serial as f64),
        Cell::Float(serial) => from_excel_serial(*serial),
        Cell::Text(text) => parse_datetime(text.trim()),
        Cell::Empty | Cell::Bool(_) | Cell::Error(_) => None,
    };
    parsed
        .map(|dt| Cell::Text(dt.format(DATETIME_FORMAT).to_string()))
        .unwrap_or(Cell::Empty)
}

pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..EXCEL_MAX_SERIAL).contains(&serial) {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}
