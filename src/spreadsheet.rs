use std::{
    hash::{Hash, Hasher},
    mem,
    path::Path,
};

use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDateTime;

use crate::error::LoadError;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One spreadsheet cell, as read.
#[derive(Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

impl Cell {
    /// Text rendering used when a column must hold strings. Blank cells
    /// become the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Cell::Error(e) => e.clone(),
        }
    }
}

// Floats compare by bit pattern so that duplicate detection is exact and
// `Cell` can live in a `HashSet`.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Empty, Cell::Empty) => true,
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::Float(a), Cell::Float(b)) => a.to_bits() == b.to_bits(),
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::DateTime(a), Cell::DateTime(b)) => a == b,
            (Cell::Error(a), Cell::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Cell::Empty => {}
            Cell::Text(s) | Cell::Error(s) => s.hash(state),
            Cell::Int(i) => i.hash(state),
            Cell::Float(f) => f.to_bits().hash(state),
            Cell::Bool(b) => b.hash(state),
            Cell::DateTime(dt) => dt.hash(state),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(Cell::DateTime)
                .unwrap_or_else(|| Cell::Float(dt.as_f64())),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }
}

/// A header row plus data rows, all in sheet order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column whose header matches `name` once both are
    /// normalised with [`normalize_header`].
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize_header(name);
        self.headers
            .iter()
            .position(|header| normalize_header(header) == wanted)
    }
}

/// Upper-cases and joins the alphanumeric runs with `_`, so `"Arrival date"`,
/// `"ARRIVAL_DATE"` and `"arrival-date "` all compare equal.
pub fn normalize_header(header: &str) -> String {
    header
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}

pub struct SpreadsheetReader;

impl SpreadsheetReader {
    /// Reads the first worksheet. The format follows the file extension
    /// (xlsx, xlsm, xls, ods) and the first row is taken as headers.
    pub fn read(path: &Path) -> Result<Table, LoadError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range_at(0).ok_or(LoadError::EmptySheet)??;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .ok_or(LoadError::EmptySheet)?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        let rows = rows
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Ok(Table::new(headers, rows))
    }
}
