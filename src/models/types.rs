//! Core Types for the scraping pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::{AppError, AppResult};

/// One spreadsheet row
pub type Row = Vec<String>;

// ============================================
// Sheet Range
// ============================================

/// Fixed rectangular A1 address such as `A1:T6000`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    a1: String,
    /// First column, zero-based (A = 0)
    pub start_col: u32,
    /// First row, one-based
    pub start_row: u32,
    /// Last column, zero-based, inclusive
    pub end_col: u32,
    /// Last row, one-based, inclusive
    pub end_row: u32,
}

impl SheetRange {
    /// Number of rows the range can hold
    pub fn row_capacity(&self) -> usize {
        (self.end_row - self.start_row + 1) as usize
    }

    /// Number of columns the range can hold
    pub fn col_capacity(&self) -> usize {
        (self.end_col - self.start_col + 1) as usize
    }

    /// The address as written in the config
    pub fn a1(&self) -> &str {
        &self.a1
    }

    /// True when the two rectangles share at least one cell
    pub fn overlaps(&self, other: &SheetRange) -> bool {
        self.start_col <= other.end_col
            && other.start_col <= self.end_col
            && self.start_row <= other.end_row
            && other.start_row <= self.end_row
    }
}

/// Parse a cell reference like `AQ6000` into (zero-based column, row)
fn parse_cell(cell: &str) -> Option<(u32, u32)> {
    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        col = col
            .checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
    }
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((col - 1, row))
}

impl FromStr for SheetRange {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let (start, end) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| AppError::invalid_range(s))?;
        let (start_col, start_row) = parse_cell(start).ok_or_else(|| AppError::invalid_range(s))?;
        let (end_col, end_row) = parse_cell(end).ok_or_else(|| AppError::invalid_range(s))?;

        if end_col < start_col || end_row < start_row {
            return Err(AppError::invalid_range(s));
        }

        Ok(Self {
            a1: s.trim().to_uppercase(),
            start_col,
            start_row,
            end_col,
            end_row,
        })
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.a1)
    }
}

impl Serialize for SheetRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.a1)
    }
}

impl<'de> Deserialize<'de> for SheetRange {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e: AppError| serde::de::Error::custom(e.message))
    }
}

// ============================================
// Page Tables
// ============================================

/// Raw enrichment sources of one markup row, captured in the same pass
/// as the cell texts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSource {
    /// Text of the classification source cell, if the row has one
    pub metric_text: Option<String>,
    /// `href` of the anchor in the name cell
    pub link_href: Option<String>,
    /// Visible text of the name cell
    pub link_text: String,
}

/// One data row of a results page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenRow {
    /// Cell texts, padded to the header width
    pub cells: Row,
    pub source: RowSource,
}

/// Rectangular grid parsed from one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Row,
    pub rows: Vec<ScreenRow>,
}

impl RawTable {
    /// Index of a column, comparing headers with collapsed whitespace
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = collapse_ws(name);
        self.columns.iter().position(|c| collapse_ws(c) == wanted)
    }

    /// Keep only the first `limit` columns
    pub fn truncate_columns(&mut self, limit: usize) {
        self.columns.truncate(limit);
        for row in &mut self.rows {
            row.cells.truncate(limit);
        }
    }
}

/// Collapse runs of whitespace to one space and trim
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Magnitude bucket derived from the classification source column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Classification {
    Band1 = 1,
    Band2 = 2,
    Band3 = 3,
    Band4 = 4,
}

impl Classification {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A data row with its derived fields appended
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub cells: Row,
    pub classification: Option<Classification>,
    pub hyperlink: Option<String>,
}

impl EnrichedRow {
    /// Cells followed by Classification and Hyperlink; absent values are empty
    pub fn into_row(self) -> Row {
        let mut cells = self.cells;
        cells.push(
            self.classification
                .map(|c| c.code().to_string())
                .unwrap_or_default(),
        );
        cells.push(self.hyperlink.unwrap_or_default());
        cells
    }
}

/// Header plus data rows of one page, ready to append
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageBlock {
    pub header: Row,
    pub rows: Vec<Row>,
}

impl PageBlock {
    /// Rows this page occupies once written: header, data, spacer
    pub fn height(&self) -> usize {
        self.rows.len() + 2
    }

    /// Columns this page occupies: the widest of header and rows
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .fold(self.header.len(), usize::max)
    }
}

/// Everything one account writes to its range
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputBlock {
    pub rows: Vec<Row>,
    /// Pages appended so far
    pub pages: usize,
}

impl OutputBlock {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows that are neither headers nor spacers
    pub fn data_rows(&self) -> usize {
        self.rows.len().saturating_sub(self.pages * 2)
    }

    /// Widest row in the block
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

// ============================================
// Run Report
// ============================================

/// What happened to one account
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AccountOutcome {
    /// Block written to the range
    Published { pages: usize, rows: usize },
    /// Login not confirmed; nothing fetched
    LoginFailed { reason: String },
    /// More rows or columns than the range can hold; nothing written
    RangeOverflow { reason: String },
    /// Clear or write rejected
    PublishFailed { pages: usize, reason: String },
}

impl AccountOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub username: String,
    pub range: SheetRange,
    pub outcome: AccountOutcome,
}

/// Result of one full pass over every configured account
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub accounts: Vec<AccountReport>,
    pub notified: bool,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            accounts: Vec::new(),
            notified: false,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn published_count(&self) -> usize {
        self.accounts.iter().filter(|a| a.outcome.is_published()).count()
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "Run {} | accounts: {} | published: {} | notified: {}",
            self.run_id,
            self.accounts.len(),
            self.published_count(),
            self.notified
        )
    }
}
