//! Table extraction
//!
//! One pass over the results table yields both the display texts and the
//! raw pieces the enricher needs (the metric cell and the name anchor), so
//! each data row carries its own enrichment sources.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::models::{collapse_ws, RawTable, RowSource, ScreenRow};
use crate::utils::constants::{CLASSIFICATION_SOURCE_INDEX, NAME_LINK_INDEX};

lazy_static! {
    static ref DATA_TABLE: Selector = Selector::parse("table.data-table").unwrap();
    static ref ANY_TABLE: Selector = Selector::parse("table").unwrap();
    static ref ROW: Selector = Selector::parse("tr").unwrap();
    static ref ANCHOR: Selector = Selector::parse("a[href]").unwrap();
}

/// Data rows need at least this many cells; shorter rows are layout filler
const MIN_DATA_CELLS: usize = 2;

fn cell_text(cell: &ElementRef) -> String {
    collapse_ws(&cell.text().collect::<String>())
}

/// Direct `td`/`th` children of a row, ignoring cells of nested tables
fn row_cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .collect()
}

fn row_source(cells: &[ElementRef]) -> RowSource {
    let metric_text = cells.get(CLASSIFICATION_SOURCE_INDEX).map(cell_text);
    let (link_href, link_text) = match cells.get(NAME_LINK_INDEX) {
        Some(cell) => (
            cell.select(&ANCHOR)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(String::from),
            cell_text(cell),
        ),
        None => (None, String::new()),
    };

    RowSource {
        metric_text,
        link_href,
        link_text,
    }
}

/// Parse the results table of a page.
///
/// Prefers `table.data-table`, falls back to the first `<table>`. Returns
/// `None` when the page has no table or the table has no rows, which ends
/// pagination for the account.
pub fn extract_table(html: &str) -> Option<RawTable> {
    let document = Html::parse_document(html);
    let table = document
        .select(&DATA_TABLE)
        .next()
        .or_else(|| document.select(&ANY_TABLE).next())?;

    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for tr in table.select(&ROW) {
        let cells = row_cells(&tr);
        if cells.is_empty() {
            continue;
        }
        if columns.is_none() {
            columns = Some(cells.iter().map(cell_text).collect());
            continue;
        }
        if cells.len() < MIN_DATA_CELLS {
            continue;
        }
        rows.push(ScreenRow {
            cells: cells.iter().map(cell_text).collect(),
            source: row_source(&cells),
        });
    }

    let mut columns = columns?;

    // Rectangular grid: widen the header for overlong rows, pad short rows
    let width = rows
        .iter()
        .map(|r| r.cells.len())
        .fold(columns.len(), usize::max);
    columns.resize(width, String::new());
    for row in &mut rows {
        row.cells.resize(width, String::new());
    }

    debug!("🧾 Extracted table: {} columns, {} rows", width, rows.len());
    Some(RawTable { columns, rows })
}
