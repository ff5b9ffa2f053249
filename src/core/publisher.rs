//! Clear-then-write publishing of one account's block
//!
//! The whole range is cleared first so rows left over from a longer
//! previous run disappear; the block is then written at the range's
//! top-left corner. Publishing the same block twice leaves the same content.

use tracing::info;

use crate::models::{AppError, AppResult, OutputBlock, SheetRange};
use crate::providers::SheetSink;

pub struct SheetPublisher<'a, K: SheetSink + ?Sized> {
    sink: &'a K,
}

impl<'a, K: SheetSink + ?Sized> SheetPublisher<'a, K> {
    pub fn new(sink: &'a K) -> Self {
        Self { sink }
    }

    pub async fn publish(&self, range: &SheetRange, block: &OutputBlock) -> AppResult<()> {
        if block.len() > range.row_capacity() {
            return Err(AppError::range_overflow(
                range.a1(),
                range.row_capacity(),
                block.len(),
            ));
        }
        if block.width() > range.col_capacity() {
            return Err(AppError::range_too_narrow(
                range.a1(),
                range.col_capacity(),
                block.width(),
            ));
        }

        self.sink.clear(range).await?;
        if !block.is_empty() {
            self.sink.write(range, &block.rows).await?;
        }

        info!("✅ Data written to range {} ({} rows)", range, block.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Cell grid keyed by (row, col), both zero-based
    #[derive(Default)]
    struct MemorySheet {
        cells: Mutex<BTreeMap<(u32, u32), String>>,
    }

    #[async_trait]
    impl SheetSink for MemorySheet {
        async fn clear(&self, range: &SheetRange) -> AppResult<()> {
            self.cells.lock().unwrap().retain(|&(r, c), _| {
                !(r + 1 >= range.start_row
                    && r + 1 <= range.end_row
                    && c >= range.start_col
                    && c <= range.end_col)
            });
            Ok(())
        }

        async fn write(&self, range: &SheetRange, rows: &[Row]) -> AppResult<()> {
            let mut cells = self.cells.lock().unwrap();
            for (i, row) in rows.iter().enumerate() {
                for (j, value) in row.iter().enumerate() {
                    let key = (range.start_row - 1 + i as u32, range.start_col + j as u32);
                    if value.is_empty() {
                        cells.remove(&key);
                    } else {
                        cells.insert(key, value.clone());
                    }
                }
            }
            Ok(())
        }
    }

    fn block(rows: &[&[&str]]) -> OutputBlock {
        OutputBlock {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
            pages: 1,
        }
    }

    #[tokio::test]
    async fn test_publish_twice_is_idempotent() {
        let sheet = MemorySheet::default();
        let range: SheetRange = "B2:D10".parse().unwrap();
        let out = block(&[&["h1", "h2"], &["a", "b"], &["", ""]]);
        let publisher = SheetPublisher::new(&sheet);

        publisher.publish(&range, &out).await.unwrap();
        let first = sheet.cells.lock().unwrap().clone();
        publisher.publish(&range, &out).await.unwrap();
        let second = sheet.cells.lock().unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(first.get(&(1, 1)).map(String::as_str), Some("h1"));
        assert_eq!(first.get(&(2, 2)).map(String::as_str), Some("b"));
    }

    #[tokio::test]
    async fn test_clear_removes_stale_rows() {
        let sheet = MemorySheet::default();
        let range: SheetRange = "A1:B10".parse().unwrap();
        let publisher = SheetPublisher::new(&sheet);

        publisher
            .publish(&range, &block(&[&["h"], &["1"], &["2"], &["3"]]))
            .await
            .unwrap();
        publisher.publish(&range, &block(&[&["h"], &["9"]])).await.unwrap();

        let cells = sheet.cells.lock().unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells.get(&(1, 0)).map(String::as_str), Some("9"));
    }

    #[tokio::test]
    async fn test_neighbouring_range_untouched() {
        let sheet = MemorySheet::default();
        sheet.cells.lock().unwrap().insert((0, 25), "other".into());
        let range: SheetRange = "A1:T10".parse().unwrap();

        SheetPublisher::new(&sheet)
            .publish(&range, &block(&[&["h"]]))
            .await
            .unwrap();

        assert_eq!(
            sheet.cells.lock().unwrap().get(&(0, 25)).map(String::as_str),
            Some("other")
        );
    }

    #[tokio::test]
    async fn test_oversized_block_rejected() {
        let sheet = MemorySheet::default();
        let range: SheetRange = "A1:A2".parse().unwrap();

        let err = SheetPublisher::new(&sheet)
            .publish(&range, &block(&[&["h"], &["1"], &[""]]))
            .await
            .unwrap_err();

        assert_eq!(err.code, crate::models::ErrorCode::SheetRangeOverflow);
        assert!(sheet.cells.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wide_block_rejected_before_clear() {
        let sheet = MemorySheet::default();
        sheet.cells.lock().unwrap().insert((0, 0), "previous".into());
        let range: SheetRange = "A1:B10".parse().unwrap();

        let err = SheetPublisher::new(&sheet)
            .publish(&range, &block(&[&["h1", "h2", "h3"]]))
            .await
            .unwrap_err();

        assert_eq!(err.code, crate::models::ErrorCode::SheetRangeOverflow);
        assert_eq!(
            sheet.cells.lock().unwrap().get(&(0, 0)).map(String::as_str),
            Some("previous")
        );
    }
}
