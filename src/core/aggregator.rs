//! Per-account output accumulation
//!
//! Pages are appended in fetch order as `[header, rows.., spacer]`. The
//! destination range has a fixed size, so a page that would not fit (too
//! many rows or too wide) is refused instead of spilling past the range edge.

use crate::models::{AppError, AppResult, OutputBlock, PageBlock, SheetRange};

#[derive(Debug, Clone)]
pub struct Aggregator {
    range: SheetRange,
    block: OutputBlock,
}

impl Aggregator {
    pub fn new(range: &SheetRange) -> Self {
        Self {
            range: range.clone(),
            block: OutputBlock::default(),
        }
    }

    /// Append one page; fails with `SheetRangeOverflow` if the range is too
    /// short or too narrow
    pub fn push_page(&mut self, page: PageBlock) -> AppResult<()> {
        let width = page.width();
        if width > self.range.col_capacity() {
            return Err(AppError::range_too_narrow(
                self.range.a1(),
                self.range.col_capacity(),
                width,
            ));
        }

        let needed = self.block.len() + page.height();
        let capacity = self.range.row_capacity();
        if needed > capacity {
            return Err(AppError::range_overflow(self.range.a1(), capacity, needed));
        }

        let spacer = vec![String::new(); page.header.len()];
        self.block.rows.push(page.header);
        self.block.rows.extend(page.rows);
        self.block.rows.push(spacer);
        self.block.pages += 1;
        Ok(())
    }

    pub fn block(&self) -> &OutputBlock {
        &self.block
    }

    pub fn finish(self) -> OutputBlock {
        self.block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorCode;

    fn page(rows: usize) -> PageBlock {
        PageBlock {
            header: vec!["S.No.".into(), "Name".into()],
            rows: (0..rows).map(|i| vec![format!("{}.", i + 1), "X".into()]).collect(),
        }
    }

    #[test]
    fn test_pages_keep_insertion_order() {
        let range: SheetRange = "A1:T6000".parse().unwrap();
        let mut agg = Aggregator::new(&range);
        agg.push_page(page(2)).unwrap();
        agg.push_page(page(1)).unwrap();

        let block = agg.finish();
        assert_eq!(block.pages, 2);
        assert_eq!(block.len(), 7);
        assert_eq!(block.data_rows(), 3);
        assert_eq!(block.rows[0], vec!["S.No.", "Name"]);
        assert_eq!(block.rows[3], vec!["", ""]);
        assert_eq!(block.rows[4], vec!["S.No.", "Name"]);
        assert_eq!(block.rows[5][0], "1.");
    }

    #[test]
    fn test_exact_fit_is_allowed() {
        let range: SheetRange = "A1:B4".parse().unwrap();
        let mut agg = Aggregator::new(&range);
        assert!(agg.push_page(page(2)).is_ok());
        assert_eq!(agg.block().len(), 4);
    }

    #[test]
    fn test_overflow_fails_loudly() {
        let range: SheetRange = "A1:B5".parse().unwrap();
        let mut agg = Aggregator::new(&range);
        agg.push_page(page(1)).unwrap();

        let err = agg.push_page(page(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::SheetRangeOverflow);
        // Nothing partial was appended
        assert_eq!(agg.block().len(), 3);
    }

    #[test]
    fn test_page_wider_than_range_is_refused() {
        let range: SheetRange = "A1:T6000".parse().unwrap();
        let mut agg = Aggregator::new(&range);
        let wide = PageBlock {
            header: (0..22).map(|i| format!("C{}", i)).collect(),
            rows: vec![vec![String::new(); 22]],
        };

        let err = agg.push_page(wide).unwrap_err();

        assert_eq!(err.code, ErrorCode::SheetRangeOverflow);
        assert!(err.message.contains("20 columns"));
        assert!(agg.block().is_empty());
    }

    #[test]
    fn test_page_as_wide_as_range_fits() {
        let range: SheetRange = "A1:B10".parse().unwrap();
        let mut agg = Aggregator::new(&range);
        assert!(agg.push_page(page(1)).is_ok());
    }
}
