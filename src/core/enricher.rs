//! Row enrichment and column reshaping
//!
//! Enriched screens get two trailing columns: a magnitude band derived from
//! the metric cell and a `=HYPERLINK(...)` formula to the company page.
//! Other screens are cut to a fixed number of leading columns.

use tracing::debug;

use crate::models::{Classification, EnrichedRow, PageBlock, RawTable, RunSettings};
use crate::utils::constants::{
    absolute_link, CLASSIFICATION_HEADER, HYPERLINK_HEADER, NEGATED_COLUMN,
};

/// Band for a metric value.
///
/// `0.01..=99.99 → 1`, `100..=999.99 → 2`, `1000..=99999.99 → 3`,
/// `>= 100000 → 4`. Values in the gaps between bands (e.g. `99.995`) and
/// values below `0.01` have no band.
pub fn classify(value: f64) -> Option<Classification> {
    if (0.01..=99.99).contains(&value) {
        Some(Classification::Band1)
    } else if (100.0..=999.99).contains(&value) {
        Some(Classification::Band2)
    } else if (1000.0..=99999.99).contains(&value) {
        Some(Classification::Band3)
    } else if value >= 100000.0 {
        Some(Classification::Band4)
    } else {
        None
    }
}

/// Band for a metric cell text; thousands separators are ignored and
/// anything unparseable has no band
pub fn classify_text(text: &str) -> Option<Classification> {
    let cleaned = text.replace(',', "");
    cleaned.trim().parse::<f64>().ok().and_then(classify)
}

/// `=HYPERLINK("<url>", "<label>")` for a relative link
pub fn hyperlink_formula(base_url: &str, href: &str, label: &str) -> String {
    format!(
        "=HYPERLINK(\"{}\", \"{}\")",
        absolute_link(base_url, href).replace('"', "\"\""),
        label.trim().replace('"', "\"\"")
    )
}

/// Digits with at most one decimal point and nothing else
fn is_bare_number(value: &str) -> bool {
    let digits = value.replacen('.', "", 1);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Shortest round-trip float text in the sheet's established notation:
/// positional with a trailing `.0` for exponents -4..16, otherwise
/// scientific with a signed two-digit exponent (`1e-05`, `1e+16`)
pub fn float_repr(v: f64) -> String {
    if !v.is_finite() {
        return if v.is_nan() { "nan".into() } else { "inf".into() };
    }

    let sci = format!("{:e}", v.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let sign = if v.is_sign_negative() { "-" } else { "" };

    let body = if (-4..16).contains(&exp) {
        if exp < 0 {
            format!("0.{}{}", "0".repeat((-exp - 1) as usize), digits)
        } else {
            let int_len = exp as usize + 1;
            if digits.len() <= int_len {
                format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
            } else {
                format!("{}.{}", &digits[..int_len], &digits[int_len..])
            }
        }
    } else {
        let (lead, rest) = digits.split_at(1);
        let frac = if rest.is_empty() {
            String::new()
        } else {
            format!(".{}", rest)
        };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{}{}e{}{:02}", lead, frac, exp_sign, exp.abs())
    };
    format!("{}{}", sign, body)
}

/// Reinstate the sign of a magnitude-only value (`12.5 → -12.5`,
/// `3 → -3.0`); anything else passes through unchanged
pub fn negate_magnitude(value: &str) -> String {
    if !is_bare_number(value) {
        return value.to_string();
    }
    match value.parse::<f64>() {
        Ok(v) => format!("-{}", float_repr(v)),
        Err(_) => value.to_string(),
    }
}

/// Shapes one page's table into the rows that get written
#[derive(Debug, Clone)]
pub struct RowEnricher {
    base_url: String,
    column_limit: usize,
}

impl RowEnricher {
    pub fn new(base_url: impl Into<String>, column_limit: usize) -> Self {
        Self {
            base_url: base_url.into(),
            column_limit,
        }
    }

    pub fn from_settings(settings: &RunSettings) -> Self {
        Self::new(settings.base_url.clone(), settings.column_limit)
    }

    /// One enriched row per data row, in table order
    pub fn enrich_rows(&self, table: &RawTable) -> Vec<EnrichedRow> {
        let negated = table.column_index(NEGATED_COLUMN);

        table
            .rows
            .iter()
            .map(|row| {
                let mut cells = row.cells.clone();
                if let Some(cell) = negated.and_then(|i| cells.get_mut(i)) {
                    *cell = negate_magnitude(cell);
                }

                let classification = row.source.metric_text.as_deref().and_then(classify_text);
                let hyperlink = row
                    .source
                    .link_href
                    .as_deref()
                    .map(|href| hyperlink_formula(&self.base_url, href, &row.source.link_text));

                EnrichedRow {
                    cells,
                    classification,
                    hyperlink,
                }
            })
            .collect()
    }

    /// Original columns then Classification and Hyperlink
    pub fn enrich(&self, table: &RawTable) -> PageBlock {
        let mut header = table.columns.clone();
        header.push(CLASSIFICATION_HEADER.to_string());
        header.push(HYPERLINK_HEADER.to_string());

        let rows: Vec<_> = self
            .enrich_rows(table)
            .into_iter()
            .map(EnrichedRow::into_row)
            .collect();

        debug!("✨ Enriched {} rows", rows.len());
        PageBlock { header, rows }
    }

    /// First `column_limit` columns only
    pub fn truncate(&self, mut table: RawTable) -> PageBlock {
        table.truncate_columns(self.column_limit);
        PageBlock {
            header: table.columns,
            rows: table.rows.into_iter().map(|r| r.cells).collect(),
        }
    }

    pub fn shape(&self, table: RawTable, enrich: bool) -> PageBlock {
        if enrich {
            self.enrich(&table)
        } else {
            self.truncate(table)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractor::extract_table;
    use crate::models::{RowSource, ScreenRow};

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0.01), Some(Classification::Band1));
        assert_eq!(classify(99.99), Some(Classification::Band1));
        assert_eq!(classify(100.00), Some(Classification::Band2));
        assert_eq!(classify(999.99), Some(Classification::Band2));
        assert_eq!(classify(1000.00), Some(Classification::Band3));
        assert_eq!(classify(99999.99), Some(Classification::Band3));
        assert_eq!(classify(100000.00), Some(Classification::Band4));
    }

    #[test]
    fn test_classify_gaps_and_low_values() {
        assert_eq!(classify(99.995), None);
        assert_eq!(classify(999.995), None);
        assert_eq!(classify(99999.995), None);
        assert_eq!(classify(0.0), None);
        assert_eq!(classify(0.009), None);
        assert_eq!(classify(-5.0), None);
        assert_eq!(classify(f64::NAN), None);
    }

    #[test]
    fn test_classify_text() {
        assert_eq!(classify_text("12,65,000.00"), Some(Classification::Band4));
        assert_eq!(classify_text(" 500 "), Some(Classification::Band2));
        assert_eq!(classify_text(""), None);
        assert_eq!(classify_text("Mar Cap Rs.Cr."), None);
    }

    #[test]
    fn test_hyperlink_formula() {
        assert_eq!(
            hyperlink_formula("https://www.screener.in", "/company/TCS/", " Tata Consultancy "),
            "=HYPERLINK(\"https://www.screener.in/company/TCS/\", \"Tata Consultancy\")"
        );
        assert_eq!(
            hyperlink_formula("https://www.screener.in", "/c/X/", "Say \"Hi\""),
            "=HYPERLINK(\"https://www.screener.in/c/X/\", \"Say \"\"Hi\"\"\")"
        );
    }

    #[test]
    fn test_negate_magnitude() {
        assert_eq!(negate_magnitude("12.5"), "-12.5");
        assert_eq!(negate_magnitude("3"), "-3.0");
        assert_eq!(negate_magnitude("0"), "-0.0");
        assert_eq!(negate_magnitude("-4.2"), "-4.2");
        assert_eq!(negate_magnitude("1.2.3"), "1.2.3");
        assert_eq!(negate_magnitude(""), "");
        assert_eq!(negate_magnitude("n/a"), "n/a");
    }

    #[test]
    fn test_negate_magnitude_extremes() {
        assert_eq!(negate_magnitude("0.00001"), "-1e-05");
        assert_eq!(negate_magnitude("0.000125"), "-0.000125");
        assert_eq!(negate_magnitude("0.0001"), "-0.0001");
        assert_eq!(negate_magnitude("10000000000000000"), "-1e+16");
        assert_eq!(negate_magnitude("1234567890123456"), "-1234567890123456.0");
        assert_eq!(negate_magnitude("12345678901234567890"), "-1.2345678901234567e+19");
    }

    #[test]
    fn test_float_repr() {
        assert_eq!(float_repr(0.0), "0.0");
        assert_eq!(float_repr(100.0), "100.0");
        assert_eq!(float_repr(0.1), "0.1");
        assert_eq!(float_repr(1.5e-7), "1.5e-07");
        assert_eq!(float_repr(2.5e100), "2.5e+100");
        assert_eq!(float_repr(-3.25), "-3.25");
    }

    fn row(cells: &[&str], metric: &str, href: Option<&str>) -> ScreenRow {
        ScreenRow {
            cells: cells.iter().map(|c| c.to_string()).collect(),
            source: RowSource {
                metric_text: Some(metric.to_string()),
                link_href: href.map(String::from),
                link_text: cells.get(1).map(|c| c.to_string()).unwrap_or_default(),
            },
        }
    }

    #[test]
    fn test_enrich_appends_trailing_columns() {
        let table = RawTable {
            columns: vec!["S.No.".into(), "Name".into(), "Down %".into()],
            rows: vec![
                row(&["1.", "Alpha", "7"], "50", Some("/company/A/")),
                row(&["2.", "Beta", "x"], "oops", None),
            ],
        };
        let block = RowEnricher::new("https://www.screener.in", 18).enrich(&table);

        assert_eq!(
            block.header,
            vec!["S.No.", "Name", "Down %", "Classification", "Hyperlink"]
        );
        assert_eq!(
            block.rows[0],
            vec![
                "1.",
                "Alpha",
                "-7.0",
                "1",
                "=HYPERLINK(\"https://www.screener.in/company/A/\", \"Alpha\")"
            ]
        );
        assert_eq!(block.rows[1], vec!["2.", "Beta", "x", "", ""]);
    }

    #[test]
    fn test_row_alignment_uses_own_markup_row() {
        let html = r#"<table class="data-table">
            <tr><th>S.No.</th><th>Name</th><th>a</th><th>b</th><th>c</th><th>Metric</th></tr>
            <tr><td>1.</td><td><a href="/company/ONE/">One</a></td><td></td><td></td><td></td><td>5</td></tr>
            <tr><td>2.</td><td><a href="/company/TWO/">Two</a></td><td></td><td></td><td></td><td>5,000</td></tr>
            <tr><td>3.</td><td><a href="/company/THREE/">Three</a></td><td></td><td></td><td></td><td>250000</td></tr>
        </table>"#;
        let table = extract_table(html).unwrap();
        let enriched = RowEnricher::new("https://www.screener.in", 18).enrich_rows(&table);

        assert_eq!(enriched.len(), 3);
        let bands: Vec<_> = enriched.iter().map(|r| r.classification).collect();
        assert_eq!(
            bands,
            vec![
                Some(Classification::Band1),
                Some(Classification::Band3),
                Some(Classification::Band4)
            ]
        );
        assert!(enriched[1].hyperlink.as_deref().unwrap().contains("/company/TWO/"));
        assert!(enriched[1].hyperlink.as_deref().unwrap().contains("\"Two\""));
    }

    #[test]
    fn test_truncate_keeps_leading_columns() {
        let columns: Vec<String> = (0..25).map(|i| format!("c{}", i)).collect();
        let cells: Vec<&str> = columns.iter().map(|s| s.as_str()).collect();
        let table = RawTable {
            columns: columns.clone(),
            rows: vec![row(&cells, "1", None)],
        };

        let block = RowEnricher::new("https://www.screener.in", 18).shape(table, false);

        assert_eq!(block.header.len(), 18);
        assert_eq!(block.header[17], "c17");
        assert_eq!(block.rows[0].len(), 18);
    }
}
