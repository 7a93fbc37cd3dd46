use std::io::Read;

use tracing::info;

use crate::error::AuditError;
use crate::loader::Table;
use crate::report::{self, Report};
use crate::rules;
use crate::segment;

/// Run the whole audit over one uploaded export: load, segment, evaluate the
/// catalog, assemble the workbook. Everything derived is dropped when the
/// returned report is.
pub fn run(input: impl Read) -> Result<Report, AuditError> {
    let table = Table::load(input)?;
    info!(rows = table.len(), "crawl export loaded");
    if table.is_empty() {
        // Still a valid run: every rule lands on the dashboard with count 0.
        info!("export has a header but no data rows");
    }

    let seg = segment::split(&table)?;
    info!(
        html = seg.html_pages.rows.len(),
        pdf = seg.pdf_pages.rows.len(),
        indexable_html = seg.indexable_html.rows.len(),
        indexable_pdfs = seg.indexable_pdfs.rows.len(),
        "segments built"
    );

    let results = rules::evaluate_all(&table, &seg)?;
    let flagged: usize = results.iter().map(|r| r.count()).sum();
    info!(rules = results.len(), flagged, "catalog evaluated");

    report::assemble(&results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use std::io::Cursor;

    fn fixture(name: &str) -> Vec<u8> {
        fs::read(format!("tests/fixtures/{name}")).unwrap()
    }

    fn counts(report: &Report) -> HashMap<String, usize> {
        report
            .dashboard
            .iter()
            .map(|e| (e.issue.clone(), e.count))
            .collect()
    }

    #[test]
    fn small_crawl_end_to_end() {
        let report = run(Cursor::new(fixture("crawl_small.csv"))).unwrap();
        let counts = counts(&report);

        assert_eq!(report.dashboard.len(), 17);
        assert_eq!(counts["Missing Canonicals"], 1);
        assert_eq!(counts["Duplicate Titles"], 2);
        assert_eq!(counts["Orphan URLs"], 1);
        assert_eq!(counts["Nonindexable URLs"], 1);
        assert!(!report.workbook.is_empty());
    }

    #[test]
    fn identical_input_gives_identical_dashboards() {
        let bytes = fixture("crawl_small.csv");
        let first = run(Cursor::new(bytes.clone())).unwrap();
        let second = run(Cursor::new(bytes)).unwrap();

        let a: Vec<(String, usize)> = first
            .dashboard
            .iter()
            .map(|e| (e.issue.clone(), e.count))
            .collect();
        let b: Vec<(String, usize)> = second
            .dashboard
            .iter()
            .map(|e| (e.issue.clone(), e.count))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn bom_prefixed_export_loads() {
        let mut bytes = b"\xef\xbb\xbf".to_vec();
        bytes.extend_from_slice(&fixture("crawl_small.csv"));
        let report = run(Cursor::new(bytes)).unwrap();
        assert_eq!(report.dashboard.len(), 17);
    }

    #[test]
    fn export_without_crawl_columns_fails_whole_run() {
        let csv = b"URL,Code\nhttps://a.example/,200\n".to_vec();
        assert!(matches!(
            run(Cursor::new(csv)),
            Err(AuditError::MissingColumn { .. })
        ));
    }
}
