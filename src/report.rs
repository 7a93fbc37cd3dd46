use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde::Serialize;

use crate::error::AuditError;
use crate::rules::RuleResult;

pub const DASHBOARD_SHEET: &str = "Summary Dashboard";
pub const SUGGESTED_FILENAME: &str = "SEO_Issue_Output.xlsx";

// Workbook layout quirks live here and nowhere else: XLSX caps sheet names at
// 31 chars, and every sheet leaves one blank row above the header for a
// caption.
const SHEET_NAME_LIMIT: usize = 31;
const HEADER_ROW: u32 = 1;

/// One dashboard line; every rule gets one, zero matches included.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardEntry {
    pub issue: String,
    pub count: usize,
}

/// The finished artifact: workbook bytes for download, the dashboard table
/// for immediate display, and the sheet names actually emitted.
pub struct Report {
    pub workbook: Vec<u8>,
    pub dashboard: Vec<DashboardEntry>,
    pub sheets: Vec<String>,
}

/// Materialize the rule results as a workbook. Sheets appear in catalog
/// order, only for non-empty results, followed by the dashboard sheet.
pub fn assemble(results: &[RuleResult]) -> Result<Report, AuditError> {
    let mut workbook = Workbook::new();

    for result in results.iter().filter(|r| r.count() > 0) {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(result.name))?;
        write_grid(sheet, &result.columns, &result.rows)?;
    }

    let dashboard = dashboard_entries(results);
    let sheet = workbook.add_worksheet();
    sheet.set_name(DASHBOARD_SHEET)?;
    let rows: Vec<Vec<String>> = dashboard
        .iter()
        .map(|e| vec![e.issue.clone(), e.count.to_string()])
        .collect();
    write_grid(sheet, &["Issue", "Count"], &rows)?;

    Ok(Report {
        workbook: workbook.save_to_buffer()?,
        dashboard,
        sheets: sheet_plan(results),
    })
}

pub fn dashboard_entries(results: &[RuleResult]) -> Vec<DashboardEntry> {
    results
        .iter()
        .map(|r| DashboardEntry {
            issue: r.name.to_string(),
            count: r.count(),
        })
        .collect()
}

/// Names of the sheets `assemble` will emit, in order.
pub fn sheet_plan(results: &[RuleResult]) -> Vec<String> {
    results
        .iter()
        .filter(|r| r.count() > 0)
        .map(|r| sheet_name(r.name))
        .chain(std::iter::once(DASHBOARD_SHEET.to_string()))
        .collect()
}

fn sheet_name(rule: &str) -> String {
    rule.chars().take(SHEET_NAME_LIMIT).collect()
}

fn write_grid(
    sheet: &mut Worksheet,
    columns: &[&str],
    rows: &[Vec<String>],
) -> Result<(), XlsxError> {
    for (c, header) in columns.iter().enumerate() {
        sheet.write_string(HEADER_ROW, c as u16, *header)?;
    }
    for (r, cells) in rows.iter().enumerate() {
        for (c, cell) in cells.iter().enumerate() {
            write_cell(sheet, HEADER_ROW + 1 + r as u32, c as u16, cell)?;
        }
    }
    Ok(())
}

// Numeric-looking cells (status codes, lengths, counts) go out as numbers so
// the sheet sorts and filters sensibly.
fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &str) -> Result<(), XlsxError> {
    match cell.parse::<f64>() {
        Ok(n) if n.is_finite() => sheet.write_number(row, col, n)?,
        _ => sheet.write_string(row, col, cell)?,
    };
    Ok(())
}
