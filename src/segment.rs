use tracing::debug;

use crate::error::AuditError;
use crate::loader::{self, Column, Table};

pub const INDEXABLE: &str = "Indexable";
pub const NON_INDEXABLE: &str = "Non-Indexable";

/// A named, immutable subset of table rows.
pub struct Segment {
    pub name: &'static str,
    pub rows: Vec<usize>,
}

impl Segment {
    fn filtered(&self, name: &'static str, pred: impl Fn(usize) -> bool) -> Segment {
        Segment {
            name,
            rows: self.rows.iter().copied().filter(|&r| pred(r)).collect(),
        }
    }
}

/// The four derived views every rule draws from, plus the normalized key
/// vectors (aligned with `indexable_html.rows`) that feed duplicate
/// detection.
pub struct Segments {
    pub html_pages: Segment,
    pub pdf_pages: Segment,
    pub indexable_html: Segment,
    pub indexable_pdfs: Segment,
    pub clean_titles: Vec<String>,
    pub clean_h1s: Vec<String>,
}

/// Partition the table by content type and indexability. A row with no
/// Content Type value lands in neither partition; the columns themselves are
/// required.
pub fn split(table: &Table) -> Result<Segments, AuditError> {
    const RULE: &str = "segmentation";
    let content_type = table.column(RULE, loader::CONTENT_TYPE)?;
    let indexability = table.column(RULE, loader::INDEXABILITY)?;

    let html_pages = by_content_type(table, "html_pages", content_type, "text/html");
    let pdf_pages = by_content_type(table, "pdf_pages", content_type, "application/pdf");

    let is_indexable = |r: usize| table.value(r, indexability) == INDEXABLE;
    let indexable_html = html_pages.filtered("indexable_html", is_indexable);
    let indexable_pdfs = pdf_pages.filtered("indexable_pdfs", is_indexable);

    let clean_titles = clean_column(table, &indexable_html, loader::TITLE);
    let clean_h1s = clean_column(table, &indexable_html, loader::H1_1);

    for s in [&html_pages, &pdf_pages, &indexable_html, &indexable_pdfs] {
        debug!(segment = s.name, rows = s.rows.len(), "segment built");
    }

    Ok(Segments {
        html_pages,
        pdf_pages,
        indexable_html,
        indexable_pdfs,
        clean_titles,
        clean_h1s,
    })
}

fn by_content_type(
    table: &Table,
    name: &'static str,
    content_type: Column,
    needle: &str,
) -> Segment {
    Segment {
        name,
        rows: (0..table.len())
            .filter(|&r| table.value(r, content_type).contains(needle))
            .collect(),
    }
}

/// Trimmed + lowercased key values for one column, aligned with the segment's
/// rows. A missing cell (or a missing column) normalizes to the empty string;
/// rules that report the column still fail if it is absent.
fn clean_column(table: &Table, segment: &Segment, column: &str) -> Vec<String> {
    match table.lookup(column) {
        Some(col) => segment
            .rows
            .iter()
            .map(|&r| normalize(table.value(r, col)))
            .collect(),
        None => vec![String::new(); segment.rows.len()],
    }
}

pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
