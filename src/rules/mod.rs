pub mod dedupe;

use tracing::debug;

use crate::error::AuditError;
use crate::loader::{self, Column, Table};
use crate::segment::{Segment, Segments, NON_INDEXABLE};
use dedupe::find_duplicates;

/// One rule's outcome: the matching rows projected to the rule's output
/// columns. A result with no rows still reaches the dashboard as count 0.
pub struct RuleResult {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl RuleResult {
    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

/// Evaluate the whole catalog in its fixed order. Rules are independent;
/// the order here is also the sheet-emission order.
pub fn evaluate_all(table: &Table, seg: &Segments) -> Result<Vec<RuleResult>, AuditError> {
    let results = vec![
        missing_canonicals(table, seg)?,
        nonindexable_urls(table, seg)?,
        redirected_urls(table, seg)?,
        client_error_urls(table, seg)?,
        missing_titles(table, seg)?,
        titles_too_long(table, seg)?,
        titles_too_short(table, seg)?,
        duplicate_titles(table, seg)?,
        missing_h1s(table, seg)?,
        multiple_h1s(table, seg)?,
        duplicate_h1s(table, seg)?,
        missing_meta_descriptions(table, seg)?,
        meta_too_short(table, seg)?,
        meta_too_long(table, seg)?,
        duplicate_meta_descriptions(table, seg)?,
        near_duplicate_content(table, seg)?,
        orphan_urls(table, seg)?,
    ];
    for r in &results {
        debug!(rule = r.name, matches = r.count(), "rule evaluated");
    }
    Ok(results)
}

fn matching(segment: &Segment, pred: impl Fn(usize) -> bool) -> Vec<usize> {
    segment.rows.iter().copied().filter(|&r| pred(r)).collect()
}

fn project(table: &Table, rows: &[usize], cols: &[Column]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|&r| {
            cols.iter()
                .map(|&c| table.value(r, c).to_string())
                .collect()
        })
        .collect()
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// The only rule drawing on two segments; HTML rows precede PDF rows.
fn missing_canonicals(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    const NAME: &str = "Missing Canonicals";
    let address = table.column(NAME, loader::ADDRESS)?;
    let canonical = table.column(NAME, loader::CANONICAL)?;

    let empty_canonical = |r: usize| table.value(r, canonical).is_empty();
    let mut rows = matching(&seg.indexable_html, empty_canonical);
    rows.extend(matching(&seg.indexable_pdfs, empty_canonical));

    Ok(RuleResult {
        name: NAME,
        columns: vec![loader::ADDRESS],
        rows: project(table, &rows, &[address]),
    })
}

fn nonindexable_urls(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    const NAME: &str = "Nonindexable URLs";
    let address = table.column(NAME, loader::ADDRESS)?;
    let indexability = table.column(NAME, loader::INDEXABILITY)?;

    let rows = matching(&seg.html_pages, |r| {
        table.value(r, indexability) == NON_INDEXABLE
    });
    Ok(RuleResult {
        name: NAME,
        columns: vec![loader::ADDRESS, loader::INDEXABILITY],
        rows: project(table, &rows, &[address, indexability]),
    })
}

fn status_range(
    table: &Table,
    seg: &Segments,
    name: &'static str,
    lo: i64,
    hi: i64,
) -> Result<RuleResult, AuditError> {
    let address = table.column(name, loader::ADDRESS)?;
    let status = table.column(name, loader::STATUS_CODE)?;

    let rows = matching(&seg.html_pages, |r| {
        table
            .int(r, status)
            .is_some_and(|code| (lo..=hi).contains(&code))
    });
    Ok(RuleResult {
        name,
        columns: vec![loader::ADDRESS, loader::STATUS_CODE],
        rows: project(table, &rows, &[address, status]),
    })
}

fn redirected_urls(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    status_range(table, seg, "3XX URLs", 300, 399)
}

fn client_error_urls(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    status_range(table, seg, "4XX URLs", 400, 499)
}

fn missing_titles(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    const NAME: &str = "Missing Titles";
    let address = table.column(NAME, loader::ADDRESS)?;
    let title = table.column(NAME, loader::TITLE)?;

    let rows = matching(&seg.indexable_html, |r| blank(table.value(r, title)));
    Ok(RuleResult {
        name: NAME,
        columns: vec![loader::ADDRESS],
        rows: project(table, &rows, &[address]),
    })
}

/// Length rules are strict: a cell exactly at the boundary does not match.
fn length_rule(
    table: &Table,
    seg: &Segments,
    name: &'static str,
    length_column: &'static str,
    pred: impl Fn(i64) -> bool,
) -> Result<RuleResult, AuditError> {
    let address = table.column(name, loader::ADDRESS)?;
    let length = table.column(name, length_column)?;

    let rows = matching(&seg.indexable_html, |r| {
        table.int(r, length).is_some_and(&pred)
    });
    Ok(RuleResult {
        name,
        columns: vec![loader::ADDRESS, length_column],
        rows: project(table, &rows, &[address, length]),
    })
}

fn titles_too_long(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    length_rule(table, seg, "Titles Too Long", loader::TITLE_LENGTH, |n| {
        n > 60
    })
}

fn titles_too_short(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    length_rule(table, seg, "Titles Too Short", loader::TITLE_LENGTH, |n| {
        n < 30
    })
}

fn duplicate_titles(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    const NAME: &str = "Duplicate Titles";
    let address = table.column(NAME, loader::ADDRESS)?;
    let title = table.column(NAME, loader::TITLE)?;

    Ok(RuleResult {
        name: NAME,
        columns: vec![loader::ADDRESS, loader::TITLE],
        rows: find_duplicates(
            table,
            &seg.indexable_html.rows,
            &seg.clean_titles,
            address,
            title,
        ),
    })
}

fn missing_h1s(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    const NAME: &str = "Missing H1s";
    let address = table.column(NAME, loader::ADDRESS)?;
    let h1_1 = table.column(NAME, loader::H1_1)?;
    let h1_2 = table.column(NAME, loader::H1_2)?;

    let rows = matching(&seg.indexable_html, |r| {
        blank(table.value(r, h1_1)) && blank(table.value(r, h1_2))
    });
    Ok(RuleResult {
        name: NAME,
        columns: vec![loader::ADDRESS],
        rows: project(table, &rows, &[address]),
    })
}

fn multiple_h1s(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    const NAME: &str = "Multiple H1s";
    let address = table.column(NAME, loader::ADDRESS)?;
    let h1_1 = table.column(NAME, loader::H1_1)?;
    let h1_2 = table.column(NAME, loader::H1_2)?;

    // "Present" is the raw cell, so a whitespace-only heading still counts.
    let rows = matching(&seg.indexable_html, |r| {
        !table.value(r, h1_1).is_empty() && !table.value(r, h1_2).is_empty()
    });
    Ok(RuleResult {
        name: NAME,
        columns: vec![loader::ADDRESS, loader::H1_1, loader::H1_2],
        rows: project(table, &rows, &[address, h1_1, h1_2]),
    })
}

fn duplicate_h1s(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    const NAME: &str = "Duplicate H1s";
    let address = table.column(NAME, loader::ADDRESS)?;
    let h1 = table.column(NAME, loader::H1_1)?;

    Ok(RuleResult {
        name: NAME,
        columns: vec![loader::ADDRESS, loader::H1_1],
        rows: find_duplicates(
            table,
            &seg.indexable_html.rows,
            &seg.clean_h1s,
            address,
            h1,
        ),
    })
}

fn missing_meta_descriptions(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    const NAME: &str = "Missing Meta Descriptions";
    let address = table.column(NAME, loader::ADDRESS)?;
    let meta = table.column(NAME, loader::META_DESCRIPTION)?;

    let rows = matching(&seg.indexable_html, |r| table.value(r, meta).is_empty());
    Ok(RuleResult {
        name: NAME,
        columns: vec![loader::ADDRESS],
        rows: project(table, &rows, &[address]),
    })
}

fn meta_too_short(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    length_rule(
        table,
        seg,
        "Meta Too Short",
        loader::META_DESCRIPTION_LENGTH,
        |n| n < 50,
    )
}

fn meta_too_long(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    length_rule(
        table,
        seg,
        "Meta Too Long",
        loader::META_DESCRIPTION_LENGTH,
        |n| n > 160,
    )
}

/// Keys here stay raw, unlike the title/H1 rules; the source checklist
/// compares meta descriptions without normalization.
fn duplicate_meta_descriptions(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    const NAME: &str = "Duplicate Meta Descriptions";
    let address = table.column(NAME, loader::ADDRESS)?;
    let meta = table.column(NAME, loader::META_DESCRIPTION)?;

    let keys: Vec<String> = seg
        .indexable_html
        .rows
        .iter()
        .map(|&r| table.value(r, meta).to_string())
        .collect();
    Ok(RuleResult {
        name: NAME,
        columns: vec![loader::ADDRESS, loader::META_DESCRIPTION],
        rows: find_duplicates(table, &seg.indexable_html.rows, &keys, address, meta),
    })
}

fn near_duplicate_content(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    const NAME: &str = "Near Duplicate Content";
    let address = table.column(NAME, loader::ADDRESS)?;
    let near = table.column(NAME, loader::NEAR_DUPLICATES)?;

    let rows = matching(&seg.indexable_html, |r| {
        table.int(r, near).is_some_and(|n| n > 0)
    });
    Ok(RuleResult {
        name: NAME,
        columns: vec![loader::ADDRESS, loader::NEAR_DUPLICATES],
        rows: project(table, &rows, &[address, near]),
    })
}

fn orphan_urls(table: &Table, seg: &Segments) -> Result<RuleResult, AuditError> {
    const NAME: &str = "Orphan URLs";
    let address = table.column(NAME, loader::ADDRESS)?;
    let inlinks = table.column(NAME, loader::INLINKS)?;

    let rows = matching(&seg.indexable_html, |r| {
        table.int(r, inlinks) == Some(0)
    });
    Ok(RuleResult {
        name: NAME,
        columns: vec![loader::ADDRESS],
        rows: project(table, &rows, &[address]),
    })
}
