use thiserror::Error;

/// Everything that can abort an audit run. Zero rule matches is never an
/// error; the report is all-or-nothing.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The upload is not parseable as UTF-8 CSV (bad encoding, broken
    /// quoting, unreadable source).
    #[error("input is not a readable CSV export: {0}")]
    MalformedInput(#[from] csv::Error),

    #[error("could not read input: {0}")]
    Io(#[from] std::io::Error),

    /// Surfaced lazily, at the point a rule (or segmentation) first asks for
    /// the column. Aborts the whole run; there is no partial report.
    #[error("{rule}: column {column:?} is missing from the export")]
    MissingColumn {
        rule: &'static str,
        column: &'static str,
    },

    #[error("could not write the report workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}
