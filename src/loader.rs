use std::collections::HashMap;
use std::io::Read;

use csv::StringRecord;

use crate::error::AuditError;

// Column names as they appear in a Screaming Frog "Internal" export.
pub const ADDRESS: &str = "Address";
pub const CONTENT_TYPE: &str = "Content Type";
pub const INDEXABILITY: &str = "Indexability";
pub const STATUS_CODE: &str = "Status Code";
pub const TITLE: &str = "Title 1";
pub const TITLE_LENGTH: &str = "Title 1 Length";
pub const H1_1: &str = "H1-1";
pub const H1_2: &str = "H1-2";
pub const META_DESCRIPTION: &str = "Meta Description 1";
pub const META_DESCRIPTION_LENGTH: &str = "Meta Description 1 Length";
pub const CANONICAL: &str = "Canonical Link Element 1";
pub const NEAR_DUPLICATES: &str = "No. Near Duplicates";
pub const INLINKS: &str = "Inlinks";

/// Resolved handle to one column of a [`Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column(usize);

/// The loaded crawl export: a header row plus string cells. Columns are
/// resolved by name on demand — there is no upfront schema check, so an
/// export missing a column only fails once a rule actually asks for it.
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

impl Table {
    /// Parse a CSV export. Tolerates a UTF-8 byte-order mark and short rows
    /// (missing trailing cells read back as empty strings).
    pub fn load(mut input: impl Read) -> Result<Table, AuditError> {
        let mut raw = Vec::new();
        input.read_to_end(&mut raw)?;
        let body = strip_bom(&raw);

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(body);
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // First occurrence wins for duplicated header names.
        let mut index = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?);
        }

        Ok(Table {
            headers,
            index,
            rows,
        })
    }

    /// Resolve a column for `rule`, failing with the rule's name attached.
    pub fn column(&self, rule: &'static str, name: &'static str) -> Result<Column, AuditError> {
        self.lookup(name)
            .ok_or(AuditError::MissingColumn { rule, column: name })
    }

    pub fn lookup(&self, name: &str) -> Option<Column> {
        self.index.get(name).copied().map(Column)
    }

    /// Cell value; out-of-range cells (short rows) are empty.
    pub fn value(&self, row: usize, col: Column) -> &str {
        self.rows[row].get(col.0).unwrap_or("")
    }

    /// Integer cell value. Unparseable or empty cells yield `None`, which
    /// excludes the row from numeric predicates rather than failing the run.
    /// Accepts float renderings ("301.0") some exports produce.
    pub fn int(&self, row: usize, col: Column) -> Option<i64> {
        let cell = self.value(row, col).trim();
        if cell.is_empty() {
            return None;
        }
        cell.parse::<i64>()
            .ok()
            .or_else(|| cell.parse::<f64>().ok().map(|f| f as i64))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[allow(dead_code)]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

fn strip_bom(raw: &[u8]) -> &[u8] {
    raw.strip_prefix(b"\xef\xbb\xbf").unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load(csv: &str) -> Table {
        Table::load(Cursor::new(csv.as_bytes())).unwrap()
    }

    #[test]
    fn parses_headers_and_rows() {
        let t = load("Address,Status Code\nhttps://a.example/,200\nhttps://b.example/,404\n");
        assert_eq!(t.len(), 2);
        let addr = t.lookup(ADDRESS).unwrap();
        let status = t.lookup(STATUS_CODE).unwrap();
        assert_eq!(t.value(0, addr), "https://a.example/");
        assert_eq!(t.int(1, status), Some(404));
    }

    #[test]
    fn strips_byte_order_mark() {
        let bytes = b"\xef\xbb\xbfAddress\nhttps://a.example/\n";
        let t = Table::load(Cursor::new(&bytes[..])).unwrap();
        assert!(t.lookup(ADDRESS).is_some());
    }

    #[test]
    fn short_rows_read_as_empty() {
        let t = load("Address,Title 1\nhttps://a.example/\n");
        let title = t.lookup(TITLE).unwrap();
        assert_eq!(t.value(0, title), "");
    }

    #[test]
    fn missing_column_carries_rule_name() {
        let t = load("Address\nhttps://a.example/\n");
        match t.column("Orphan URLs", INLINKS) {
            Err(AuditError::MissingColumn { rule, column }) => {
                assert_eq!(rule, "Orphan URLs");
                assert_eq!(column, INLINKS);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_header_first_wins() {
        let t = load("Address,Address\nfirst,second\n");
        let addr = t.lookup(ADDRESS).unwrap();
        assert_eq!(t.value(0, addr), "first");
    }

    #[test]
    fn unparseable_int_is_none() {
        let t = load("Status Code\nNot Set\n301.0\n");
        let status = t.lookup(STATUS_CODE).unwrap();
        assert_eq!(t.int(0, status), None);
        assert_eq!(t.int(1, status), Some(301));
    }

    #[test]
    fn rejects_non_utf8() {
        let bytes = b"Address\n\xff\xfe\x00bad\n";
        assert!(matches!(
            Table::load(Cursor::new(&bytes[..])),
            Err(AuditError::MalformedInput(_))
        ));
    }
}
