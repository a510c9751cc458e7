//! Line-oriented CSV reader for the analyzer's result file.
//!
//! This is deliberately *not* RFC 4180: there is no quoting and no escaping.
//! Every `,` is a field separator, so a cell that contains a comma is split
//! into two fields. The analyzer's output never quotes, and keeping the
//! splitter this simple keeps the JSON output identical to what the site has
//! always served.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One data record, keyed by header column name.
///
/// Columns keep header order. A header name that appears twice keeps its
/// first position and takes the value of its last occurrence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    fn with_capacity(capacity: usize) -> Self {
        Self { cells: Vec::with_capacity(capacity) }
    }

    fn insert(&mut self, column: &str, value: &str) {
        match self.cells.iter_mut().find(|(name, _)| name == column) {
            Some(cell) => value.clone_into(&mut cell.1),
            None => self.cells.push((column.to_owned(), value.to_owned())),
        }
    }

    /// Cell value for `column`, if the header has such a column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Column names in header order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize { self.cells.len() }
    pub fn is_empty(&self) -> bool { self.cells.is_empty() }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Parses the whole file content into rows, in file order.
///
/// - the first line is the header; names are trimmed, a UTF-8 BOM is dropped
/// - blank (whitespace-only) lines are skipped, including a trailing one
/// - values are trimmed, so `\r\n` line endings read the same as `\n`
/// - a short line gets `""` for its missing trailing columns
/// - fields beyond the header's width are ignored
pub fn parse(content: &str) -> Vec<Row> {
    let mut lines = content.split('\n');
    let header = lines.next().unwrap_or_default();
    let header = header.strip_prefix('\u{feff}').unwrap_or(header);
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut fields = line.split(',').map(str::trim);
            let mut row = Row::with_capacity(columns.len());
            for column in &columns {
                row.insert(column, fields.next().unwrap_or(""));
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_header_with_values() {
        let rows = parse("a,b,product\n1,2,X\n3,4,Y\n5,6,X\n");
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.columns().collect::<Vec<_>>(), ["a", "b", "product"]);
        }
        assert_eq!(rows[1].get("a"), Some("3"));
        assert_eq!(rows[2].get("product"), Some("X"));
    }

    #[test]
    fn short_line_fills_empty_strings() {
        let rows = parse("a,b,c\n1,2");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0].get("c"), Some(""));
    }

    #[test]
    fn long_line_is_truncated_to_header() {
        let rows = parse("a,b\n1,2,3,4");
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].get("b"), Some("2"));
    }

    #[test]
    fn skips_blank_lines() {
        let rows = parse("a,b\n\n1,2\n   \n3,4\n\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("a"), Some("1"));
        assert_eq!(rows[1].get("a"), Some("3"));
    }

    #[test]
    fn trims_whitespace_and_carriage_returns() {
        let rows = parse(" client_id , best_product \r\n 7 , deposits \r\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("client_id"), Some("7"));
        assert_eq!(rows[0].get("best_product"), Some("deposits"));
    }

    #[test]
    fn strips_bom() {
        let rows = parse("\u{feff}client_id,best_product\n1,credit_card");
        assert_eq!(rows[0].get("client_id"), Some("1"));
    }

    #[test]
    fn commas_are_never_quoted() {
        let rows = parse("id,note\n1,\"hello, world\"");
        assert_eq!(rows[0].get("note"), Some("\"hello"));
    }

    #[test]
    fn duplicate_header_keeps_last_value() {
        let rows = parse("a,b,a\n1,2,3");
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(rows[0].get("a"), Some("3"));
    }

    #[test]
    fn header_only_or_empty() {
        assert!(parse("a,b,c\n").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn serializes_in_header_order() {
        let rows = parse("z,a,m\n1,2,3");
        let json = serde_json::to_string(&rows[0]).unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2","m":"3"}"#);
    }
}
