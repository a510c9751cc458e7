//! Aggregate counts over a result set.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use super::csv::Row;

/// Label counted for rows where every category column is missing or empty.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Ordered list of columns a row's category label is read from. The first
/// column holding a non-empty value wins.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CategoryColumns(Vec<String>);

impl CategoryColumns {
    pub fn new<I>(columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self(columns.into_iter().map(Into::into).collect())
    }

    /// Category label of `row`, if any candidate column has a value.
    pub fn label<'r>(&self, row: &'r Row) -> Option<&'r str> {
        self.0.iter().find_map(|column| row.get(column).filter(|v| !v.is_empty()))
    }
}

impl Default for CategoryColumns {
    /// `product`, then the analyzer's own `best_product`.
    fn default() -> Self {
        Self::new(["product", "best_product"])
    }
}

/// Per-label counts in first-seen order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProductCounts(Vec<(String, usize)>);

impl ProductCounts {
    fn increment(&mut self, label: &str) {
        match self.0.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.0.push((label.to_owned(), 1)),
        }
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, c)| *c)
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl Serialize for ProductCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Statistics {
    pub total_clients: usize,
    pub products: ProductCounts,
}

impl Statistics {
    pub fn collect(rows: &[Row], categories: &CategoryColumns) -> Self {
        let mut stats = Self::default();
        for row in rows {
            stats.total_clients += 1;
            stats.products.increment(categories.label(row).unwrap_or(UNKNOWN_LABEL));
        }
        stats
    }
}
