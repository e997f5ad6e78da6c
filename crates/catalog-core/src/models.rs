//! Core data models shared by the normalizer, the loader, search, and the
//! quotation renderer.

use serde::{Deserialize, Serialize};

/// Sentinel name for rows whose source exposes no usable name column or cell.
pub const NO_NAME: &str = "NO_NAME";

/// Sentinel presentation when none can be extracted from the name.
pub const NOT_APPLICABLE: &str = "N/A";

/// Lead time attached to every record. There is no per-source variation.
pub const LEAD_TIME: &str = "2 days";

/// A raw table as produced by a tabular reader, before normalization.
///
/// Headers are kept exactly as they appear in the source (no trimming or
/// case folding). Rows may be shorter than the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Cell at `(row, column)`, or `""` when the row is ragged.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// The normalized seven-field product shape every source row is mapped into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Zero-based row index within its source. Not unique across warehouses.
    pub product_id: String,
    pub name: String,
    pub presentation: String,
    pub unit_price: f64,
    pub available_quantity: u64,
    pub warehouse_label: String,
    pub lead_time: String,
}

/// All normalized records from one source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarehouseTable {
    pub label: String,
    pub records: Vec<ProductRecord>,
}

impl WarehouseTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A source file that could not be read during a catalog load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSource {
    pub file: String,
    pub error: String,
}

/// The merged in-memory catalog: one table per loaded source, in discovery
/// order. Immutable once built; a reload produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    pub tables: Vec<WarehouseTable>,
    pub skipped: Vec<SkippedSource>,
}

impl Catalog {
    pub fn new(tables: Vec<WarehouseTable>, skipped: Vec<SkippedSource>) -> Self {
        Self { tables, skipped }
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn record_count(&self) -> usize {
        self.tables.iter().map(WarehouseTable::len).sum()
    }

    /// Per-table label and row count, used to verify load results.
    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            total_warehouses: self.tables.len(),
            details: self
                .tables
                .iter()
                .map(|t| WarehouseSummary {
                    warehouse: t.label.clone(),
                    products: t.len(),
                })
                .collect(),
            skipped: self.skipped.clone(),
        }
    }
}

/// Diagnostics view of a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total_warehouses: usize,
    pub details: Vec<WarehouseSummary>,
    pub skipped: Vec<SkippedSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarehouseSummary {
    pub warehouse: String,
    pub products: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, id: &str) -> ProductRecord {
        ProductRecord {
            product_id: id.to_string(),
            name: "x".to_string(),
            presentation: NOT_APPLICABLE.to_string(),
            unit_price: 0.0,
            available_quantity: 0,
            warehouse_label: label.to_string(),
            lead_time: LEAD_TIME.to_string(),
        }
    }

    #[test]
    fn ragged_rows_read_as_empty_cells() {
        let table = RawTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()]],
        );
        assert_eq!(table.cell(0, 0), "1");
        assert_eq!(table.cell(0, 1), "");
        assert_eq!(table.cell(5, 0), "");
    }

    #[test]
    fn summary_lists_every_table_in_order() {
        let catalog = Catalog::new(
            vec![
                WarehouseTable {
                    label: "norte".into(),
                    records: vec![record("norte", "0"), record("norte", "1")],
                },
                WarehouseTable {
                    label: "sur".into(),
                    records: vec![],
                },
            ],
            vec![SkippedSource {
                file: "broken.xlsx".into(),
                error: "bad zip".into(),
            }],
        );

        let summary = catalog.summary();
        assert_eq!(summary.total_warehouses, 2);
        assert_eq!(summary.details[0].warehouse, "norte");
        assert_eq!(summary.details[0].products, 2);
        assert_eq!(summary.details[1].products, 0);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(catalog.record_count(), 2);
    }
}
