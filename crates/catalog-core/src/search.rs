//! Catalog search.
//!
//! A search is a read-only scan over a [`Catalog`] snapshot: every record
//! whose name contains the query (case-insensitive) and that has stock.
//! Results keep catalog order, then row order within each table.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::models::{Catalog, ProductRecord};

/// Response shape shared by the HTTP endpoint and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub available: bool,
    pub message: String,
    pub count: usize,
    pub options: Vec<ProductRecord>,
}

/// Trim and lower-case a user query. Blank queries are rejected before any
/// catalog scan.
pub fn normalize_query(raw: &str) -> Result<String> {
    let query = raw.trim().to_lowercase();
    if query.is_empty() {
        bail!("query must not be empty");
    }
    Ok(query)
}

/// Find in-stock products whose name contains `query`.
pub fn search(catalog: &Catalog, query: &str) -> Result<SearchOutcome> {
    let needle = normalize_query(query)?;

    let options: Vec<ProductRecord> = catalog
        .tables
        .iter()
        .flat_map(|t| t.records.iter())
        .filter(|r| r.available_quantity > 0 && r.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    if options.is_empty() {
        return Ok(SearchOutcome {
            available: false,
            message: format!("No availability for '{}'.", needle),
            count: 0,
            options,
        });
    }

    Ok(SearchOutcome {
        available: true,
        message: format!("Found {} options.", options.len()),
        count: options.len(),
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{WarehouseTable, LEAD_TIME};

    fn record(label: &str, id: &str, name: &str, qty: u64) -> ProductRecord {
        ProductRecord {
            product_id: id.to_string(),
            name: name.to_string(),
            presentation: "N/A".to_string(),
            unit_price: 1.0,
            available_quantity: qty,
            warehouse_label: label.to_string(),
            lead_time: LEAD_TIME.to_string(),
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::new(
            vec![
                WarehouseTable {
                    label: "bodega_norte".into(),
                    records: vec![
                        record("bodega_norte", "0", "Paracetamol TAB 500mg", 10),
                        record("bodega_norte", "1", "Ibuprofeno TAB 400mg", 3),
                    ],
                },
                WarehouseTable {
                    label: "bodega_sur".into(),
                    records: vec![record("bodega_sur", "0", "PARACETAMOL Jarabe", 0)],
                },
            ],
            vec![],
        )
    }

    #[test]
    fn zero_stock_matches_are_excluded() {
        let outcome = search(&sample_catalog(), "paracetamol").unwrap();
        assert!(outcome.available);
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.options[0].warehouse_label, "bodega_norte");
        assert_eq!(outcome.message, "Found 1 options.");
    }

    #[test]
    fn query_is_case_insensitive_and_trimmed() {
        let outcome = search(&sample_catalog(), "  TAB ").unwrap();
        assert_eq!(outcome.count, 2);
        let ids: Vec<&str> = outcome.options.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1"]);
    }

    #[test]
    fn no_match_reports_unavailable() {
        let outcome = search(&sample_catalog(), "insulina").unwrap();
        assert!(!outcome.available);
        assert_eq!(outcome.count, 0);
        assert!(outcome.options.is_empty());
        assert_eq!(outcome.message, "No availability for 'insulina'.");
    }

    #[test]
    fn empty_catalog_is_always_unavailable() {
        let outcome = search(&Catalog::default(), "paracetamol").unwrap();
        assert!(!outcome.available);
    }

    #[test]
    fn blank_query_is_rejected() {
        let err = search(&sample_catalog(), "   ").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn query_characters_are_literal() {
        let catalog = Catalog::new(
            vec![WarehouseTable {
                label: "x".into(),
                records: vec![record("x", "0", "Vitamina C (500mg)", 1)],
            }],
            vec![],
        );
        assert_eq!(search(&catalog, "c (500").unwrap().count, 1);
    }
}
