//! Human-readable CLI output for search results and catalog diagnostics.

use anyhow::Result;
use std::fmt::Write as _;

use catalog_core::models::CatalogSummary;
use catalog_core::search::SearchOutcome;

/// Format a search outcome, or pretty JSON when `json` is set.
pub fn render_search(outcome: &SearchOutcome, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(outcome)?);
    }

    let mut out = String::new();
    writeln!(out, "{}", outcome.message)?;
    for (i, option) in outcome.options.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "{}. {}", i + 1, option.name)?;
        writeln!(out, "    presentation: {}", option.presentation)?;
        writeln!(out, "    price: ${:.2}", option.unit_price)?;
        writeln!(out, "    available: {}", option.available_quantity)?;
        writeln!(
            out,
            "    warehouse: {} (lead time {})",
            option.warehouse_label, option.lead_time
        )?;
    }
    Ok(out)
}

pub fn render_summary(summary: &CatalogSummary) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Warehouses: {}", summary.total_warehouses)?;
    let width = summary
        .details
        .iter()
        .map(|d| d.warehouse.len())
        .max()
        .unwrap_or(0);
    for detail in &summary.details {
        writeln!(out, "  {:<width$}  {:>6} products", detail.warehouse, detail.products)?;
    }
    if !summary.skipped.is_empty() {
        writeln!(out)?;
        writeln!(out, "Skipped: {}", summary.skipped.len())?;
        for skipped in &summary.skipped {
            writeln!(out, "  {}: {}", skipped.file, skipped.error)?;
        }
    }
    Ok(out)
}
