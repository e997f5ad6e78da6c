//! Quotation math and text layout.
//!
//! A cart is a list of [`CartItem`]s, typically copied from search results
//! with a requested quantity added. [`build_quotation`] turns it into
//! numbered lines and a total; rendering to PDF happens elsewhere.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::models::NOT_APPLICABLE;

pub const QUOTATION_TITLE: &str = "Pharmaceutical product quotation";

fn not_applicable() -> String {
    NOT_APPLICABLE.to_string()
}

fn default_quantity() -> u64 {
    1
}

/// One line of a customer cart. Mirrors [`crate::models::ProductRecord`]
/// plus a quantity; every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default = "not_applicable")]
    pub name: String,
    #[serde(default = "not_applicable")]
    pub presentation: String,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub available_quantity: Option<u64>,
    #[serde(default = "not_applicable")]
    pub warehouse_label: String,
    #[serde(default)]
    pub lead_time: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLine {
    pub text: String,
    pub subtotal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quotation {
    pub title: String,
    pub lines: Vec<QuoteLine>,
    pub total: f64,
}

impl Quotation {
    pub fn total_line(&self) -> String {
        format!("Total: ${:.2}", self.total)
    }
}

/// Build a quotation from a cart. An empty cart is rejected.
pub fn build_quotation(cart: &[CartItem]) -> Result<Quotation> {
    if cart.is_empty() {
        bail!("cart must not be empty");
    }

    let mut total = 0.0;
    let lines = cart
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let subtotal = item.unit_price * item.quantity as f64;
            total += subtotal;
            QuoteLine {
                text: format!(
                    "{}. {} - {} - ${:.2} x {} = ${:.2} - Warehouse: {}",
                    i + 1,
                    item.name,
                    item.presentation,
                    item.unit_price,
                    item.quantity,
                    subtotal,
                    item.warehouse_label
                ),
                subtotal,
            }
        })
        .collect();

    Ok(Quotation {
        title: QUOTATION_TITLE.to_string(),
        lines,
        total,
    })
}

/// Greedy word wrap to at most `width` characters per line. Words longer
/// than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let current_len = current.chars().count();
        if !current.is_empty() && current_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
