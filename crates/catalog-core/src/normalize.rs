//! Schema normalization: arbitrary inventory tables to [`ProductRecord`]s.
//!
//! Warehouses export their inventory with whatever headers their tooling
//! produced ("Nombre", "PRODUCTOS", "Cant. disponible", "Precio unitario",
//! ...). The normalizer infers which columns carry the product name, the
//! stock, and the price, then coerces every row into the fixed seven-field
//! shape.
//!
//! # Column-role inference
//!
//! Headers are compared after trimming and lower-casing. Each role has an
//! ordered list of [`HeaderMatcher`]s; the first matcher that hits any
//! column wins, and within a matcher the leftmost column wins.
//!
//! | Role | Rules (in priority order) |
//! |------|---------------------------|
//! | name | equals `nombre`/`name`, then `productos`/`producto`/`products`/`product`, then `descripción`/`descripcion`/`description` |
//! | stock | contains `stock`, `cant` or `qty` |
//! | price | contains `precio` or `price` |
//!
//! # Coercion
//!
//! Field-level failures never abort a table. A cell that cannot be coerced
//! takes the field default (`0`, `0.0`, [`NO_NAME`], [`NOT_APPLICABLE`]).
//!
//! Prices are read as integer cents after removing `$`, `,` **and** `.`, so
//! `"$12,500"` is `125.00` and `"12.50"` is `12.50`. Downstream consumers
//! depend on this exact rule.

use std::path::Path;

use crate::models::{
    ProductRecord, RawTable, WarehouseTable, LEAD_TIME, NOT_APPLICABLE, NO_NAME,
};

/// How a header is tested against a rule's keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatcher {
    /// The normalized header equals one of the keywords.
    Equals(&'static [&'static str]),
    /// The normalized header contains one of the keywords.
    Contains(&'static [&'static str]),
}

impl HeaderMatcher {
    pub fn matches(&self, header: &str) -> bool {
        match self {
            HeaderMatcher::Equals(words) => words.iter().any(|w| header == *w),
            HeaderMatcher::Contains(words) => words.iter().any(|w| header.contains(w)),
        }
    }
}

pub const NAME_RULES: &[HeaderMatcher] = &[
    HeaderMatcher::Equals(&["nombre", "name"]),
    HeaderMatcher::Equals(&["productos", "producto", "products", "product"]),
    HeaderMatcher::Equals(&["descripción", "descripcion", "description"]),
];

/// `cant` is the "count" token (cantidad). A bare `count` substring is not
/// used: it would claim `discount` and `account` columns.
pub const STOCK_RULES: &[HeaderMatcher] = &[HeaderMatcher::Contains(&["stock", "cant", "qty"])];

pub const PRICE_RULES: &[HeaderMatcher] = &[HeaderMatcher::Contains(&["precio", "price"])];

/// Column names of a table that is already in [`ProductRecord`] shape.
pub const NORMALIZED_HEADERS: [&str; 7] = [
    "product_id",
    "name",
    "presentation",
    "unit_price",
    "available_quantity",
    "warehouse_label",
    "lead_time",
];

/// What kind of file a table was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Spreadsheet,
    /// Delimited text. May already be in normalized shape.
    DelimitedText,
}

/// Column indexes chosen for each role, `None` when no header matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnRoles {
    pub name: Option<usize>,
    pub stock: Option<usize>,
    pub price: Option<usize>,
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

fn find_column(headers: &[String], rules: &[HeaderMatcher]) -> Option<usize> {
    rules
        .iter()
        .find_map(|rule| headers.iter().position(|h| rule.matches(h)))
}

/// Infer name/stock/price columns from raw headers.
pub fn infer_roles(headers: &[String]) -> ColumnRoles {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    ColumnRoles {
        name: find_column(&normalized, NAME_RULES),
        stock: find_column(&normalized, STOCK_RULES),
        price: find_column(&normalized, PRICE_RULES),
    }
}

/// Parse a stock cell as a non-negative integer.
pub fn try_parse_quantity(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

/// Stock cell with the `0` default on failure.
pub fn parse_quantity(raw: &str) -> u64 {
    try_parse_quantity(raw).unwrap_or(0)
}

/// Parse a price cell as integer cents after dropping `$`, `,` and `.`.
pub fn try_parse_price(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '.'))
        .collect();
    let cents = digits.trim().parse::<u64>().ok()?;
    Some(cents as f64 / 100.0)
}

/// Price cell with the `0.0` default on failure.
pub fn parse_price(raw: &str) -> f64 {
    try_parse_price(raw).unwrap_or(0.0)
}

/// Extract the presentation from a product name.
///
/// Returns the leftmost substring matching `FRASCO.*`, `TAB.*` or `CX\d+`
/// (case-sensitive, `.*` stops at a line break), or [`NOT_APPLICABLE`].
pub fn extract_presentation(name: &str) -> String {
    for (start, _) in name.char_indices() {
        let rest = &name[start..];
        if rest.starts_with("FRASCO") || rest.starts_with("TAB") {
            let end = rest.find('\n').unwrap_or(rest.len());
            return rest[..end].to_string();
        }
        if let Some(after) = rest.strip_prefix("CX") {
            let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits > 0 {
                return rest[..2 + digits].to_string();
            }
        }
    }
    NOT_APPLICABLE.to_string()
}

/// Source file name without its extension, lower-cased.
pub fn warehouse_label(source_name: &str) -> String {
    Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_name.to_string())
        .to_lowercase()
}

fn name_or_sentinel(raw: &str) -> String {
    if raw.trim().is_empty() {
        NO_NAME.to_string()
    } else {
        raw.to_string()
    }
}

/// Map a table with unknown headers into normalized records.
///
/// Output has the same row count and order as the input.
pub fn normalize_table(table: &RawTable, source_name: &str) -> WarehouseTable {
    let roles = infer_roles(&table.headers);
    let label = warehouse_label(source_name);

    let records = (0..table.rows.len())
        .map(|row| {
            let name = match roles.name {
                Some(col) => name_or_sentinel(table.cell(row, col)),
                None => NO_NAME.to_string(),
            };
            let available_quantity = roles
                .stock
                .map(|col| parse_quantity(table.cell(row, col)))
                .unwrap_or(0);
            let unit_price = roles
                .price
                .map(|col| parse_price(table.cell(row, col)))
                .unwrap_or(0.0);

            ProductRecord {
                product_id: row.to_string(),
                presentation: extract_presentation(&name),
                name,
                unit_price,
                available_quantity,
                warehouse_label: label.clone(),
                lead_time: LEAD_TIME.to_string(),
            }
        })
        .collect();

    WarehouseTable { label, records }
}

/// True when the headers already expose the normalized `name` and
/// `available_quantity` columns.
pub fn is_pre_normalized(headers: &[String]) -> bool {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    normalized.iter().any(|h| h == "name") && normalized.iter().any(|h| h == "available_quantity")
}

/// Adopt an already-normalized table, backfilling only what is missing.
///
/// Fields are read from same-named columns. `unit_price` is a plain decimal
/// here. `warehouse_label` is always taken from the source name.
pub fn adopt_normalized(table: &RawTable, source_name: &str) -> WarehouseTable {
    let normalized: Vec<String> = table.headers.iter().map(|h| normalize_header(h)).collect();
    let column = |field: &str| normalized.iter().position(|h| h == field);
    let [id_col, name_col, presentation_col, price_col, quantity_col, _, lead_col] =
        NORMALIZED_HEADERS.map(column);
    let label = warehouse_label(source_name);

    let non_blank = |row: usize, col: Option<usize>| {
        col.map(|c| table.cell(row, c).trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let records = (0..table.rows.len())
        .map(|row| {
            let name = non_blank(row, name_col).unwrap_or_else(|| NO_NAME.to_string());
            let presentation =
                non_blank(row, presentation_col).unwrap_or_else(|| extract_presentation(&name));
            let unit_price = non_blank(row, price_col)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|p| p.is_finite() && *p >= 0.0)
                .unwrap_or(0.0);

            ProductRecord {
                product_id: non_blank(row, id_col).unwrap_or_else(|| row.to_string()),
                name,
                presentation,
                unit_price,
                available_quantity: quantity_col
                    .map(|c| parse_quantity(table.cell(row, c)))
                    .unwrap_or(0),
                warehouse_label: label.clone(),
                lead_time: non_blank(row, lead_col).unwrap_or_else(|| LEAD_TIME.to_string()),
            }
        })
        .collect();

    WarehouseTable { label, records }
}

/// Normalize one source. Delimited text already in normalized shape is
/// adopted; everything else goes through role inference.
pub fn normalize_source(table: &RawTable, source_name: &str, kind: SourceKind) -> WarehouseTable {
    match kind {
        SourceKind::DelimitedText if is_pre_normalized(&table.headers) => {
            adopt_normalized(table, source_name)
        }
        _ => normalize_table(table, source_name),
    }
}
