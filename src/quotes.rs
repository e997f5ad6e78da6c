//! Quotation files: naming, rendering to disk, and lookup for delivery.
//!
//! Quotations live in `[quotes].dir`. Callers name a file but never a path:
//! only the final path component of a requested name is used, and `.pdf` is
//! appended when missing.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use catalog_core::quote::{build_quotation, CartItem};

use crate::pdf::render_quotation;

pub const DEFAULT_FILE_NAME: &str = "quotation.pdf";

/// Result of rendering a quotation to disk.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedQuote {
    pub file: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub lines: usize,
    pub total: f64,
}

/// Reduce a requested name to a bare `*.pdf` file name.
pub fn sanitize_file_name(requested: Option<&str>) -> Result<String> {
    let requested = requested.map(str::trim).filter(|s| !s.is_empty());
    let Some(requested) = requested else {
        return Ok(DEFAULT_FILE_NAME.to_string());
    };

    let base = Path::new(requested)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.trim().is_empty() && n != "." && n != "..");
    let Some(base) = base else {
        bail!("invalid file name: '{}'", requested);
    };

    if base.to_ascii_lowercase().ends_with(".pdf") {
        Ok(base)
    } else {
        Ok(format!("{}.pdf", base))
    }
}

/// Render `cart` and write it to the quotation directory.
pub fn generate_quote(dir: &Path, file_name: Option<&str>, cart: &[CartItem]) -> Result<GeneratedQuote> {
    let quotation = build_quotation(cart)?;
    let file = sanitize_file_name(file_name)?;
    let bytes = render_quotation(&quotation, chrono::Local::now().date_naive())?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create quotation directory: {}", dir.display()))?;
    let path = dir.join(&file);
    std::fs::write(&path, bytes)
        .with_context(|| format!("Failed to write quotation: {}", path.display()))?;

    info!(file = %file, lines = quotation.lines.len(), total = quotation.total, "quotation generated");
    Ok(GeneratedQuote {
        file,
        path,
        lines: quotation.lines.len(),
        total: quotation.total,
    })
}

/// Locate a previously generated quotation by name.
pub fn find_quote(dir: &Path, file_name: &str) -> Result<PathBuf> {
    let file = sanitize_file_name(Some(file_name))?;
    let path = dir.join(&file);
    if !path.is_file() {
        bail!("quotation {} not found", file);
    }
    Ok(path)
}
