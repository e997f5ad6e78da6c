//! Catalog loading: discover inventory files, read, normalize, assemble.
//!
//! Only the configured directory itself is scanned, in directory-listing
//! order. Files whose extension is not configured, or whose name matches an
//! exclude glob, are ignored without being opened.
//!
//! Loading never fails. A file that cannot be read is logged, recorded in
//! [`Catalog::skipped`], and left out; a missing directory produces an empty
//! catalog.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use catalog_core::catalog::CatalogHandle;
use catalog_core::models::{Catalog, SkippedSource, WarehouseTable};
use catalog_core::normalize::normalize_source;

use crate::config::CatalogConfig;
use crate::tabular::{read_table_as, ReadError, SourceFormat};

/// A file picked up by discovery, with the reader chosen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredSource {
    pub path: PathBuf,
    pub file_name: String,
    pub format: SourceFormat,
}

/// List eligible files in `config.dir`, in directory-listing order.
pub fn discover_sources(config: &CatalogConfig) -> Result<Vec<DiscoveredSource>> {
    let formats = config.formats();
    let exclude_set = build_globset(&config.exclude_globs)?;

    let mut sources = Vec::new();
    let walker = WalkDir::new(&config.dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(config.follow_symlinks);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %config.dir.display(), error = %e, "cannot list inventory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if exclude_set.is_match(&file_name) {
            debug!(file = %file_name, "excluded by glob");
            continue;
        }

        let format = match SourceFormat::from_path(entry.path()) {
            Some(format) if formats.contains(&format) => format,
            _ => continue,
        };

        sources.push(DiscoveredSource {
            path: entry.path().to_path_buf(),
            file_name,
            format,
        });
    }

    Ok(sources)
}

/// Read and normalize one source.
pub fn load_source(source: &DiscoveredSource) -> Result<WarehouseTable, ReadError> {
    let raw = read_table_as(&source.path, source.format)?;
    Ok(normalize_source(
        &raw,
        &source.file_name,
        source.format.kind(),
    ))
}

/// Build a complete catalog from the configured directory.
pub fn load_catalog(config: &CatalogConfig) -> Catalog {
    if !config.dir.is_dir() {
        warn!(dir = %config.dir.display(), "inventory directory does not exist; catalog is empty");
        return Catalog::default();
    }

    let sources = match discover_sources(config) {
        Ok(sources) => sources,
        Err(e) => {
            warn!(dir = %config.dir.display(), error = %e, "inventory discovery failed; catalog is empty");
            return Catalog::default();
        }
    };

    let mut tables = Vec::new();
    let mut skipped = Vec::new();
    for source in &sources {
        match load_source(source) {
            Ok(table) => {
                debug!(file = %source.file_name, rows = table.len(), "loaded warehouse");
                tables.push(table);
            }
            Err(e) => {
                warn!(file = %source.file_name, error = %e, "skipping unreadable inventory file");
                skipped.push(SkippedSource {
                    file: source.file_name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let catalog = Catalog::new(tables, skipped);
    info!(
        dir = %config.dir.display(),
        warehouses = catalog.table_count(),
        products = catalog.record_count(),
        skipped = catalog.skipped.len(),
        "catalog loaded"
    );
    catalog
}

/// Rebuild the catalog from scratch and swap it into `handle`.
///
/// Returns the catalog this call built, even if another reload has since
/// replaced it.
pub fn reload_catalog(config: &CatalogConfig, handle: &CatalogHandle) -> Arc<Catalog> {
    let catalog = Arc::new(load_catalog(config));
    handle.replace(Arc::clone(&catalog));
    catalog
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
