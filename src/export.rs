//! Export the loaded catalog as normalized CSV files.
//!
//! Each warehouse is written to `<dir>/<label>.csv` with the normalized
//! column set, so the output directory can be pointed at as a catalog
//! directory and is adopted as-is on the next load.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use catalog_core::models::{Catalog, WarehouseTable};
use catalog_core::normalize::NORMALIZED_HEADERS;

/// Write every table in `catalog` into `dir`. Returns the files written.
///
/// Two sources with the same label (e.g. `norte.xlsx` and `norte.csv`) would
/// collide; the later one gets a numeric suffix.
pub fn export_catalog(catalog: &Catalog, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(catalog.tables.len());
    for table in &catalog.tables {
        let mut stem = table.label.clone();
        let mut n = 2;
        while !used.insert(stem.clone()) {
            stem = format!("{}-{}", table.label, n);
            n += 1;
        }
        if stem != table.label {
            warn!(label = %table.label, file = %stem, "duplicate warehouse label; exporting under a new name");
        }

        let path = dir.join(format!("{}.csv", stem));
        write_table(table, &path)?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "catalog exported");
    Ok(written)
}

fn write_table(table: &WarehouseTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(NORMALIZED_HEADERS)?;
    for record in &table.records {
        let price = format!("{:.2}", record.unit_price);
        let quantity = record.available_quantity.to_string();
        writer.write_record([
            record.product_id.as_str(),
            record.name.as_str(),
            record.presentation.as_str(),
            price.as_str(),
            quantity.as_str(),
            record.warehouse_label.as_str(),
            record.lead_time.as_str(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::loader::load_catalog;
    use tempfile::TempDir;

    #[test]
    fn exported_files_reload_to_the_same_records() {
        let src = TempDir::new().unwrap();
        std::fs::write(
            src.path().join("bodega_sur.csv"),
            "Producto,Stock,Precio\n\"Ibuprofeno, TAB 400mg\",7,\"$2,350\"\nJarabe FRASCO 120ml,0,$990\n",
        )
        .unwrap();
        let original = load_catalog(&CatalogConfig {
            dir: src.path().to_path_buf(),
            ..CatalogConfig::default()
        });

        let out = TempDir::new().unwrap();
        let files = export_catalog(&original, out.path()).unwrap();
        assert_eq!(files, vec![out.path().join("bodega_sur.csv")]);

        let reloaded = load_catalog(&CatalogConfig {
            dir: out.path().to_path_buf(),
            ..CatalogConfig::default()
        });
        assert_eq!(reloaded.tables, original.tables);
    }

    #[test]
    fn colliding_labels_get_suffixes() {
        let table = |label: &str| WarehouseTable {
            label: label.to_string(),
            records: vec![],
        };
        let catalog = Catalog::new(vec![table("norte"), table("norte")], vec![]);
        let out = TempDir::new().unwrap();

        let files = export_catalog(&catalog, out.path()).unwrap();
        assert_eq!(
            files,
            vec![out.path().join("norte.csv"), out.path().join("norte-2.csv")]
        );
    }
}
