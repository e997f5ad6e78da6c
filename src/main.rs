//! # Catalog Quoter CLI (`quoter`)
//!
//! Loads warehouse inventories from a directory and answers availability
//! queries, renders quotations, and serves the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! quoter --config ./config/quoter.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quoter serve` | Load the catalog and start the HTTP server |
//! | `quoter search "<query>"` | Print in-stock products matching a name |
//! | `quoter warehouses` | Print per-warehouse row counts and skipped files |
//! | `quoter export <dir>` | Write every warehouse as a normalized CSV |
//! | `quoter quote <cart.json>` | Render a cart to a quotation PDF |
//! | `quoter send <to> <file>` | Email a rendered quotation |
//!
//! ## Examples
//!
//! ```bash
//! # What was loaded, and what was skipped
//! quoter warehouses --config ./config/quoter.toml
//!
//! # Machine-readable search results
//! quoter search "paracetamol" --json
//!
//! # Render and deliver a quotation
//! quoter quote cart.json --out cliente_42.pdf
//! quoter send cliente@example.com cliente_42.pdf
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use catalog_core::quote::CartItem;
use catalog_core::search::search;
use catalog_quoter::config::{self, Config};
use catalog_quoter::export::export_catalog;
use catalog_quoter::loader::load_catalog;
use catalog_quoter::mail::{Mailer, SmtpMailer};
use catalog_quoter::quotes::{find_quote, generate_quote};
use catalog_quoter::{logging, report, server};

/// Catalog Quoter: availability search and quotations over warehouse
/// inventory spreadsheets.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/quoter.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "quoter",
    about = "Catalog Quoter: availability search and quotations over warehouse inventories",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/quoter.toml`. `search`, `warehouses` and
    /// `export` fall back to built-in defaults (current directory) when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./config/quoter.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the catalog and start the HTTP server.
    Serve,

    /// Search the catalog for in-stock products.
    ///
    /// Matches are case-insensitive substrings of the product name.
    Search {
        /// Product name, or part of one.
        query: String,

        /// Print the raw result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print per-warehouse row counts and any skipped files.
    Warehouses,

    /// Write every warehouse to `<dir>/<label>.csv` in normalized form.
    Export {
        /// Output directory (created if missing).
        dir: PathBuf,
    },

    /// Render a cart (JSON array of items) to a quotation PDF.
    Quote {
        /// Path to the cart JSON file.
        cart: PathBuf,

        /// Output file name inside the quotation directory.
        #[arg(long)]
        out: Option<String>,
    },

    /// Email a rendered quotation.
    Send {
        /// Recipient address.
        to: String,

        /// Quotation file name in the quotation directory, or a path.
        file: PathBuf,
    },
}

impl Commands {
    fn config_optional(&self) -> bool {
        matches!(
            self,
            Commands::Search { .. } | Commands::Warehouses | Commands::Export { .. }
        )
    }
}

fn resolve_config(path: &Path, optional: bool) -> Result<Config> {
    if optional && !path.exists() {
        return Ok(Config::minimal());
    }
    config::load_config(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = resolve_config(&cli.config, cli.command.config_optional())?;
    logging::init(&cfg.logging);
    debug!(config = %cli.config.display(), "configuration resolved");

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Search { query, json } => {
            let catalog = load_catalog(&cfg.catalog);
            let outcome = search(&catalog, &query)?;
            print!("{}", report::render_search(&outcome, json)?);
            if json {
                println!();
            }
        }
        Commands::Warehouses => {
            let catalog = load_catalog(&cfg.catalog);
            print!("{}", report::render_summary(&catalog.summary())?);
        }
        Commands::Export { dir } => {
            let catalog = load_catalog(&cfg.catalog);
            let files = export_catalog(&catalog, &dir)?;
            for file in &files {
                println!("{}", file.display());
            }
            println!("Exported {} warehouses.", files.len());
        }
        Commands::Quote { cart, out } => {
            let content = std::fs::read_to_string(&cart)
                .with_context(|| format!("Failed to read cart file: {}", cart.display()))?;
            let items: Vec<CartItem> = serde_json::from_str(&content)
                .with_context(|| format!("Invalid cart JSON: {}", cart.display()))?;
            let generated = generate_quote(&cfg.quotes.dir, out.as_deref(), &items)?;
            println!(
                "Quotation written to {} ({} lines, total ${:.2})",
                generated.path.display(),
                generated.lines,
                generated.total
            );
        }
        Commands::Send { to, file } => {
            let Some(mail) = cfg.mail.clone() else {
                bail!("quotation delivery is not configured (missing [mail] section)");
            };
            let path = if file.is_file() {
                file
            } else {
                find_quote(&cfg.quotes.dir, &file.to_string_lossy())?
            };
            let mailer = SmtpMailer::new(mail);
            tokio::task::spawn_blocking(move || mailer.send_quote(&to, &path).map(|_| to))
                .await?
                .map(|to| println!("Quotation sent to {}.", to))?;
        }
    }

    Ok(())
}
