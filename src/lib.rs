//! # Catalog Quoter
//!
//! Product availability search and quotation service over warehouse
//! inventory spreadsheets.
//!
//! Every `.xlsx`, `.xls` and `.csv` file in the inventory directory is one
//! warehouse. Headers are inferred per file, rows are normalized into a
//! common product record, and the merged catalog is served over HTTP and
//! the CLI. Carts built from search results are rendered to PDF quotations
//! that can be emailed to a customer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌───────────────┐
//! │  Inventory  │──▶│   Reader    │──▶│  Normalizer   │
//! │ xlsx/xls/csv│   │  RawTable   │   │ ProductRecord │
//! └─────────────┘   └─────────────┘   └──────┬────────┘
//!                                            │
//!                                    ┌───────▼───────┐
//!                                    │ CatalogHandle │
//!                                    └───┬───────┬───┘
//!                                        ▼       ▼
//!                                   ┌───────┐ ┌──────┐
//!                                   │  CLI  │ │ HTTP │──▶ PDF / SMTP
//!                                   └───────┘ └──────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! quoter warehouses                 # what was loaded
//! quoter search "paracetamol"       # in-stock matches
//! quoter quote cart.json --out cliente.pdf
//! quoter serve                      # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`tabular`] | xlsx, xls and csv readers |
//! | [`loader`] | Directory discovery and catalog assembly |
//! | [`quotes`] | Quotation files on disk |
//! | [`pdf`] | Quotation PDF rendering |
//! | [`mail`] | Quotation delivery over SMTP |
//! | [`export`] | Normalized CSV export |
//! | [`report`] | CLI output formatting |
//! | [`server`] | HTTP server |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! Normalization, search and quotation arithmetic live in the
//! `catalog-core` workspace crate.

pub mod config;
pub mod export;
pub mod loader;
pub mod logging;
pub mod mail;
pub mod pdf;
pub mod quotes;
pub mod report;
pub mod server;
pub mod tabular;
