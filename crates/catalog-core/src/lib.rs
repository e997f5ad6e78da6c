//! # Catalog Quoter Core
//!
//! Pure logic for Catalog Quoter: the normalized product model, the schema
//! normalizer that maps arbitrary spreadsheet headers onto it, the
//! process-scoped catalog handle, catalog search, and quotation math.
//!
//! This crate does no filesystem, network, or async work. Reading files and
//! serving HTTP live in the `catalog-quoter` crate.

pub mod catalog;
pub mod models;
pub mod normalize;
pub mod quote;
pub mod search;
