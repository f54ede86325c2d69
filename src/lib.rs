//! # Sales Analytics
//!
//! Turns a pipe-delimited sales transaction file into an enriched export and
//! a human-readable analytics report.
//!
//! ## Design Principles
//!
//! - **Degrade, don't fail**: malformed lines are dropped, rule violations are
//!   counted, an unreachable catalog means "no matches"
//! - **Fixed-point arithmetic**: revenues are summed with `rust_decimal`
//! - **Order preserving**: parse, validate and enrich keep input order; report
//!   rankings are stable on ties
//! - **Fatal only on deployment errors**: a missing output directory aborts
//!   the run before anything is written
//!
//! ## Example
//!
//! ```no_run
//! use sales_analytics::{run, HttpCatalog, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! let catalog = HttpCatalog::new(config.catalog_url.clone(), config.catalog_timeout);
//! let summary = run(&config, &catalog).unwrap();
//! println!("{} valid transactions", summary.validation.valid);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod money;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod transaction;
pub mod validator;

pub use catalog::{CatalogSource, CatalogUnavailable, HttpCatalog, Product, ProductCatalog};
pub use config::{CliArgs, PipelineConfig};
pub use error::{PipelineError, Result};
pub use money::Money;
pub use pipeline::{run, RunSummary};
pub use report::SalesReport;
pub use transaction::{EnrichedTransaction, Transaction};
pub use validator::{Validation, ValidationSummary};
