//! End-to-end sales pipeline.
//!
//! Stages run strictly in sequence, each consuming the previous stage's
//! output:
//!
//! ```text
//! read lines -> parse -> validate -> enrich (catalog) -> export
//!                            \_______________________-> report
//! ```

use crate::catalog::{enrich_sales_data, fetch_all_products, CatalogSource, ProductCatalog};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::export::save_enriched_data;
use crate::reader::read_sales_lines;
use crate::report::{generate_sales_report, SalesReport};
use crate::transaction::parse_transactions;
use crate::validator::{validate_and_filter, ValidationSummary};
use log::info;

/// Counts from one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Data lines read (header excluded).
    pub lines: usize,

    /// Lines that parsed into transactions.
    pub parsed: usize,

    pub validation: ValidationSummary,

    /// Distinct products in the catalog lookup.
    pub catalog_size: usize,

    /// Records written to the enriched export.
    pub exported: usize,

    pub report: SalesReport,
}

/// Runs every stage using `catalog` for enrichment.
///
/// Output directories are checked before any work is done; that is the only
/// failure that aborts a run before writing outputs.
pub fn run<C: CatalogSource + ?Sized>(config: &PipelineConfig, catalog: &C) -> Result<RunSummary> {
    config.validate()?;

    let lines = read_sales_lines(&config.input_path);
    let parsed = parse_transactions(&lines);
    info!("Parsed {} of {} lines", parsed.len(), lines.len());
    let parsed_count = parsed.len();

    let validation = validate_and_filter(parsed);
    let summary = validation.summary();
    info!(
        "Validated {} transactions: {} valid, {} invalid",
        summary.total, summary.valid, summary.invalid
    );

    let lookup = ProductCatalog::from_products(fetch_all_products(catalog));
    let catalog_size = lookup.len();
    let enriched = enrich_sales_data(&validation.valid, &lookup);
    drop(lookup);
    info!(
        "Enriched {} transactions, {} matched the catalog",
        enriched.len(),
        enriched.iter().filter(|e| e.api_match).count()
    );

    let exported = save_enriched_data(&config.export_path, &enriched)?;
    let report = generate_sales_report(&config.report_path, &validation.valid, &enriched)?;

    Ok(RunSummary {
        lines: lines.len(),
        parsed: parsed_count,
        validation: summary,
        catalog_size,
        exported,
        report,
    })
}
