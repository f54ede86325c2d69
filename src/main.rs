//! Sales Analytics CLI
//!
//! Reads the sales data file, validates and enriches its transactions, then
//! writes the enriched export and the analytics report.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --input data/sales_data.txt --report output/sales_report.txt
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `info` or `debug` to control logging verbosity

use clap::Parser;
use log::info;
use sales_analytics::{run, CliArgs, HttpCatalog, Result};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = execute() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn execute() -> Result<()> {
    let config = CliArgs::parse().into_config();
    let catalog = HttpCatalog::new(config.catalog_url.clone(), config.catalog_timeout);

    let summary = run(&config, &catalog)?;
    println!("✓ Detailed sales report generated");
    info!(
        "{} records in report, {} exported",
        summary.report.records,
        summary.exported
    );

    println!("Process Completed Successfully");
    Ok(())
}
