//! Pipe-delimited export of enriched transactions.

use crate::error::Result;
use crate::transaction::EnrichedTransaction;
use csv::{QuoteStyle, WriterBuilder};
use log::{debug, info};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a header line and one line per record to `writer`.
///
/// Values are written without quoting; a `|` inside a field is not escaped.
pub fn write_enriched<W: Write>(writer: W, records: &[EnrichedTransaction]) -> Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(b'|')
        .quote_style(QuoteStyle::Never)
        .has_headers(true)
        .from_writer(writer);

    for record in records {
        csv_writer.serialize(record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Saves `records` to `path`, replacing any existing file.
///
/// Does nothing at all when `records` is empty: the file is neither created
/// nor truncated. Returns the number of records written.
pub fn save_enriched_data(path: &Path, records: &[EnrichedTransaction]) -> Result<usize> {
    if records.is_empty() {
        debug!("No enriched records, skipping export to {}", path.display());
        return Ok(0);
    }

    let file = File::create(path)?;
    write_enriched(file, records)?;
    info!("Exported {} enriched records to {}", records.len(), path.display());
    Ok(records.len())
}
