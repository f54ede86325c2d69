//! Error types for the sales analytics pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a pipeline run.
///
/// Bad input data never ends up here: malformed lines, rejected records and
/// an unreachable catalog all degrade gracefully. What remains are problems
/// with where the outputs are supposed to go.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Failed to write an output file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize the enriched export
    #[error("Export serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// An output file's parent directory is missing or is not a directory
    #[error("Output directory {} does not exist or is not a directory", path.display())]
    OutputDirectory { path: PathBuf },

    /// An output directory exists but files cannot be created in it
    #[error("Output directory {} is not writable: {source}", path.display())]
    OutputNotWritable {
        path: PathBuf,
        source: std::io::Error,
    },
}
