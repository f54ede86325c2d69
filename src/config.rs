//! Pipeline configuration and the command line that fills it in.

use crate::catalog::{DEFAULT_CATALOG_TIMEOUT, DEFAULT_CATALOG_URL};
use crate::error::{PipelineError, Result};
use clap::Parser;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

pub const DEFAULT_INPUT_PATH: &str = "data/sales_data.txt";
pub const DEFAULT_EXPORT_PATH: &str = "data/enriched_sales_data.txt";
pub const DEFAULT_REPORT_PATH: &str = "output/sales_report.txt";

/// Where the pipeline reads from and writes to.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub export_path: PathBuf,
    pub report_path: PathBuf,
    pub catalog_url: String,
    pub catalog_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            catalog_timeout: DEFAULT_CATALOG_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    /// Checks that both output files can be placed where configured.
    ///
    /// The input path is not checked: a missing input file is read as empty.
    pub fn validate(&self) -> Result<()> {
        ensure_parent_dir(&self.export_path)?;
        ensure_parent_dir(&self.report_path)?;
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        // A bare file name lands in the working directory
        _ => Path::new("."),
    };

    if !parent.is_dir() {
        return Err(PipelineError::OutputDirectory {
            path: parent.to_path_buf(),
        });
    }

    ensure_writable(parent)
}

/// Creates and removes a scratch file in `dir`.
fn ensure_writable(dir: &Path) -> Result<()> {
    let scratch = dir.join(format!(".sales-analytics-{}.check", process::id()));
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&scratch)
        .map_err(|source| PipelineError::OutputNotWritable {
            path: dir.to_path_buf(),
            source,
        })?;
    fs::remove_file(&scratch)?;
    Ok(())
}

/// Validate, enrich and report on a pipe-delimited sales file
#[derive(Parser, Debug)]
#[command(name = "sales-analytics")]
#[command(about = "Validate, enrich and report on a pipe-delimited sales file", long_about = None)]
pub struct CliArgs {
    /// Sales data file to read
    #[arg(long = "input", value_name = "PATH", default_value = DEFAULT_INPUT_PATH)]
    pub input: PathBuf,

    /// Where to write the enriched export
    #[arg(long = "export", value_name = "PATH", default_value = DEFAULT_EXPORT_PATH)]
    pub export: PathBuf,

    /// Where to write the analytics report
    #[arg(long = "report", value_name = "PATH", default_value = DEFAULT_REPORT_PATH)]
    pub report: PathBuf,

    /// Product catalog endpoint
    #[arg(long = "catalog-url", value_name = "URL", default_value = DEFAULT_CATALOG_URL)]
    pub catalog_url: String,

    /// Catalog request timeout in seconds
    #[arg(
        long = "catalog-timeout",
        value_name = "SECS",
        default_value_t = DEFAULT_CATALOG_TIMEOUT.as_secs()
    )]
    pub catalog_timeout: u64,
}

impl CliArgs {
    pub fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            input_path: self.input,
            export_path: self.export,
            report_path: self.report,
            catalog_url: self.catalog_url,
            catalog_timeout: Duration::from_secs(self.catalog_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_gives_defaults() {
        let config = CliArgs::try_parse_from(["sales-analytics"])
            .unwrap()
            .into_config();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.catalog_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_flags_override() {
        let config = CliArgs::try_parse_from([
            "sales-analytics",
            "--input",
            "in.txt",
            "--export",
            "out/enriched.txt",
            "--report",
            "out/report.txt",
            "--catalog-url",
            "http://localhost:8080/products",
            "--catalog-timeout",
            "3",
        ])
        .unwrap()
        .into_config();

        assert_eq!(config.input_path, PathBuf::from("in.txt"));
        assert_eq!(config.export_path, PathBuf::from("out/enriched.txt"));
        assert_eq!(config.report_path, PathBuf::from("out/report.txt"));
        assert_eq!(config.catalog_url, "http://localhost:8080/products");
        assert_eq!(config.catalog_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_rejects_unknown_flag_and_bad_timeout() {
        assert!(CliArgs::try_parse_from(["sales-analytics", "--verbose"]).is_err());
        assert!(CliArgs::try_parse_from(["sales-analytics", "--catalog-timeout", "soon"]).is_err());
    }

    #[test]
    fn test_validate_existing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            export_path: dir.path().join("enriched.txt"),
            report_path: dir.path().join("report.txt"),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bare_file_names() {
        let config = PipelineConfig {
            export_path: PathBuf::from("enriched.txt"),
            report_path: PathBuf::from("report.txt"),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let config = PipelineConfig {
            export_path: dir.path().join("enriched.txt"),
            report_path: missing.join("report.txt"),
            ..PipelineConfig::default()
        };
        match config.validate() {
            Err(PipelineError::OutputDirectory { path }) => assert_eq!(path, missing),
            other => panic!("Expected OutputDirectory error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_read_only_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users ignore directory permissions
        if std::fs::write(locked.join("canary"), "").is_ok() {
            return;
        }

        let config = PipelineConfig {
            export_path: dir.path().join("enriched.txt"),
            report_path: locked.join("report.txt"),
            ..PipelineConfig::default()
        };
        let result = config.validate();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Err(PipelineError::OutputNotWritable { path, .. }) => assert_eq!(path, locked),
            other => panic!("Expected OutputNotWritable error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_leaves_no_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            export_path: dir.path().join("enriched.txt"),
            report_path: dir.path().join("report.txt"),
            ..PipelineConfig::default()
        };
        config.validate().unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_validate_parent_is_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, "").unwrap();
        let config = PipelineConfig {
            export_path: file.join("enriched.txt"),
            report_path: dir.path().join("report.txt"),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
