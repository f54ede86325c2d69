//! Loading raw transaction lines from the sales data file.
//!
//! The file is read once; its bytes are then offered to each candidate text
//! encoding in turn and the first one that decodes cleanly wins.

use encoding_rs::{UTF_8, WINDOWS_1252};
use log::{debug, info, warn};
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// A text encoding the reader is willing to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

/// Encodings tried in order when loading the sales file.
pub const CANDIDATE_ENCODINGS: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

impl TextEncoding {
    /// Label used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Windows1252 => "cp1252",
        }
    }

    /// Decodes `bytes`, returning `None` on any malformed sequence.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            TextEncoding::Utf8 => {
                let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                UTF_8.decode_without_bom_handling_and_without_replacement(body)
            }
            TextEncoding::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes)),
            TextEncoding::Windows1252 => {
                WINDOWS_1252.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }
}

/// Decodes `bytes` with the first encoding in `encodings` that succeeds and
/// splits the text into data lines.
///
/// The first line is treated as a header and dropped. Remaining lines are
/// trimmed and empty ones skipped. Returns `None` if no encoding applies.
pub fn decode_lines(bytes: &[u8], encodings: &[TextEncoding]) -> Option<Vec<String>> {
    let (encoding, text) = encodings
        .iter()
        .find_map(|enc| enc.decode(bytes).map(|text| (enc, text)))?;
    debug!("Decoded input as {}", encoding.name());

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines = normalized
        .split('\n')
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();

    Some(lines)
}

/// Reads the data lines of the sales file at `path`.
///
/// A missing or unreadable file, or one no candidate encoding can decode,
/// yields an empty vector so the rest of the pipeline still runs.
pub fn read_sales_lines(path: &Path) -> Vec<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Input file {} not found, treating as empty", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Could not read {}: {}, treating as empty", path.display(), e);
            return Vec::new();
        }
    };

    match decode_lines(&bytes, &CANDIDATE_ENCODINGS) {
        Some(lines) => {
            info!("Read {} data lines from {}", lines.len(), path.display());
            lines
        }
        None => {
            warn!("No candidate encoding could decode {}", path.display());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_skips_header_and_blank_lines() {
        let bytes = b"header\n  T1|a  \n\n   \nT2|b\n";
        let lines = decode_lines(bytes, &CANDIDATE_ENCODINGS).unwrap();
        assert_eq!(lines, vec!["T1|a", "T2|b"]);
    }

    #[test]
    fn test_handles_crlf_and_bom() {
        let bytes = b"\xEF\xBB\xBFheader\r\nT1|a\r\nT2|b\r\n";
        let lines = decode_lines(bytes, &CANDIDATE_ENCODINGS).unwrap();
        assert_eq!(lines, vec!["T1|a", "T2|b"]);
    }

    #[test]
    fn test_falls_back_to_latin1() {
        // 0xE9 is 'é' in latin-1 and invalid as a lone UTF-8 byte
        let bytes = b"header\nT1|Caf\xE9\n";
        assert!(TextEncoding::Utf8.decode(bytes).is_none());
        let lines = decode_lines(bytes, &CANDIDATE_ENCODINGS).unwrap();
        assert_eq!(lines, vec!["T1|Café"]);
    }

    #[test]
    fn test_first_success_wins() {
        // 0x80 is '€' in cp1252 but a C1 control in latin-1
        let bytes = b"header\n\x80\n";
        let lines = decode_lines(bytes, &CANDIDATE_ENCODINGS).unwrap();
        assert_eq!(lines, vec!["\u{80}"]);

        let lines = decode_lines(bytes, &[TextEncoding::Windows1252]).unwrap();
        assert_eq!(lines, vec!["€"]);
    }

    #[test]
    fn test_no_encoding_succeeds() {
        assert!(decode_lines(b"header\n\xFF\n", &[TextEncoding::Utf8]).is_none());
        assert!(decode_lines(b"anything", &[]).is_none());
    }

    #[test]
    fn test_header_only() {
        assert!(decode_lines(b"header", &CANDIDATE_ENCODINGS)
            .unwrap()
            .is_empty());
        assert!(decode_lines(b"", &CANDIDATE_ENCODINGS).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let lines = read_sales_lines(&dir.path().join("missing.txt"));
        assert!(lines.is_empty());
    }

    #[test]
    fn test_reads_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "TransactionID|Date\nT1|2024-01-01\n").unwrap();
        assert_eq!(read_sales_lines(file.path()), vec!["T1|2024-01-01"]);
    }
}
