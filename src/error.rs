//! Error types shared by every parser, loader and writer.
//!
//! Three situations are distinguished:
//! - a required input cannot be opened (`MissingInput`)
//! - a line does not follow the grammar of its format (`Format`)
//! - anything else the OS reports while reading or writing (`Io`, `Json`)
//!
//! An identifier missing from an enrichment source (annotation, taxonomy,
//! protein catalog) is not an error at all; the integrator fills defaults.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PeptideError>;

#[derive(Debug, Error)]
pub enum PeptideError {
    #[error("cannot open input {}: {source}", .path.display())]
    MissingInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}{}: {message}", .path.display(), line_suffix(.line))]
    Format {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error on {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(":{}", l)).unwrap_or_default()
}

impl PeptideError {
    pub fn format<P: AsRef<Path>>(path: P, line: Option<usize>, message: impl Into<String>) -> Self {
        PeptideError::Format {
            path: path.as_ref().to_path_buf(),
            line,
            message: message.into(),
        }
    }

    pub fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        PeptideError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Opens a required input, mapping any failure to `MissingInput`.
pub fn open_input(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|source| PeptideError::MissingInput {
        path: path.to_path_buf(),
        source,
    })
}

/// File name component used in provenance labels and messages.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_with_line() {
        let err = PeptideError::format("macrel.tsv", Some(7), "invalid AMP_probability 'x' for P1");
        assert_eq!(err.to_string(), "macrel.tsv:7: invalid AMP_probability 'x' for P1");
    }

    #[test]
    fn test_format_message_without_line() {
        let err = PeptideError::format("eggnog.tsv", None, "header starting with '#query' not found");
        assert_eq!(err.to_string(), "eggnog.tsv: header starting with '#query' not found");
    }

    #[test]
    fn test_open_missing_input() {
        let err = open_input(Path::new("/nonexistent/dir/proteins.faa")).unwrap_err();
        assert!(matches!(err, PeptideError::MissingInput { .. }));
        assert!(err.to_string().contains("proteins.faa"));
    }

    #[test]
    fn test_file_label() {
        assert_eq!(file_label(Path::new("/data/run1/anticp_output.csv")), "anticp_output.csv");
        assert_eq!(file_label(Path::new("proteins.faa")), "proteins.faa");
    }
}
