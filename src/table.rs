//! Sentinel-Header Table Module
//!
//! Reads tab-delimited predictor output where a free-form preamble (comments,
//! run parameters) precedes the real header line. The header is recognised by
//! a literal prefix ("Access" for MACREL, "#query" for eggNOG-mapper).
//!
//! Parsing is split into two phases:
//! 1. `locate_header` consumes lines up to and including the header and
//!    returns the ordered column names.
//! 2. `SentinelTable` decodes every following line into a `PredictionRow`.
//!
//! # Row Decoding
//! - Blank lines are skipped.
//! - Fields are zipped positionally with the column names. Rows with fewer
//!   fields than columns simply lack the trailing keys; surplus fields are
//!   ignored. Column count is not validated here; typed conversion in the
//!   format modules decides which keys are required.

use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{open_input, PeptideError, Result};

// ============================================================================
// Prediction Row
// ============================================================================

/// One data line of a sentinel-header table, keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    /// 1-based line number in the source file.
    pub line: usize,
    fields: FxHashMap<String, String>,
}

impl PredictionRow {
    pub fn from_pairs<I, K, V>(line: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            line,
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Returns the value of `column`, or a `Format` error naming the column
    /// and the line it was expected on.
    pub fn require(&self, column: &str, path: &Path) -> Result<&str> {
        self.get(column).ok_or_else(|| {
            PeptideError::format(path, Some(self.line), format!("missing column '{}'", column))
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parses a numeric cell. NaN and infinities are rejected.
pub fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ============================================================================
// Phase 1: Header Location
// ============================================================================

/// Column names of a located header together with its line number.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub columns: Vec<String>,
    pub line: usize,
}

/// Scans `reader` until a line starting with `sentinel` and splits it on
/// `delimiter`. Lines before the header are discarded.
///
/// # Errors
/// `Format` if end of input is reached without seeing the sentinel.
pub fn locate_header<R: BufRead>(
    reader: &mut R,
    path: &Path,
    sentinel: &str,
    delimiter: char,
) -> Result<Header> {
    let mut line_buf = String::with_capacity(256);
    let mut line_no = 0;

    loop {
        line_buf.clear();
        let n = reader
            .read_line(&mut line_buf)
            .map_err(|e| PeptideError::io(path, e))?;
        if n == 0 {
            return Err(PeptideError::format(
                path,
                None,
                format!("header starting with '{}' not found", sentinel),
            ));
        }
        line_no += 1;

        if line_buf.starts_with(sentinel) {
            let columns = line_buf
                .trim()
                .split(delimiter)
                .map(str::to_string)
                .collect();
            return Ok(Header { columns, line: line_no });
        }
    }
}

// ============================================================================
// Phase 2: Row Decoding
// ============================================================================

/// Lazy row iterator over the remainder of a table after its header.
pub struct SentinelTable<R: BufRead> {
    reader: R,
    path: PathBuf,
    columns: Vec<String>,
    delimiter: char,
    line_no: usize,
    line_buf: String,
}

impl SentinelTable<BufReader<File>> {
    /// Opens `path`, locates the header and positions the reader on the first
    /// data line.
    pub fn open<P: AsRef<Path>>(path: P, sentinel: &str, delimiter: char) -> Result<Self> {
        let path = path.as_ref();
        let file = open_input(path)?;
        Self::from_reader(BufReader::with_capacity(1024 * 1024, file), path, sentinel, delimiter)
    }
}

impl<R: BufRead> SentinelTable<R> {
    pub fn from_reader<P: AsRef<Path>>(
        mut reader: R,
        path: P,
        sentinel: &str,
        delimiter: char,
    ) -> Result<Self> {
        let path = path.as_ref();
        let header = locate_header(&mut reader, path, sentinel, delimiter)?;
        Ok(Self {
            reader,
            path: path.to_path_buf(),
            columns: header.columns,
            delimiter,
            line_no: header.line,
            line_buf: String::with_capacity(512),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the next non-blank row.
    ///
    /// # Returns
    /// - `Ok(Some(row))` - a decoded row
    /// - `Ok(None)` - end of input
    /// - `Err(e)` - I/O error
    pub fn read_next(&mut self) -> Result<Option<PredictionRow>> {
        loop {
            self.line_buf.clear();
            let n = self
                .reader
                .read_line(&mut self.line_buf)
                .map_err(|e| PeptideError::io(&self.path, e))?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = self.line_buf.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }

            let fields = self
                .columns
                .iter()
                .zip(line.split(self.delimiter))
                .map(|(col, val)| (col.clone(), val.to_string()))
                .collect();

            return Ok(Some(PredictionRow {
                line: self.line_no,
                fields,
            }));
        }
    }
}

impl<R: BufRead> Iterator for SentinelTable<R> {
    type Item = Result<PredictionRow>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_next() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
