//! AntiCP Output Parser
//!
//! The anticancer-peptide predictor writes one record per line, marked by a
//! leading '>' and carrying four comma-separated fields without a header:
//!
//! ```text
//! >k141_2152_2 # 3 # 188,KLAKLAKKLAK,Anticancer,0.77
//!  ^id + extra tokens    ^sequence   ^label     ^score
//! ```
//!
//! Lines without the marker are ignored. The identifier is the first
//! whitespace token of the first field.

use log::debug;
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{open_input, PeptideError, Result};
use crate::lookup::{build_lookup, Lookup};
use crate::table::parse_finite;

pub const MARKER: char = '>';
pub const PROGRAM: &str = "AntiCP";

const MIN_FIELDS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct AnticancerRecord {
    pub id: String,
    pub sequence: String,
    pub prediction: String,
    pub score: f64,
}

impl AnticancerRecord {
    /// Parses one marker line. Returns `Ok(None)` for lines without the marker.
    ///
    /// # Errors
    /// `Format` if fewer than four fields are present, the identifier is
    /// empty, or the score is not a number.
    pub fn parse_line(line: &str, path: &Path, line_no: usize) -> Result<Option<Self>> {
        let body = match line.strip_prefix(MARKER) {
            Some(b) => b.trim(),
            None => return Ok(None),
        };

        let parts: Vec<&str> = body.split(',').collect();
        if parts.len() < MIN_FIELDS {
            return Err(PeptideError::format(
                path,
                Some(line_no),
                format!("expected {} comma-separated fields, found {}", MIN_FIELDS, parts.len()),
            ));
        }

        let id = parts[0]
            .split_whitespace()
            .next()
            .ok_or_else(|| PeptideError::format(path, Some(line_no), "empty sequence identifier"))?;

        let score = parse_finite(parts[3]).ok_or_else(|| {
            PeptideError::format(
                path,
                Some(line_no),
                format!("invalid score '{}' for {}", parts[3], id),
            )
        })?;

        Ok(Some(Self {
            id: id.to_string(),
            sequence: parts[1].to_string(),
            prediction: parts[2].to_string(),
            score,
        }))
    }
}

/// Sequential reader yielding one `AnticancerRecord` per marker line.
pub struct AnticpReader<R: BufRead> {
    reader: R,
    path: PathBuf,
    line_buf: String,
    line_no: usize,
}

impl AnticpReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = open_input(path)?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> AnticpReader<R> {
    pub fn new<P: AsRef<Path>>(reader: R, path: P) -> Self {
        Self {
            reader,
            path: path.as_ref().to_path_buf(),
            line_buf: String::with_capacity(256),
            line_no: 0,
        }
    }

    pub fn read_next(&mut self) -> Result<Option<AnticancerRecord>> {
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

            if let Some(record) = AnticancerRecord::parse_line(&self.line_buf, &self.path, self.line_no)? {
                return Ok(Some(record));
            }
        }
    }
}

impl<R: BufRead> Iterator for AnticpReader<R> {
    type Item = Result<AnticancerRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Loads every AntiCP record keyed by identifier (last record wins).
pub fn load_anticancer_table<P: AsRef<Path>>(path: P) -> Result<Lookup<AnticancerRecord>> {
    build_lookup(AnticpReader::open(path)?, |r| r.id.as_str(), "AntiCP")
}

/// Anticancer acceptance: every parsed record is accepted.
pub fn accepted_ids<P: AsRef<Path>>(path: P) -> Result<FxHashSet<String>> {
    let ids = AnticpReader::open(path)?
        .map(|r| r.map(|rec| rec.id))
        .collect::<Result<FxHashSet<String>>>()?;
    debug!("AntiCP: {} identifiers accepted", ids.len());
    Ok(ids)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const OUTPUT: &str = "# AntiCP 2.0 results\n\
        Sequence_ID,Sequence,Prediction,Score\n\
        >k141_2152_2 # 3 # 188,KLAKLAKK,Anticancer,0.77\n\
        >k141_99_1,GIGKFLHS,Non-Anticancer,-0.31\n";

    fn parse(line: &str) -> Result<Option<AnticancerRecord>> {
        AnticancerRecord::parse_line(line, Path::new("anticp.csv"), 1)
    }

    #[test]
    fn test_parse_marker_line() {
        let rec = parse(">P1 extra,KLAK,anticancer,0.77\n").unwrap().unwrap();
        assert_eq!(rec.id, "P1");
        assert_eq!(rec.sequence, "KLAK");
        assert_eq!(rec.prediction, "anticancer");
        assert_eq!(rec.score, 0.77);
    }

    #[test]
    fn test_unmarked_line_ignored() {
        assert!(parse("Sequence_ID,Sequence,Prediction,Score").unwrap().is_none());
        assert!(parse("").unwrap().is_none());
    }

    #[test]
    fn test_too_few_fields() {
        let err = parse(">P1,KLAK,anticancer").unwrap_err();
        assert!(matches!(err, PeptideError::Format { line: Some(1), .. }));
        assert!(err.to_string().contains("found 3"));
    }

    #[test]
    fn test_invalid_score() {
        let err = parse(">P2,KLAK,anticancer,NA?").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid score"));
        assert!(msg.contains("P2"));
    }

    #[test]
    fn test_non_finite_score() {
        for line in [">P1,KLAK,anticancer,NaN", ">P2,KK,anticancer,inf", ">P3,KK,anticancer,-Infinity"] {
            let err = parse(line).unwrap_err();
            assert!(matches!(err, PeptideError::Format { line: Some(1), .. }));
            assert!(err.to_string().contains("invalid score"));
            assert!(err.to_string().contains("anticp.csv"));
        }
    }

    #[test]
    fn test_empty_identifier() {
        assert!(parse(">  ,KLAK,anticancer,0.5").is_err());
    }

    #[test]
    fn test_extra_fields_ignored() {
        let rec = parse(">P3,KLAK,anticancer,0.5,trailing").unwrap().unwrap();
        assert_eq!(rec.score, 0.5);
    }

    #[test]
    fn test_reader_tracks_line_numbers() {
        let mut reader = AnticpReader::new(Cursor::new(OUTPUT), "anticp.csv");
        let first = reader.read_next().unwrap().unwrap();
        assert_eq!(first.id, "k141_2152_2");
        let second = reader.read_next().unwrap().unwrap();
        assert_eq!(second.score, -0.31);
        assert!(reader.read_next().unwrap().is_none());

        let bad = format!("{}>broken\n", OUTPUT);
        let err = AnticpReader::new(Cursor::new(bad), "anticp.csv")
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert!(matches!(err, PeptideError::Format { line: Some(5), .. }));
    }

    #[test]
    fn test_load_and_accept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anticp_output.csv");
        std::fs::write(&path, OUTPUT).unwrap();

        let table = load_anticancer_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["k141_2152_2"].sequence, "KLAKLAKK");

        let ids = accepted_ids(&path).unwrap();
        assert_eq!(ids.len(), 2, "every record is accepted regardless of label");
        assert!(ids.contains("k141_99_1"));
    }
}
