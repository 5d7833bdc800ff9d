//! MACREL Prediction Table
//!
//! Tab-delimited output of the antimicrobial-peptide classifier. A comment
//! preamble precedes the header, which starts with `Access`.
//!
//! # Columns Used
//! ```text
//! Access                 peptide identifier
//! Sequence               peptide sequence
//! AMP_family             predicted family, literal "None" when not an AMP
//! AMP_probability        probability of antimicrobial activity
//! Hemolytic              hemolytic label (e.g. "Hemo", "NonHemo")
//! Hemolytic_probability  probability of hemolytic activity
//! ```

use rustc_hash::FxHashSet;
use std::path::Path;

use crate::error::{PeptideError, Result};
use crate::lookup::{build_lookup, Lookup};
use crate::table::{parse_finite, PredictionRow, SentinelTable};

pub const HEADER_SENTINEL: &str = "Access";
pub const PROGRAM: &str = "MACREL";

/// Family value MACREL reports for peptides it does not consider AMPs.
pub const NO_FAMILY: &str = "None";

/// A fully typed MACREL row.
#[derive(Debug, Clone, PartialEq)]
pub struct AmpRecord {
    pub access: String,
    pub sequence: String,
    pub amp_family: String,
    pub amp_probability: f64,
    pub hemolytic: String,
    pub hemolytic_probability: f64,
}

impl AmpRecord {
    /// Converts a raw row, requiring every column used downstream.
    ///
    /// # Errors
    /// `Format` if a column is missing or a probability is not a number.
    pub fn from_row(row: &PredictionRow, path: &Path) -> Result<Self> {
        let access = row.require("Access", path)?;
        Ok(Self {
            access: access.to_string(),
            sequence: row.require("Sequence", path)?.to_string(),
            amp_family: row.require("AMP_family", path)?.to_string(),
            amp_probability: parse_probability(row, "AMP_probability", access, path)?,
            hemolytic: row.require("Hemolytic", path)?.to_string(),
            hemolytic_probability: parse_probability(row, "Hemolytic_probability", access, path)?,
        })
    }
}

fn parse_probability(row: &PredictionRow, column: &str, id: &str, path: &Path) -> Result<f64> {
    let raw = row.require(column, path)?;
    parse_finite(raw).ok_or_else(|| {
        PeptideError::format(
            path,
            Some(row.line),
            format!("invalid {} '{}' for {}", column, raw, id),
        )
    })
}

/// Antimicrobial acceptance: any family other than `None`.
pub fn is_accepted(row: &PredictionRow, path: &Path) -> Result<bool> {
    Ok(row.require("AMP_family", path)? != NO_FAMILY)
}

/// Opens a MACREL table as a raw row stream.
pub fn open_table<P: AsRef<Path>>(path: P) -> Result<SentinelTable<std::io::BufReader<std::fs::File>>> {
    SentinelTable::open(path, HEADER_SENTINEL, '\t')
}

/// Loads every MACREL row (no family filter) keyed by `Access`.
pub fn load_amp_table<P: AsRef<Path>>(path: P) -> Result<Lookup<AmpRecord>> {
    let path = path.as_ref();
    let table = open_table(path)?;
    build_lookup(
        table.map(|row| row.and_then(|r| AmpRecord::from_row(&r, path))),
        |r| r.access.as_str(),
        "MACREL",
    )
}

/// Identifiers of rows passing the acceptance predicate.
///
/// Only `Access` and `AMP_family` are read; probabilities are not validated.
pub fn accepted_ids<P: AsRef<Path>>(path: P) -> Result<FxHashSet<String>> {
    let path = path.as_ref();
    let mut ids = FxHashSet::default();
    for row in open_table(path)? {
        let row = row?;
        if is_accepted(&row, path)? {
            ids.insert(row.require("Access", path)?.to_string());
        }
    }
    Ok(ids)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "# Prediction from macrel v1.2.0\n\
        Access\tSequence\tAMP_family\tAMP_probability\tHemolytic\tHemolytic_probability\n\
        P1\tKLAKLAKKLAKLAK\tCLP\t0.91\tNonHemo\t0.05\n\
        P2\tGIGKFLHSAKKF\tNone\t0.32\tHemo\t0.61\n\
        P3\tFLPLIGRVLSGIL\tALP\t0.77\tNonHemo\t0.12\n";

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_keeps_all_families() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "macrel.out.prediction.tsv", TABLE);
        let table = load_amp_table(&path).unwrap();

        assert_eq!(table.len(), 3);
        let p1 = &table["P1"];
        assert_eq!(p1.sequence, "KLAKLAKKLAKLAK");
        assert_eq!(p1.amp_probability, 0.91);
        assert_eq!(p1.hemolytic, "NonHemo");
        assert_eq!(p1.hemolytic_probability, 0.05);
        assert_eq!(table["P2"].amp_family, "None");
    }

    #[test]
    fn test_accepted_ids_excludes_none_family() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "macrel.tsv", TABLE);
        let ids = accepted_ids(&path).unwrap();

        assert_eq!(ids.len(), 2);
        assert!(ids.contains("P1"));
        assert!(ids.contains("P3"));
        assert!(!ids.contains("P2"));
    }

    #[test]
    fn test_invalid_probability_names_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let body = "Access\tSequence\tAMP_family\tAMP_probability\tHemolytic\tHemolytic_probability\n\
            P7\tKK\tCLP\thigh\tHemo\t0.1\n";
        let path = write(&dir, "macrel.tsv", body);
        let err = load_amp_table(&path).unwrap_err();

        assert!(matches!(err, PeptideError::Format { line: Some(2), .. }));
        let msg = err.to_string();
        assert!(msg.contains("AMP_probability"));
        assert!(msg.contains("P7"));
        assert!(msg.contains("macrel.tsv"));
    }

    #[test]
    fn test_non_finite_probability_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for value in ["NaN", "inf"] {
            let body = format!(
                "Access\tSequence\tAMP_family\tAMP_probability\tHemolytic\tHemolytic_probability\n\
                 P7\tKK\tCLP\t0.5\tHemo\t{}\n",
                value
            );
            let path = write(&dir, "macrel.tsv", &body);
            let err = load_amp_table(&path).unwrap_err();
            assert!(matches!(err, PeptideError::Format { line: Some(2), .. }));
            let msg = err.to_string();
            assert!(msg.contains("Hemolytic_probability"));
            assert!(msg.contains("P7"));
        }
    }

    #[test]
    fn test_short_row_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let body = "Access\tSequence\tAMP_family\tAMP_probability\tHemolytic\tHemolytic_probability\n\
            P8\tKK\tCLP\n";
        let path = write(&dir, "macrel.tsv", body);
        let err = load_amp_table(&path).unwrap_err();
        assert!(err.to_string().contains("missing column 'AMP_probability'"));
    }

    #[test]
    fn test_missing_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "macrel.tsv", "# empty run\n");
        assert!(matches!(
            load_amp_table(&path).unwrap_err(),
            PeptideError::Format { line: None, .. }
        ));
    }

    #[test]
    fn test_is_accepted() {
        let path = Path::new("m.tsv");
        let amp = PredictionRow::from_pairs(2, [("Access", "a"), ("AMP_family", "CLP")]);
        let none = PredictionRow::from_pairs(3, [("Access", "b"), ("AMP_family", "None")]);
        assert!(is_accepted(&amp, path).unwrap());
        assert!(!is_accepted(&none, path).unwrap());
    }
}
