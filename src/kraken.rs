//! Kraken2 Classification Loader
//!
//! Reads the per-sequence output of Kraken2 run on assembled contigs:
//!
//! ```text
//! C    k141_2152    562    1345    562:12 0:30 ...
//! U    k141_77      0      812     0:778
//! ^flag ^contig     ^taxid ^length ^LCA mapping
//! ```
//!
//! Only classified (`C`) lines are kept. Contig ids are normalised to their
//! first two `_`-delimited tokens.

use log::debug;
use rustc_hash::FxHashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{open_input, PeptideError, Result};

pub const PROGRAM: &str = "Kraken2";
pub const CLASSIFIED: &str = "C";

/// Normalised contig id -> taxon id.
pub type TaxonomyTable = FxHashMap<String, String>;

/// Keeps the first two `_`-delimited tokens of a Kraken2 sequence id.
pub fn contig_key(sequence_id: &str) -> String {
    sequence_id.split('_').take(2).collect::<Vec<_>>().join("_")
}

/// Parses one line. `Ok(None)` for unclassified or blank lines.
pub fn parse_line(line: &str, path: &Path, line_no: usize) -> Result<Option<(String, String)>> {
    let fields: Vec<&str> = line.trim().split('\t').collect();
    if fields[0] != CLASSIFIED {
        return Ok(None);
    }
    if fields.len() < 3 {
        return Err(PeptideError::format(
            path,
            Some(line_no),
            format!("classified line has {} column(s), expected at least 3", fields.len()),
        ));
    }
    Ok(Some((contig_key(fields[1]), fields[2].to_string())))
}

/// Loads classified contigs; later lines overwrite earlier ones.
pub fn load_taxonomy<P: AsRef<Path>>(path: P) -> Result<TaxonomyTable> {
    let path = path.as_ref();
    let reader = BufReader::new(open_input(path)?);
    let mut table = TaxonomyTable::default();
    let mut unclassified = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| PeptideError::io(path, e))?;
        match parse_line(&line, path, idx + 1)? {
            Some((contig, taxid)) => {
                table.insert(contig, taxid);
            }
            None => unclassified += 1,
        }
    }

    debug!("Kraken2: {} classified contigs, {} lines skipped", table.len(), unclassified);
    Ok(table)
}
