//! Identifier-keyed lookup tables.
//!
//! Every predictor source is reduced to a map from identifier to record.
//! Duplicate identifiers are not rejected: the last occurrence in file order
//! replaces earlier ones. How often that happened is logged at debug level.

use log::debug;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::seqio::ProteinRecord;

pub type Lookup<T> = FxHashMap<String, T>;

/// Collects `records` into a map keyed by `key`; last write wins.
///
/// Stops at the first `Err` and returns it, so a malformed row anywhere in a
/// source aborts the whole table.
pub fn build_lookup<T, I, F>(records: I, key: F, source: &str) -> Result<Lookup<T>>
where
    I: IntoIterator<Item = Result<T>>,
    F: Fn(&T) -> &str,
{
    let mut table: Lookup<T> = FxHashMap::default();
    let mut replaced = 0usize;

    for record in records {
        let record = record?;
        let id = key(&record).to_string();
        if table.insert(id, record).is_some() {
            replaced += 1;
        }
    }

    if replaced > 0 {
        debug!("{}: {} duplicate identifier(s), kept last occurrence", source, replaced);
    }
    debug!("{}: {} identifiers loaded", source, table.len());

    Ok(table)
}

/// Protein id -> contig id, derived from the protein catalog.
pub fn protein_to_contig(proteins: &Lookup<ProteinRecord>) -> FxHashMap<&str, &str> {
    proteins
        .iter()
        .map(|(id, rec)| (id.as_str(), rec.contig.as_str()))
        .collect()
}
