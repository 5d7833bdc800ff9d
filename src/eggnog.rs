//! eggNOG-mapper annotation table (`*.emapper.annotations`).
//!
//! Tab-delimited with a `##` comment preamble; the header line starts with
//! `#query`. Rows are looked up by peptide id directly. eggNOG-mapper writes
//! `-` for empty annotations; that placeholder is passed through unchanged.

use std::path::Path;

use crate::error::Result;
use crate::lookup::{build_lookup, Lookup};
use crate::table::{PredictionRow, SentinelTable};

pub const HEADER_SENTINEL: &str = "#query";
pub const PROGRAM: &str = "eggNOG-mapper";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationRecord {
    pub query: String,
    pub cog_category: String,
    pub kegg_pathways: Vec<String>,
    pub go_terms: Vec<String>,
    pub ec: String,
}

impl AnnotationRecord {
    /// Only `#query` is required; absent annotation columns become empty.
    pub fn from_row(row: &PredictionRow, path: &Path) -> Result<Self> {
        Ok(Self {
            query: row.require("#query", path)?.to_string(),
            cog_category: row.get("COG_category").unwrap_or("").to_string(),
            kegg_pathways: split_list(row.get("KEGG_Pathway").unwrap_or("")),
            go_terms: split_list(row.get("GOs").unwrap_or("")),
            ec: row.get("EC").unwrap_or("").to_string(),
        })
    }
}

/// Splits a comma-separated cell; an empty cell is an empty list.
pub fn split_list(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    cell.split(',').map(str::to_string).collect()
}

pub fn load_annotation_table<P: AsRef<Path>>(path: P) -> Result<Lookup<AnnotationRecord>> {
    let path = path.as_ref();
    let table = SentinelTable::open(path, HEADER_SENTINEL, '\t')?;
    build_lookup(
        table.map(|row| row.and_then(|r| AnnotationRecord::from_row(&r, path))),
        |r| r.query.as_str(),
        "eggNOG-mapper",
    )
}
