//! Record Integrator
//!
//! Joins the five predictor/annotation sources into one `PeptideRecord` per
//! peptide and serialises the collection as a JSON array.
//!
//! # Join Rules
//! - Candidates are the union of MACREL and AntiCP identifiers (outer join).
//!   Every MACREL row takes part, whatever its family.
//! - eggNOG-mapper rows are matched on the peptide id; Kraken2 assignments
//!   are matched through protein id -> contig -> taxon.
//! - Enrichment misses fall back to defaults: empty annotations, contig
//!   `unknown`, lineage `unknown`.
//! - Scores are present only for the predictor that reported the peptide.
//!
//! All sources are parsed into typed records before the join starts, so a
//! malformed value aborts the run before any output exists.

use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use crate::anticp::{self, AnticancerRecord};
use crate::config::{InputPaths, IntegratorConfig};
use crate::eggnog::{self, AnnotationRecord};
use crate::error::{file_label, open_input, PeptideError, Result};
use crate::kraken::{self, TaxonomyTable};
use crate::lookup::{protein_to_contig, Lookup};
use crate::macrel::{self, AmpRecord};
use crate::output::write_atomic;
use crate::seqio::{load_protein_catalog, ProteinRecord};

pub const UNKNOWN: &str = "unknown";

// ============================================================================
// Output Model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub program: String,
    pub file: String,
}

impl Source {
    pub fn new(program: &str, path: &Path) -> Self {
        Self {
            program: program.to_string(),
            file: file_label(path),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeptideType {
    Antimicrobial,
    Anticancer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    Amp,
    Hemolytic,
    Anticancer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub protein_id: String,
    pub contig: String,
    pub protein_file: String,
    pub contig_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub lineage: String,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedValue {
    pub value: String,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(rename = "COG")]
    pub cog: AnnotatedValue,
    #[serde(rename = "KEGG")]
    pub kegg: Vec<String>,
    #[serde(rename = "GO")]
    pub go: Vec<String>,
    #[serde(rename = "EC")]
    pub ec: String,
    pub source: Source,
}

/// One integrated peptide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeptideRecord {
    pub id: String,
    pub sequence: String,
    #[serde(rename = "type")]
    pub types: Vec<PeptideType>,
    pub scores: BTreeMap<ScoreKind, Score>,
    pub origin: Origin,
    pub taxonomy: Taxonomy,
    pub annotations: Annotations,
}

// ============================================================================
// Source Tables
// ============================================================================

/// Every input reduced to an identifier-keyed table.
#[derive(Debug, Default)]
pub struct SourceTables {
    pub taxonomy: TaxonomyTable,
    pub annotations: Lookup<AnnotationRecord>,
    pub proteins: Lookup<ProteinRecord>,
    pub amp: Lookup<AmpRecord>,
    pub anticancer: Lookup<AnticancerRecord>,
}

impl SourceTables {
    /// Loads all five inputs one after another, failing on the first error.
    pub fn load(inputs: &InputPaths) -> Result<Self> {
        let taxonomy = kraken::load_taxonomy(&inputs.taxonomy)?;
        let annotations = eggnog::load_annotation_table(&inputs.annotations)?;
        let proteins = load_protein_catalog(&inputs.proteins)?;
        let amp = macrel::load_amp_table(&inputs.amp)?;
        let anticancer = anticp::load_anticancer_table(&inputs.anticancer)?;

        debug!(
            "Loaded {} taxa, {} annotations, {} proteins, {} AMP rows, {} ACP rows",
            taxonomy.len(),
            annotations.len(),
            proteins.len(),
            amp.len(),
            anticancer.len()
        );

        Ok(Self {
            taxonomy,
            annotations,
            proteins,
            amp,
            anticancer,
        })
    }
}

/// Provenance labels stamped onto every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub amp: Source,
    pub anticancer: Source,
    pub annotations: Source,
    pub taxonomy: Source,
    pub protein_file: String,
    pub contig_file: String,
}

impl Provenance {
    pub fn from_config(config: &IntegratorConfig) -> Self {
        let inputs = &config.inputs;
        Self {
            amp: Source::new(macrel::PROGRAM, &inputs.amp),
            anticancer: Source::new(anticp::PROGRAM, &inputs.anticancer),
            annotations: Source::new(eggnog::PROGRAM, &inputs.annotations),
            taxonomy: Source::new(kraken::PROGRAM, &inputs.taxonomy),
            protein_file: file_label(&inputs.proteins),
            contig_file: config.contig_file.clone(),
        }
    }
}

// ============================================================================
// Join
// ============================================================================

/// Builds one record per identifier in the MACREL ∪ AntiCP key set, sorted
/// by identifier.
pub fn merge(tables: &SourceTables, provenance: &Provenance) -> Vec<PeptideRecord> {
    let candidates: BTreeSet<&str> = tables
        .amp
        .keys()
        .chain(tables.anticancer.keys())
        .map(String::as_str)
        .collect();

    let contigs = protein_to_contig(&tables.proteins);

    candidates
        .into_iter()
        .filter_map(|id| merge_one(id, tables, &contigs, provenance))
        .collect()
}

fn merge_one(
    id: &str,
    tables: &SourceTables,
    contigs: &FxHashMap<&str, &str>,
    provenance: &Provenance,
) -> Option<PeptideRecord> {
    let amp = tables.amp.get(id);
    let acp = tables.anticancer.get(id);

    let sequence = match (amp, acp) {
        (Some(a), _) => a.sequence.clone(),
        (None, Some(c)) => c.sequence.clone(),
        (None, None) => return None,
    };

    let mut types = Vec::with_capacity(2);
    let mut scores = BTreeMap::new();

    if let Some(a) = amp {
        types.push(PeptideType::Antimicrobial);
        scores.insert(
            ScoreKind::Amp,
            Score {
                value: a.amp_probability,
                label: None,
                source: provenance.amp.clone(),
            },
        );
        scores.insert(
            ScoreKind::Hemolytic,
            Score {
                value: a.hemolytic_probability,
                label: Some(a.hemolytic.clone()),
                source: provenance.amp.clone(),
            },
        );
    }
    if let Some(c) = acp {
        types.push(PeptideType::Anticancer);
        scores.insert(
            ScoreKind::Anticancer,
            Score {
                value: c.score,
                label: None,
                source: provenance.anticancer.clone(),
            },
        );
    }

    let contig = contigs.get(id).copied().unwrap_or(UNKNOWN);
    let lineage = tables
        .taxonomy
        .get(contig)
        .map(String::as_str)
        .unwrap_or(UNKNOWN);

    let empty = AnnotationRecord::default();
    let annotation = tables.annotations.get(id).unwrap_or(&empty);

    Some(PeptideRecord {
        id: id.to_string(),
        sequence,
        types,
        scores,
        origin: Origin {
            protein_id: id.to_string(),
            contig: contig.to_string(),
            protein_file: provenance.protein_file.clone(),
            contig_file: provenance.contig_file.clone(),
        },
        taxonomy: Taxonomy {
            lineage: lineage.to_string(),
            source: provenance.taxonomy.clone(),
        },
        annotations: Annotations {
            cog: AnnotatedValue {
                value: annotation.cog_category.clone(),
                source: provenance.annotations.clone(),
            },
            kegg: annotation.kegg_pathways.clone(),
            go: annotation.go_terms.clone(),
            ec: annotation.ec.clone(),
            source: provenance.annotations.clone(),
        },
    })
}

// ============================================================================
// Serialization
// ============================================================================

/// Writes `records` as a pretty-printed JSON array (two-space indent).
pub fn write_document(records: &[PeptideRecord], path: &Path) -> Result<()> {
    write_atomic(path, |w| {
        serde_json::to_writer_pretty(w, records).map_err(|source| PeptideError::Json {
            path: path.to_path_buf(),
            source,
        })
    })
}

/// Reads a document produced by `write_document`.
pub fn read_document(path: &Path) -> Result<Vec<PeptideRecord>> {
    let reader = BufReader::new(open_input(path)?);
    serde_json::from_reader(reader).map_err(|source| PeptideError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads, joins and writes. Returns the number of records written.
pub fn run(config: &IntegratorConfig) -> Result<usize> {
    let start = Instant::now();

    let tables = SourceTables::load(&config.inputs)?;
    let provenance = Provenance::from_config(config);
    let records = merge(&tables, &provenance);

    write_document(&records, &config.output)?;

    info!(
        "Integrated {} peptides into {} in {:.2}s",
        records.len(),
        config.output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(records.len())
}

// ============================================================================
// Tests
// ============================================================================
