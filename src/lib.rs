//! PeptoMiner - Peptide Prediction Integration
//!
//! Joins the outputs of antimicrobial (MACREL) and anticancer (AntiCP)
//! peptide predictors with eggNOG-mapper annotations and Kraken2 contig
//! taxonomy into one record per peptide, and filters accepted peptide ids.
//!
//! # Modules
//! - `table`: sentinel-header tab-delimited table parsing
//! - `macrel`: MACREL prediction table and antimicrobial acceptance
//! - `anticp`: AntiCP marker-line output
//! - `eggnog`: eggNOG-mapper functional annotations
//! - `kraken`: Kraken2 contig classification
//! - `seqio`: FASTA I/O (plain or gzip) and the protein catalog
//! - `lookup`: identifier-keyed tables and derived mappings
//! - `filter`: accepted-id union (`good_ids.txt`)
//! - `integrate`: join/merge engine and JSON document
//! - `config`: input/output locations
//! - `output`: atomic output files
//! - `error`: error taxonomy

pub mod error;
pub mod table;
pub mod macrel;
pub mod anticp;
pub mod eggnog;
pub mod kraken;
pub mod seqio;
pub mod lookup;
pub mod filter;
pub mod integrate;
pub mod config;
pub mod output;
