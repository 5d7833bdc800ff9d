//! Input and output locations for both entry points.
//!
//! The upstream workflow writes its results under fixed names; `in_dir`
//! resolves those names inside a results directory. Every path can be
//! overridden individually from the command line.

use std::path::{Path, PathBuf};

pub const KRAKEN_FILE: &str = "kraken2_contigs_output.txt";
pub const EGGNOG_FILE: &str = "eggnog_output.emapper.annotations";
pub const PROTEINS_FILE: &str = "proteins.faa";
pub const MACREL_FILE: &str = "macrel.out.prediction.tsv";
pub const ANTICP_FILE: &str = "anticp_output.csv";

pub const CONTIGS_LABEL: &str = "final.contigs.fa";
pub const INTEGRATED_OUTPUT: &str = "peptideos_integrados.json";
pub const GOOD_IDS_OUTPUT: &str = "good_ids.txt";
pub const GOOD_PEPTIDES_OUTPUT: &str = "good_peptides.faa";

/// The five inputs consumed by the integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPaths {
    pub taxonomy: PathBuf,
    pub annotations: PathBuf,
    pub proteins: PathBuf,
    pub amp: PathBuf,
    pub anticancer: PathBuf,
}

impl InputPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            taxonomy: dir.join(KRAKEN_FILE),
            annotations: dir.join(EGGNOG_FILE),
            proteins: dir.join(PROTEINS_FILE),
            amp: dir.join(MACREL_FILE),
            anticancer: dir.join(ANTICP_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorConfig {
    pub inputs: InputPaths,
    /// Provenance label written to `origin.contig_file`; the file is not read.
    pub contig_file: String,
    pub output: PathBuf,
}

impl IntegratorConfig {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            inputs: InputPaths::in_dir(dir),
            contig_file: CONTIGS_LABEL.to_string(),
            output: dir.join(INTEGRATED_OUTPUT),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub amp: PathBuf,
    pub anticancer: PathBuf,
    /// Peptide FASTA to subset by the accepted ids.
    pub fasta: Option<PathBuf>,
    pub output: PathBuf,
    pub fasta_output: PathBuf,
}

impl FilterConfig {
    pub fn new<P: AsRef<Path>>(amp: P, anticancer: P, outdir: &Path) -> Self {
        Self {
            amp: amp.as_ref().to_path_buf(),
            anticancer: anticancer.as_ref().to_path_buf(),
            fasta: None,
            output: outdir.join(GOOD_IDS_OUTPUT),
            fasta_output: outdir.join(GOOD_PEPTIDES_OUTPUT),
        }
    }
}
