//! ID Filter
//!
//! Unions the MACREL ids whose family is not `None` with every AntiCP id and
//! writes them one per line. When a peptide FASTA is supplied, the accepted
//! sequences are also written as a FASTA subset.

use log::info;
use rustc_hash::FxHashSet;
use std::io::Write;

use crate::anticp;
use crate::config::FilterConfig;
use crate::error::{PeptideError, Result};
use crate::macrel;
use crate::output::stage;
use crate::seqio::write_fasta_subset;

/// Outcome of a filter run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSummary {
    pub amp_ids: usize,
    pub anticancer_ids: usize,
    pub accepted: usize,
    pub sequences_written: Option<usize>,
}

/// Accepted ids per predictor and their union.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptedIds {
    pub amp: usize,
    pub anticancer: usize,
    pub ids: FxHashSet<String>,
}

/// Union of the accepted ids from both predictors.
pub fn accepted_ids(config: &FilterConfig) -> Result<AcceptedIds> {
    let amp = macrel::accepted_ids(&config.amp)?;
    let acp = anticp::accepted_ids(&config.anticancer)?;
    info!("Accepted {} MACREL and {} AntiCP identifiers", amp.len(), acp.len());
    Ok(AcceptedIds {
        amp: amp.len(),
        anticancer: acp.len(),
        ids: amp.union(&acp).cloned().collect(),
    })
}

/// Runs the filter and writes its outputs. Both outputs are staged and only
/// persisted once every input has been read.
pub fn run(config: &FilterConfig) -> Result<FilterSummary> {
    let accepted = accepted_ids(config)?;

    let mut sorted: Vec<&String> = accepted.ids.iter().collect();
    sorted.sort();

    let ids_file = stage(&config.output, |w| {
        for id in &sorted {
            writeln!(w, "{}", id).map_err(|e| PeptideError::io(&config.output, e))?;
        }
        Ok(())
    })?;

    let subset = match &config.fasta {
        Some(fasta) => {
            let mut count = 0;
            let staged = stage(&config.fasta_output, |w| {
                count = write_fasta_subset(fasta, &accepted.ids, w, &config.fasta_output)?;
                Ok(())
            })?;
            Some((staged, count))
        }
        None => None,
    };

    ids_file.persist()?;
    info!("Wrote {} identifiers to {}", sorted.len(), config.output.display());

    let sequences_written = match subset {
        Some((staged, count)) => {
            staged.persist()?;
            info!("Wrote {} sequences to {}", count, config.fasta_output.display());
            Some(count)
        }
        None => None,
    };

    Ok(FilterSummary {
        amp_ids: accepted.amp,
        anticancer_ids: accepted.anticancer,
        accepted: accepted.ids.len(),
        sequences_written,
    })
}
