use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, Level};
use std::path::PathBuf;
use std::time::Instant;

use peptominer::config::{FilterConfig, IntegratorConfig, CONTIGS_LABEL};
use peptominer::{filter, integrate};

#[derive(Parser)]
#[command(name = "peptominer")]
#[command(version)]
#[command(about = "Integrate antimicrobial/anticancer peptide predictions with annotation and taxonomy")]
#[command(long_about = r#"
peptominer - therapeutic peptide prediction integration

Consumes the outputs of the peptide-mining workflow:
  MACREL        macrel.out.prediction.tsv       antimicrobial prediction
  AntiCP        anticp_output.csv               anticancer prediction
  eggNOG-mapper eggnog_output.emapper.annotations
  Kraken2       kraken2_contigs_output.txt      contig taxonomy
  Prodigal      proteins.faa                    protein catalog

COMMANDS:
  filter      Union of accepted ids (AMP_family != None, all AntiCP hits)
  integrate   One JSON record per MACREL/AntiCP peptide

EXAMPLES:
  peptominer filter --macrel macrel.out.prediction.tsv --anticp anticp_output.csv --fasta peptides.faa
  peptominer integrate -d results/
"#)]
struct Cli {
    #[arg(short = 'v', long, global = true, help_heading = "Output")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the accepted peptide ids (good_ids.txt)
    Filter {
        #[arg(short = 'm', long, value_name = "FILE", help_heading = "Input")]
        macrel: PathBuf,

        #[arg(short = 'a', long, value_name = "FILE", help_heading = "Input")]
        anticp: PathBuf,

        /// Peptide FASTA to subset by the accepted ids
        #[arg(short = 'f', long, value_name = "FILE", help_heading = "Input")]
        fasta: Option<PathBuf>,

        #[arg(short = 'o', long, value_name = "DIR", default_value = ".", help_heading = "Output")]
        outdir: PathBuf,

        #[arg(long = "fasta-out", value_name = "FILE", help_heading = "Output")]
        fasta_out: Option<PathBuf>,
    },

    /// Join all sources into peptideos_integrados.json
    Integrate {
        /// Directory holding the inputs under their conventional names
        #[arg(short = 'd', long, value_name = "DIR", default_value = ".", help_heading = "Input")]
        dir: PathBuf,

        #[arg(long, value_name = "FILE", help_heading = "Input")]
        kraken: Option<PathBuf>,

        #[arg(long, value_name = "FILE", help_heading = "Input")]
        eggnog: Option<PathBuf>,

        #[arg(long, value_name = "FILE", help_heading = "Input")]
        proteins: Option<PathBuf>,

        #[arg(long, value_name = "FILE", help_heading = "Input")]
        macrel: Option<PathBuf>,

        #[arg(long, value_name = "FILE", help_heading = "Input")]
        anticp: Option<PathBuf>,

        /// Label recorded as origin.contig_file
        #[arg(long = "contig-file", value_name = "NAME", default_value = CONTIGS_LABEL, help_heading = "Output")]
        contig_file: String,

        /// Defaults to peptideos_integrados.json inside --dir
        #[arg(short = 'o', long, value_name = "FILE", help_heading = "Output")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let start_time = Instant::now();

    let level = if cli.verbose { Level::Debug } else { Level::Info };
    simple_logger::init_with_level(level).context("Failed to initialise logger")?;

    match cli.command {
        Command::Filter { macrel, anticp, fasta, outdir, fasta_out } => {
            let mut config = FilterConfig::new(macrel, anticp, &outdir);
            config.fasta = fasta;
            if let Some(path) = fasta_out {
                config.fasta_output = path;
            }

            let summary = filter::run(&config).context("ID filter failed")?;
            info!("{} accepted identifiers written to {}", summary.accepted, config.output.display());
        }
        Command::Integrate { dir, kraken, eggnog, proteins, macrel, anticp, contig_file, output } => {
            let mut config = IntegratorConfig::in_dir(&dir);
            if let Some(p) = kraken {
                config.inputs.taxonomy = p;
            }
            if let Some(p) = eggnog {
                config.inputs.annotations = p;
            }
            if let Some(p) = proteins {
                config.inputs.proteins = p;
            }
            if let Some(p) = macrel {
                config.inputs.amp = p;
            }
            if let Some(p) = anticp {
                config.inputs.anticancer = p;
            }
            config.contig_file = contig_file;
            if let Some(p) = output {
                config.output = p;
            }

            integrate::run(&config).context("Integration failed")?;
        }
    }

    info!("Total time: {:.1}s", start_time.elapsed().as_secs_f64());
    Ok(())
}
