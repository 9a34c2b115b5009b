//! Command line driver for the FragPipe analysis pipeline.
//!
//! Each stage is its own subcommand and reads the files written by the
//! previous one:
//!
//! ```text
//! fragstat format data/
//! fragstat annotate data/ annotations.txt
//! fragstat stats data/A_annotated.txt data/B_annotated.txt welch fdr_bh
//! fragstat volcano output/proteomics/AVSB_welch_fdr_bh.txt plots/
//! fragstat significant output/proteomics/AVSB_welch_fdr_bh.txt tables/
//! ```
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fragpipe::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fragstat")]
#[command(about = "Format, annotate, test and plot FragPipe protein tables")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    /// JSON file overriding the significance and plotting thresholds
    #[arg(long, global = true)]
    thresholds: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reformat raw FragPipe exports into <name>_formatted.txt
    Format {
        /// A raw export, or a folder of them
        path: PathBuf,
    },

    /// Replace accessions by annotations, writing <name>_annotated.txt
    Annotate {
        /// A formatted file, or a folder of *_formatted.txt files
        path: PathBuf,

        /// Tab separated accession -> annotation dictionary
        #[arg(required_unless_present = "fasta")]
        dictionary: Option<PathBuf>,

        /// Build the dictionary from UniProt FASTA headers instead
        #[arg(long, conflicts_with = "dictionary")]
        fasta: Option<PathBuf>,
    },

    /// Merge two conditions and test every protein
    Stats {
        /// Annotated file of the first condition
        file_1: PathBuf,

        /// Annotated file of the second condition
        file_2: PathBuf,

        /// Statistical test, or a correction method when given alone
        arg_3: Option<String>,

        /// Multiple testing correction
        arg_4: Option<String>,

        /// Folder for the results table
        #[arg(short, long, default_value = "output/proteomics")]
        output_dir: PathBuf,
    },

    /// Draw a volcano plot of a statistics table
    Volcano {
        input: PathBuf,
        output_dir: PathBuf,
    },

    /// Extract the significant proteins of a statistics table
    Significant {
        input: PathBuf,
        output_dir: PathBuf,
    },
}

/// A single optional argument names the correction when it is a valid
/// method, and the test otherwise
fn test_and_correction(arg_3: Option<&str>, arg_4: Option<&str>) -> (StatTest, Correction) {
    match (arg_3, arg_4) {
        (None, _) => (StatTest::default(), Correction::default()),
        (Some(a), None) if Correction::is_method(a) => {
            (StatTest::default(), Correction::parse_or_default(a))
        }
        (Some(a), None) => (StatTest::parse_or_default(a), Correction::default()),
        (Some(a), Some(b)) => (
            StatTest::parse_or_default(a),
            Correction::parse_or_default(b),
        ),
    }
}

fn load_dictionary(dictionary: Option<&Path>, fasta: Option<&Path>) -> Result<Dictionary> {
    let dict = match (fasta, dictionary) {
        (Some(fasta), _) => Dictionary::from_fasta(fasta)
            .with_context(|| format!("failed to read FASTA file {}", fasta.display()))?,
        (None, Some(path)) => Dictionary::load(path)
            .with_context(|| format!("failed to read dictionary {}", path.display()))?,
        (None, None) => anyhow::bail!("either a dictionary or --fasta is required"),
    };
    tracing::info!("loaded {} annotations", dict.len());
    Ok(dict)
}

fn cmd_format(path: &Path) -> Result<()> {
    if path.is_dir() {
        let written = format::format_folder(path)
            .with_context(|| format!("failed to format folder {}", path.display()))?;
        tracing::info!("formatted {} files", written.len());
    } else {
        format::format_file(path)
            .with_context(|| format!("failed to format {}", path.display()))?;
    }
    Ok(())
}

fn cmd_annotate(path: &Path, dictionary: Option<&Path>, fasta: Option<&Path>) -> Result<()> {
    let dict = load_dictionary(dictionary, fasta)?;
    if path.is_dir() {
        let written = annotate::annotate_folder(path, &dict)
            .with_context(|| format!("failed to annotate folder {}", path.display()))?;
        tracing::info!("annotated {} files", written.len());
    } else {
        annotate::annotate_file(path, &dict)
            .with_context(|| format!("failed to annotate {}", path.display()))?;
    }
    Ok(())
}

fn cmd_stats(
    file_1: &Path,
    file_2: &Path,
    arg_3: Option<&str>,
    arg_4: Option<&str>,
    output_dir: &Path,
    thresholds: Thresholds,
) -> Result<()> {
    let (test, correction) = test_and_correction(arg_3, arg_4);
    Analysis::new(test, correction)
        .with_thresholds(thresholds)
        .run(file_1, file_2, output_dir)
        .with_context(|| {
            format!(
                "failed to compare {} and {}",
                file_1.display(),
                file_2.display()
            )
        })?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    let thresholds = match &cli.thresholds {
        Some(path) => Thresholds::load(path)
            .with_context(|| format!("failed to load thresholds from {}", path.display()))?,
        None => Thresholds::default(),
    };

    match cli.command {
        Commands::Format { path } => cmd_format(&path),
        Commands::Annotate {
            path,
            dictionary,
            fasta,
        } => cmd_annotate(&path, dictionary.as_deref(), fasta.as_deref()),
        Commands::Stats {
            file_1,
            file_2,
            arg_3,
            arg_4,
            output_dir,
        } => cmd_stats(
            &file_1,
            &file_2,
            arg_3.as_deref(),
            arg_4.as_deref(),
            &output_dir,
            thresholds,
        ),
        Commands::Volcano { input, output_dir } => {
            volcano::volcano_file(&input, &output_dir, thresholds)
                .with_context(|| format!("failed to plot {}", input.display()))?;
            Ok(())
        }
        Commands::Significant { input, output_dir } => {
            significant::significant_file(&input, &output_dir, &thresholds)
                .with_context(|| format!("failed to summarize {}", input.display()))?;
            Ok(())
        }
    }
}
