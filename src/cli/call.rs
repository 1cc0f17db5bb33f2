use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crate::calling::config::{
    CallingConfig, DEFAULT_ALLELE_COVER, DEFAULT_HOMOPOLYMER_ERR, DEFAULT_MIN_READ_COUNT,
    DEFAULT_NOISE_CUT,
};
use crate::calling::report::{write_legacy, write_tsv};
use crate::calling::{call_aggregation, PipelineOutput};
use crate::catalog::store::MarkerCatalog;
use crate::cli::OutputFormat;
use crate::parsing::input::is_stdin;
use crate::parsing::reads::aggregate_read_file;
use crate::utils::validation::derive_report_path;

#[derive(Args)]
pub struct CallArgs {
    /// Marker definition file ('-' for stdin)
    #[arg(required = true)]
    pub markers: PathBuf,

    /// Read-count table ('-' for stdin)
    #[arg(required = true)]
    pub reads: PathBuf,

    /// Minimum summed read count for a row to be a candidate (floor 10)
    #[arg(long, default_value_t = DEFAULT_MIN_READ_COUNT)]
    pub min_reads: u64,

    /// Candidates at or below this share of marker coverage are noise
    #[arg(long, default_value_t = DEFAULT_NOISE_CUT)]
    pub noise_cut: f64,

    /// Homopolymer candidates at or below this share of valid reads are dropped
    #[arg(long, default_value_t = DEFAULT_HOMOPOLYMER_ERR)]
    pub homopolymer_err: f64,

    /// Alleles at or below this share of valid reads are minor
    #[arg(long, default_value_t = DEFAULT_ALLELE_COVER)]
    pub allele_cover: f64,

    /// Drop minor alleles instead of flagging them with '<'
    #[arg(long)]
    pub no_mark_minor: bool,

    /// Report plain reference bases instead of labelled variant annotations
    #[arg(long)]
    pub plain_haplotype: bool,

    /// Write the report to this file instead of stdout
    #[arg(short, long, conflicts_with = "save")]
    pub output: Option<PathBuf>,

    /// Write the report next to the read table (`_Seq.` becomes `_MH.`)
    #[arg(short, long)]
    pub save: bool,
}

impl CallArgs {
    fn config(&self) -> CallingConfig {
        CallingConfig {
            min_read_count: self.min_reads,
            noise_cut: self.noise_cut,
            homopolymer_err: self.homopolymer_err,
            allele_cover: self.allele_cover,
            mark_minor: !self.no_mark_minor,
            plain_haplotype: self.plain_haplotype,
        }
    }

    fn output_path(&self) -> anyhow::Result<Option<PathBuf>> {
        if let Some(path) = &self.output {
            return Ok(Some(path.clone()));
        }
        if self.save {
            if is_stdin(&self.reads) {
                anyhow::bail!("--save needs a read file, not stdin; use --output instead");
            }
            return Ok(Some(derive_report_path(&self.reads)));
        }
        Ok(None)
    }
}

/// Execute call subcommand
///
/// # Errors
///
/// Returns an error if a threshold is invalid, an input cannot be read, or the
/// report cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CallArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if is_stdin(&args.markers) && is_stdin(&args.reads) {
        anyhow::bail!("Only one of the marker file and the read table can be read from stdin");
    }

    let config = args.config().validated()?;
    let output_path = args.output_path()?;

    let catalog = MarkerCatalog::load_from_file(&args.markers)?;
    if verbose {
        eprintln!("{}", catalog.load_status());
    }

    let aggregation = aggregate_read_file(&args.reads, config.min_read_count)?;
    if verbose {
        eprintln!(
            "Read {} rows in {} marker groups",
            aggregation.rows,
            aggregation.groups.len()
        );
    }

    let output = call_aggregation(&catalog, &aggregation, &config);

    for warning in &output.summary.warnings {
        eprintln!("{warning}");
    }
    if verbose {
        eprintln!("{}", output.summary.status());
    }

    match output_path {
        Some(path) => {
            let mut file = std::fs::File::create(&path)?;
            write_output(&mut file, &output, &config, format)?;
            if verbose {
                eprintln!("Report written to {}", path.display());
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_output(&mut lock, &output, &config, format)?;
        }
    }

    Ok(())
}

fn write_output<W: Write>(
    out: &mut W,
    output: &PipelineOutput,
    config: &CallingConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => write_legacy(out, &output.records)?,
        OutputFormat::Tsv => write_tsv(out, &output.records)?,
        OutputFormat::Json => {
            let json = serde_json::json!({
                "config": config,
                "summary": output.summary,
                "records": output.records,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: CallArgs,
    }

    #[test]
    fn test_default_thresholds() {
        let cli = TestCli::parse_from(["test", "markers.txt", "S01_Seq.txt"]);
        assert_eq!(cli.args.config(), CallingConfig::default());
        assert_eq!(cli.args.output_path().unwrap(), None);
    }

    #[test]
    fn test_threshold_flags() {
        let cli = TestCli::parse_from([
            "test",
            "markers.txt",
            "S01_Seq.txt",
            "--min-reads",
            "50",
            "--noise-cut",
            "0.1",
            "--no-mark-minor",
            "--plain-haplotype",
        ]);
        let config = cli.args.config();
        assert_eq!(config.min_read_count, 50);
        assert!((config.noise_cut - 0.1).abs() < f64::EPSILON);
        assert!(!config.mark_minor);
        assert!(config.plain_haplotype);
    }

    #[test]
    fn test_save_derives_path() {
        let cli = TestCli::parse_from(["test", "markers.txt", "run/S01_Seq.txt", "--save"]);
        assert_eq!(
            cli.args.output_path().unwrap(),
            Some(Path::new("run/S01_MH.txt").to_path_buf())
        );
    }

    #[test]
    fn test_save_from_stdin_fails() {
        let cli = TestCli::parse_from(["test", "markers.txt", "-", "--save"]);
        assert!(cli.args.output_path().is_err());
    }
}
