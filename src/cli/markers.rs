use std::path::PathBuf;

use clap::Args;

use crate::catalog::store::MarkerCatalog;
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct MarkersArgs {
    /// Marker definition file ('-' for stdin)
    #[arg(required = true)]
    pub markers: PathBuf,
}

/// Execute markers subcommand
///
/// # Errors
///
/// Returns an error if the marker file cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: MarkersArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = MarkerCatalog::load_from_file(&args.markers)?;

    if verbose {
        eprintln!(
            "Parsed {} marker lines, {} distinct markers",
            catalog.lines_parsed(),
            catalog.len()
        );
    }

    match format {
        OutputFormat::Text => print_text(&catalog),
        OutputFormat::Json => println!("{}", catalog.to_json()?),
        OutputFormat::Tsv => print_tsv(&catalog),
    }

    for warning in catalog.warnings() {
        eprintln!("{warning}");
    }

    Ok(())
}

fn print_text(catalog: &MarkerCatalog) {
    if catalog.lines_parsed() == 0 {
        println!("{}", catalog.load_status());
        return;
    }

    for marker in catalog.markers() {
        println!(
            "{} ({}:{}-{}, {} bp)",
            marker.name,
            marker.chromosome,
            marker.seq_start,
            marker.window_end() - 1,
            marker.window_len()
        );
        for variant in &marker.variants {
            let note = if marker.contains(variant.position) {
                ""
            } else {
                "  (outside window)"
            };
            println!("   {}:{}{note}", variant.id, variant.position);
        }
    }

    println!("\n{}", catalog.load_status());
}

fn print_tsv(catalog: &MarkerCatalog) {
    println!("name\tchromosome\tseq_start\tlength\tvariants");
    for marker in catalog.markers() {
        let variants = marker
            .variants
            .iter()
            .map(|v| format!("{}:{}", v.id, v.position))
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{}\t{}\t{}\t{}\t{}",
            marker.name,
            marker.chromosome,
            marker.seq_start,
            marker.window_len(),
            variants
        );
    }
}
