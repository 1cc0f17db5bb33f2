//! Command-line interface for mh-caller.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **call**: Call microhaplotype alleles from a marker file and a read-count table
//! - **markers**: List the markers parsed from a marker definition file
//! - **serve**: Start the JSON API
//!
//! ## Usage
//!
//! ```text
//! # Call alleles with default thresholds
//! mh-caller call markers.txt S01_Seq.txt
//!
//! # Write the report next to the read table (S01_MH.txt)
//! mh-caller call markers.txt S01_Seq.txt --save
//!
//! # Stricter noise floor, drop minor alleles, JSON output
//! mh-caller call markers.txt S01_Seq.txt --noise-cut 0.1 --no-mark-minor --format json
//!
//! # Check a marker file
//! mh-caller markers markers.txt
//! ```

use clap::{Parser, Subcommand};

pub mod call;
pub mod markers;

#[derive(Parser)]
#[command(name = "mh-caller")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Call microhaplotype alleles from amplicon read-count tables")]
#[command(
    long_about = "mh-caller decides which candidate sequences in a read-count table are real microhaplotype alleles.\n\nFor each marker it:\n- Drops noise reads and homopolymer slippage artifacts\n- Aligns surviving sequences to the marker reference allowing one indel\n- Reports the haplotype at the known variant positions plus any extra variants"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Call alleles from a read-count table
    Call(call::CallArgs),

    /// List markers from a marker definition file
    Markers(markers::MarkersArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated report in the legacy export layout
    Text,
    /// Pretty-printed JSON
    Json,
    /// Headered table with one column per field
    Tsv,
}
