//! CLI argument parsing for bloque

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Output format for analysis reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "bloque")]
#[command(version)]
#[command(about = "Find the dominant repeated kernel block in GPU traces", long_about = None)]
pub struct Cli {
    /// Trace files to analyze (Chrome trace-event JSON, optionally gzipped);
    /// pass two files for an A/B comparison
    #[arg(value_name = "TRACE", required = true, num_args = 1..=2)]
    pub traces: Vec<PathBuf>,

    /// Display name for each trace, in order (defaults to the file stem)
    #[arg(long = "name", value_name = "NAME")]
    pub names: Vec<String>,

    /// Shortest block length considered
    #[arg(long = "min-block-length", value_name = "N", default_value = "30")]
    pub min_block_length: usize,

    /// Longest block length considered (clamped to trace_len / min_repeats)
    #[arg(long = "max-block-length", value_name = "N", default_value = "60")]
    pub max_block_length: usize,

    /// Minimum non-overlapping occurrences for a block to count as repeated
    #[arg(long = "min-repeats", value_name = "N", default_value = "2")]
    pub min_repeats: usize,

    /// Expected layer count; biases detection toward blocks repeating this often
    #[arg(long = "total-layers", value_name = "COUNT")]
    pub total_layers: Option<usize>,

    /// Number of kernels in the top-duration summary
    #[arg(long = "top", value_name = "N", default_value = "30")]
    pub top: usize,

    /// File with one kernel name per line; orders the per-kernel mean
    /// summary by that list instead of by mean duration
    #[arg(long = "kernel-order", value_name = "FILE")]
    pub kernel_order: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
