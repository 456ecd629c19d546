use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bloque::block::{block_metadata, detect_repeated_block, summarize_block, DetectorConfig};
use bloque::cli::{Cli, OutputFormat};
use bloque::csv_output::render_trace_csv;
use bloque::ingest::{load_kernel_order, load_kernel_trace, trace_name_from_path};
use bloque::json_output::{JsonReport, JsonTraceReport};
use bloque::summary::TraceSummary;
use bloque::trace::KernelTrace;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Analysis results for one trace
struct TraceAnalysis {
    trace: KernelTrace,
    report: JsonTraceReport,
}

fn analyze_trace(
    trace: KernelTrace,
    config: &DetectorConfig,
    top: usize,
    kernel_order: Option<&[String]>,
) -> TraceAnalysis {
    let block = detect_repeated_block(&trace.events, config);
    let positions = summarize_block(&trace.events, block.as_ref());
    let metadata = block_metadata(&trace.events, block.as_ref(), &trace.name);
    let summary = TraceSummary::from_events(&trace.events);

    let report = JsonTraceReport {
        trace_name: trace.name.clone(),
        event_count: trace.len(),
        block,
        block_positions: positions,
        block_metadata: metadata,
        top_kernels: summary.top_by_total_duration(top),
        kernel_summary: summary.mean_duration_summary(kernel_order),
    };
    TraceAnalysis { trace, report }
}

fn render_text(analysis: &TraceAnalysis) -> String {
    let mut out = String::new();
    let report = &analysis.report;

    out.push_str(&format!(
        "=== {} ({} kernel events) ===\n\n",
        report.trace_name, report.event_count
    ));

    match &report.block_metadata {
        Some(meta) => {
            out.push_str("Repeated block:\n");
            out.push_str(&format!("  Block length (kernels):  {}\n", meta.block_length));
            out.push_str(&format!("  Occurrences:             {}\n", meta.occurrences));
            out.push_str(&format!(
                "  First kernel index:      {}\n",
                meta.first_kernel_index
            ));
            out.push_str(&format!("  Score:                   {}\n", meta.score));
            out.push_str(&format!(
                "  Mean block duration:     {:.3} us\n",
                meta.mean_block_duration_us
            ));
            out.push_str(&format!(
                "  Std block duration:      {:.3} us\n",
                meta.std_block_duration_us
            ));
            out.push_str(&format!(
                "  Min/Max block duration:  {:.3} / {:.3} us\n",
                meta.min_block_duration_us, meta.max_block_duration_us
            ));
            if let Some(target) = meta.target_occurrences {
                out.push_str(&format!(
                    "  Target occurrences:      {} (delta {})\n",
                    target,
                    meta.occurrence_delta.unwrap_or(0)
                ));
            }

            out.push_str("\nPer-position durations:\n");
            out.push_str(
                "position          kernel     mean_us   median_us      min_us      max_us  occurrences\n",
            );
            out.push_str(
                "-------- --------------- ----------- ----------- ----------- ----------- ------------\n",
            );
            for row in &report.block_positions {
                out.push_str(&format!(
                    "{:>8} {:>15} {:>11.3} {:>11.3} {:>11.3} {:>11.3} {:>12}\n",
                    row.position,
                    truncate_name(&row.kernel_name, 15),
                    row.mean_us,
                    row.median_us,
                    row.min_us,
                    row.max_us,
                    row.occurrences
                ));
            }
        }
        None => {
            out.push_str("No repeated block found.\n");
        }
    }

    out.push_str("\nTop kernels by total duration:\n");
    out.push_str("        kernel                total_us     calls     mean_us\n");
    out.push_str("------------------------------ ----------- --------- -----------\n");
    for row in &report.top_kernels {
        out.push_str(&format!(
            "{:>30} {:>11.3} {:>9} {:>11.3}\n",
            truncate_name(&row.kernel_name, 30),
            row.total_us,
            row.count,
            row.mean_us
        ));
    }

    out.push_str("\nUnique kernels by mean duration:\n");
    out.push_str("        kernel                 mean_us\n");
    out.push_str("------------------------------ -----------\n");
    for row in &report.kernel_summary {
        out.push_str(&format!(
            "{:>30} {:>11.3}\n",
            truncate_name(&row.kernel_name, 30),
            row.mean_us
        ));
    }
    out.push('\n');
    out
}

fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let prefix: String = name.chars().take(max.saturating_sub(3)).collect();
        format!("{prefix}...")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if cli.min_block_length == 0 {
        anyhow::bail!("--min-block-length must be at least 1");
    }
    if cli.max_block_length < cli.min_block_length {
        anyhow::bail!("--max-block-length must be >= --min-block-length");
    }
    if cli.min_repeats < 2 {
        anyhow::bail!("--min-repeats must be at least 2");
    }
    if cli.names.len() > cli.traces.len() {
        anyhow::bail!(
            "got {} --name values for {} trace(s)",
            cli.names.len(),
            cli.traces.len()
        );
    }

    let kernel_order = match &cli.kernel_order {
        Some(path) => Some(load_kernel_order(path)?),
        None => None,
    };

    let config = DetectorConfig {
        min_block_length: cli.min_block_length,
        max_block_length: cli.max_block_length,
        min_repeats: cli.min_repeats,
        target_occurrences: cli.total_layers,
    };

    let mut analyses = Vec::new();
    for (index, path) in cli.traces.iter().enumerate() {
        let name = cli
            .names
            .get(index)
            .cloned()
            .unwrap_or_else(|| trace_name_from_path(path));
        let trace = load_kernel_trace(path, &name)?;
        analyses.push(analyze_trace(trace, &config, cli.top, kernel_order.as_deref()));
    }

    let rendered = match cli.format {
        OutputFormat::Text => analyses.iter().map(render_text).collect::<String>(),
        OutputFormat::Json => {
            let report = JsonReport {
                traces: analyses.into_iter().map(|a| a.report).collect(),
            };
            report.to_json_string()?
        }
        OutputFormat::Csv => analyses
            .iter()
            .map(|a| {
                render_trace_csv(
                    &a.trace.name,
                    a.report.block_metadata.as_ref(),
                    &a.report.block_positions,
                    &a.report.top_kernels,
                    &a.report.kernel_summary,
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write report to {}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(())
}
