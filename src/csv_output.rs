//! CSV report format for spreadsheet analysis
//!
//! Renders the block metadata, the per-position table, the top-N kernel
//! table, and the per-unique-kernel mean-duration summary as CSV sections
//! separated by blank lines. Header rows are always emitted, even when no
//! block was found, so downstream tooling sees stable column names.

use crate::block::{BlockMetadata, BlockPositionStats};
use crate::summary::KernelRow;

const METADATA_HEADER: &str = "metric,value";
const POSITION_HEADER: &str = "position,kernel_name,mean_us,median_us,min_us,max_us,occurrences";
const TOP_KERNELS_HEADER: &str = "kernel_name,total_us,count,mean_us";
const KERNEL_SUMMARY_HEADER: &str = "kernel_name,mean_us";

/// Escape a CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_metric(out: &mut String, metric: &str, value: &str) {
    out.push_str(&escape_field(metric));
    out.push(',');
    out.push_str(&escape_field(value));
    out.push('\n');
}

/// Render one trace's report as CSV
pub fn render_trace_csv(
    trace_name: &str,
    metadata: Option<&BlockMetadata>,
    positions: &[BlockPositionStats],
    top_kernels: &[KernelRow],
    kernel_summary: &[KernelRow],
) -> String {
    let mut out = String::new();

    out.push_str(METADATA_HEADER);
    out.push('\n');
    match metadata {
        Some(meta) => {
            push_metric(&mut out, "trace_name", &meta.trace_name);
            push_metric(&mut out, "block_length", &meta.block_length.to_string());
            push_metric(&mut out, "occurrences", &meta.occurrences.to_string());
            push_metric(
                &mut out,
                "first_kernel_index",
                &meta.first_kernel_index.to_string(),
            );
            push_metric(&mut out, "score", &meta.score.to_string());
            push_metric(
                &mut out,
                "mean_block_duration_us",
                &format!("{:.3}", meta.mean_block_duration_us),
            );
            push_metric(
                &mut out,
                "std_block_duration_us",
                &format!("{:.3}", meta.std_block_duration_us),
            );
            push_metric(
                &mut out,
                "min_block_duration_us",
                &format!("{:.3}", meta.min_block_duration_us),
            );
            push_metric(
                &mut out,
                "max_block_duration_us",
                &format!("{:.3}", meta.max_block_duration_us),
            );
            if let Some(target) = meta.target_occurrences {
                push_metric(&mut out, "target_occurrences", &target.to_string());
            }
            if let Some(delta) = meta.occurrence_delta {
                push_metric(&mut out, "occurrence_delta", &delta.to_string());
            }
        }
        None => {
            push_metric(&mut out, "trace_name", trace_name);
            push_metric(&mut out, "status", "no repeated block found");
        }
    }
    out.push('\n');

    out.push_str(POSITION_HEADER);
    out.push('\n');
    for row in positions {
        out.push_str(&format!(
            "{},{},{:.3},{:.3},{:.3},{:.3},{}\n",
            row.position,
            escape_field(&row.kernel_name),
            row.mean_us,
            row.median_us,
            row.min_us,
            row.max_us,
            row.occurrences
        ));
    }
    out.push('\n');

    out.push_str(TOP_KERNELS_HEADER);
    out.push('\n');
    for row in top_kernels {
        out.push_str(&format!(
            "{},{:.3},{},{:.3}\n",
            escape_field(&row.kernel_name),
            row.total_us,
            row.count,
            row.mean_us
        ));
    }
    out.push('\n');

    out.push_str(KERNEL_SUMMARY_HEADER);
    out.push('\n');
    for row in kernel_summary {
        out.push_str(&format!(
            "{},{:.3}\n",
            escape_field(&row.kernel_name),
            row.mean_us
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_field() {
        assert_eq!(escape_field("gemm_kernel"), "gemm_kernel");
    }

    #[test]
    fn test_escape_field_with_comma() {
        assert_eq!(
            escape_field("gemm<float, float>"),
            "\"gemm<float, float>\""
        );
    }

    #[test]
    fn test_escape_field_with_quotes() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_no_block_still_emits_headers() {
        let csv = render_trace_csv("Trace_A", None, &[], &[], &[]);
        assert!(csv.contains(METADATA_HEADER));
        assert!(csv.contains(POSITION_HEADER));
        assert!(csv.contains(TOP_KERNELS_HEADER));
        assert!(csv.contains(KERNEL_SUMMARY_HEADER));
        assert!(csv.contains("status,no repeated block found"));
    }

    #[test]
    fn test_position_rows_rendered() {
        let positions = vec![BlockPositionStats {
            position: 0,
            kernel_name: "gemm".to_string(),
            mean_us: 3.0,
            median_us: 3.0,
            min_us: 1.0,
            max_us: 5.0,
            occurrences: 5,
        }];
        let csv = render_trace_csv("t", None, &positions, &[], &[]);
        assert!(csv.contains("0,gemm,3.000,3.000,1.000,5.000,5"));
    }

    #[test]
    fn test_top_kernel_rows_rendered() {
        let top = vec![KernelRow {
            kernel_name: "attn<a,b>".to_string(),
            total_us: 100.0,
            count: 4,
            mean_us: 25.0,
        }];
        let csv = render_trace_csv("t", None, &[], &top, &[]);
        assert!(csv.contains("\"attn<a,b>\",100.000,4,25.000"));
    }

    #[test]
    fn test_kernel_summary_section_rendered() {
        let summary = vec![
            KernelRow {
                kernel_name: "gemm".to_string(),
                total_us: 100.0,
                count: 4,
                mean_us: 25.0,
            },
            KernelRow {
                kernel_name: "softmax".to_string(),
                total_us: 10.0,
                count: 4,
                mean_us: 2.5,
            },
        ];
        let csv = render_trace_csv("t", None, &[], &[], &summary);
        let summary_section = csv
            .split(&format!("\n{KERNEL_SUMMARY_HEADER}\n"))
            .nth(1)
            .expect("summary section");
        assert!(summary_section.contains("gemm,25.000"));
        assert!(summary_section.contains("softmax,2.500"));
    }
}
