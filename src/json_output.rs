//! JSON report format
//!
//! Machine-readable report per trace: the detected block, its statistics
//! tables, and the top-N kernel summary. Field names are stable; absent
//! blocks serialize as `null` with tables left empty.

use serde::Serialize;

use crate::block::{BlockMetadata, BlockPositionStats, RepeatedBlock};
use crate::summary::KernelRow;

/// Full report for a single trace
#[derive(Debug, Serialize)]
pub struct JsonTraceReport {
    /// Display name of the trace
    pub trace_name: String,
    /// Number of kernel events ingested
    pub event_count: usize,
    /// Winning repeated block, if any
    pub block: Option<RepeatedBlock>,
    /// Per-position duration statistics for the block (empty when no block)
    pub block_positions: Vec<BlockPositionStats>,
    /// Per-trace block metadata (absent when no block)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_metadata: Option<BlockMetadata>,
    /// Top kernels by total duration
    pub top_kernels: Vec<KernelRow>,
    /// Every unique kernel with its mean duration (optionally in a
    /// caller-supplied kernel order)
    pub kernel_summary: Vec<KernelRow>,
}

/// Top-level report covering every analyzed trace
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub traces: Vec<JsonTraceReport>,
}

impl JsonReport {
    /// Serialize the report as pretty-printed JSON
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_without_block_serializes() {
        let report = JsonReport {
            traces: vec![JsonTraceReport {
                trace_name: "Trace_A".to_string(),
                event_count: 0,
                block: None,
                block_positions: Vec::new(),
                block_metadata: None,
                top_kernels: Vec::new(),
                kernel_summary: Vec::new(),
            }],
        };

        let json = report.to_json_string().unwrap();
        assert!(json.contains("\"trace_name\": \"Trace_A\""));
        assert!(json.contains("\"block\": null"));
        assert!(json.contains("\"kernel_summary\""));
        // absent metadata is skipped entirely
        assert!(!json.contains("block_metadata"));
    }

    #[test]
    fn test_report_with_block_serializes_fields() {
        let block = RepeatedBlock {
            length: 2,
            occurrences: vec![0, 2],
            kernel_sequence: vec!["a".to_string(), "b".to_string()],
            score: 4,
            occurrence_count: 2,
            target_occurrences: None,
            occurrence_diff: None,
        };
        let report = JsonReport {
            traces: vec![JsonTraceReport {
                trace_name: "t".to_string(),
                event_count: 4,
                block: Some(block),
                block_positions: Vec::new(),
                block_metadata: None,
                top_kernels: Vec::new(),
                kernel_summary: vec![KernelRow {
                    kernel_name: "a".to_string(),
                    total_us: 2.0,
                    count: 2,
                    mean_us: 1.0,
                }],
            }],
        };

        let json = report.to_json_string().unwrap();
        assert!(json.contains("\"length\": 2"));
        assert!(json.contains("\"kernel_name\": \"a\""));
        assert!(json.contains("\"score\": 4"));
        // optional target fields are skipped when unset
        assert!(!json.contains("target_occurrences"));
    }
}
