//! Chrome trace-event ingestion
//!
//! Loads a profiler trace (`traceEvents` JSON, optionally gzip-compressed)
//! and keeps only complete device-kernel events: `ph == "X"` with a category
//! containing "kernel". Timestamps are rebased so the first kernel starts at
//! zero. The detector never touches files; this module is its only source of
//! `KernelTrace` values in the CLI.

use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::trace::{KernelEvent, KernelTrace};

/// Errors while loading a trace file
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse trace JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Deserialize)]
struct RawTrace {
    #[serde(default, rename = "traceEvents")]
    trace_events: Vec<RawEvent>,
}

/// One entry of the traceEvents array; unknown fields are ignored
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    ph: String,
    #[serde(default)]
    cat: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    ts: f64,
    #[serde(default)]
    dur: f64,
}

impl RawEvent {
    fn is_kernel(&self) -> bool {
        self.ph == "X" && self.cat.to_ascii_lowercase().contains("kernel")
    }
}

/// Decompress if gzipped, otherwise pass the bytes through
fn decode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut decoder = GzDecoder::new(bytes);
    let mut decoded = Vec::new();
    match decoder.read_to_end(&mut decoded) {
        Ok(_) => decoded,
        Err(_) => bytes.to_vec(),
    }
}

/// Load the kernel events of one trace file
///
/// An input with no kernel events yields an empty (still valid) trace.
pub fn load_kernel_trace(path: &Path, trace_name: &str) -> Result<KernelTrace> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let json = decode_bytes(&bytes);

    let raw: RawTrace = serde_json::from_slice(&json).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let kernels: Vec<&RawEvent> = raw
        .trace_events
        .iter()
        .filter(|e| e.is_kernel())
        .collect();
    let base_ts = kernels.first().map_or(0.0, |e| e.ts);

    let events: Vec<KernelEvent> = kernels
        .iter()
        .map(|e| KernelEvent {
            name: e.name.clone(),
            start_us: e.ts - base_ts,
            duration_us: e.dur,
        })
        .collect();

    debug!(
        path = %path.display(),
        total_events = raw.trace_events.len(),
        kernel_events = events.len(),
        "loaded trace"
    );

    Ok(KernelTrace::new(trace_name, events))
}

/// Load an ordered kernel-name list: one name per line, blanks skipped
///
/// Used to order the per-kernel summary by a caller-supplied list (e.g., the
/// kernels of one architectural layer in execution order).
pub fn load_kernel_order(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Derive a display name from a trace path (file stem, minus trace suffixes)
pub fn trace_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map_or_else(|| "trace".to_string(), |n| n.to_string_lossy().into_owned());
    file_name
        .trim_end_matches(".gz")
        .trim_end_matches(".json")
        .trim_end_matches(".trace")
        .to_string()
}
