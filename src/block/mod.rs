// Repeated-Block Detection for GPU Kernel Traces
//
// This module finds the dominant repeated contiguous block of kernel
// invocations in a trace (e.g., one transformer layer executed N times).
// Instead of comparing every pair of windows, it rolls a 64-bit polynomial
// hash over the token-encoded trace for each candidate block length, then
// verifies hash matches by exact token comparison.
//
// Pipeline: encode -> rolling hash per length -> verify -> select
// non-overlapping occurrences -> score across lengths -> summarize winner.

mod detect;
mod encode;
mod rolling;
mod stats;

pub use detect::{detect_repeated_block, DetectorConfig, RepeatedBlock};
pub use encode::{encode_kernel_names, Token};
pub use rolling::{hash_windows, HASH_BASE};
pub use stats::{block_metadata, summarize_block, BlockMetadata, BlockPositionStats};

#[cfg(test)]
mod tests;
