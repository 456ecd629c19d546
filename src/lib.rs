//! Bloque - GPU kernel trace repeated-block analyzer
//!
//! This library ingests device-kernel execution traces and discovers the
//! dominant repeated contiguous block of kernel invocations (e.g., one
//! transformer layer executed N times), then summarizes per-position and
//! per-occurrence duration statistics for the winning block.

pub mod block;
pub mod cli;
pub mod csv_output;
pub mod ingest;
pub mod json_output;
pub mod summary;
pub mod trace;

pub use block::{detect_repeated_block, DetectorConfig, RepeatedBlock};
pub use trace::{KernelEvent, KernelTrace};
