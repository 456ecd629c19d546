use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::encode::{encode_kernel_names, Token};
use super::rolling::hash_windows;
use crate::trace::KernelEvent;

/// Configuration for repeated-block detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Shortest block length considered
    pub min_block_length: usize,
    /// Longest block length considered (further clamped to n / min_repeats)
    pub max_block_length: usize,
    /// Minimum non-overlapping occurrences to qualify as repeated (>= 2)
    pub min_repeats: usize,
    /// Expected repeat count (e.g., transformer layer count); biases ranking
    /// toward candidates whose occurrence count is closest to it
    pub target_occurrences: Option<usize>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            min_block_length: 30,
            max_block_length: 60,
            min_repeats: 2,
            target_occurrences: None,
        }
    }
}

/// The winning repeated block for one trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatedBlock {
    /// Number of kernels in the block
    pub length: usize,
    /// Ascending, pairwise non-overlapping start positions
    pub occurrences: Vec<usize>,
    /// Kernel names of the block, taken at the first occurrence
    pub kernel_sequence: Vec<String>,
    /// length * occurrence_count: total trace mass explained by the block
    pub score: usize,
    /// Number of selected occurrences
    pub occurrence_count: usize,
    /// Caller-supplied expected repeat count, echoed back when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_occurrences: Option<usize>,
    /// |occurrence_count - target_occurrences| when a target was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_diff: Option<usize>,
}

/// Ranking tuple compared lexicographically across candidates
///
/// With a target: closeness to the target dominates, then raw occurrence
/// count, then length, then score. Without one: score, then length, then
/// occurrence count.
fn rank(score: usize, length: usize, count: usize, target: Option<usize>) -> (i64, i64, i64, i64) {
    match target {
        Some(target) => {
            let diff = (count as i64 - target as i64).abs();
            (-diff, count as i64, length as i64, score as i64)
        }
        None => (score as i64, length as i64, count as i64, 0),
    }
}

/// Greedily reduce sorted starts to a maximal non-overlapping set
///
/// All intervals share the same length, so earliest-start-first is equivalent
/// to earliest-finish-first interval scheduling and maximizes the count.
fn select_non_overlapping(starts: &[usize], length: usize) -> Vec<usize> {
    let mut sorted = starts.to_vec();
    sorted.sort_unstable();

    let mut selected = Vec::new();
    let mut next_free = 0usize;
    for start in sorted {
        if selected.is_empty() || start >= next_free {
            selected.push(start);
            next_free = start + length;
        }
    }
    selected
}

/// Find the most prominent repeated block of kernels in a trace
///
/// Tries candidate lengths from the clamped maximum down to
/// `min_block_length`. For each length, every window is hashed with a rolling
/// polynomial hash; hash buckets are re-verified by exact token comparison
/// (a hash match alone is never trusted), reduced to non-overlapping
/// occurrence sets, and ranked. Returns `None` when the trace is too short
/// or no block reaches `min_repeats` at any length.
///
/// Ties on the full ranking tuple are broken toward the candidate whose
/// first occurrence starts earliest, which makes the result deterministic
/// regardless of hash-map iteration order.
pub fn detect_repeated_block(
    events: &[KernelEvent],
    config: &DetectorConfig,
) -> Option<RepeatedBlock> {
    let min_length = config.min_block_length.max(1);
    let min_repeats = config.min_repeats.max(2);
    let target = config.target_occurrences;

    let (encoded, _mapping) = encode_kernel_names(events.iter().map(|e| e.name.as_str()));
    let n = encoded.len();

    if n < min_length * min_repeats {
        return None;
    }
    let max_length = config.max_block_length.min(n / min_repeats);
    if max_length < min_length {
        return None;
    }

    debug!(
        trace_len = n,
        min_length, max_length, min_repeats, "starting repeated-block detection"
    );

    let mut best: Option<(RepeatedBlock, (i64, i64, i64, i64))> = None;

    for length in (min_length..=max_length).rev() {
        let buckets = hash_windows(&encoded, length);

        for starts in buckets.values() {
            if starts.len() < min_repeats {
                continue;
            }

            // Collisions are possible: sub-group by the actual token slice.
            let mut verified: HashMap<&[Token], Vec<usize>> = HashMap::new();
            for &start in starts {
                verified
                    .entry(&encoded[start..start + length])
                    .or_default()
                    .push(start);
            }

            for occurrences in verified.values() {
                let selected = select_non_overlapping(occurrences, length);
                if selected.len() < min_repeats {
                    continue;
                }

                let count = selected.len();
                let score = length * count;
                let priority = rank(score, length, count, target);

                let replaces = match &best {
                    None => true,
                    Some((current, current_priority)) => {
                        priority > *current_priority
                            || (priority == *current_priority
                                && selected[0] < current.occurrences[0])
                    }
                };
                if !replaces {
                    continue;
                }

                trace!(length, count, score, first = selected[0], "new best block");
                let first = selected[0];
                let kernel_sequence = events[first..first + length]
                    .iter()
                    .map(|e| e.name.clone())
                    .collect();
                let block = RepeatedBlock {
                    length,
                    occurrences: selected,
                    kernel_sequence,
                    score,
                    occurrence_count: count,
                    target_occurrences: target,
                    occurrence_diff: target.map(|t| count.abs_diff(t)),
                };
                best = Some((block, priority));
            }
        }
    }

    if let Some((block, _)) = &best {
        debug!(
            length = block.length,
            occurrences = block.occurrence_count,
            score = block.score,
            "detection finished"
        );
    } else {
        debug!("no repeated block found");
    }

    best.map(|(block, _)| block)
}
