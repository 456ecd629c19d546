// Scenario tests for repeated-block detection and block statistics

use super::*;
use crate::trace::KernelEvent;

fn events_from(names: &[&str]) -> Vec<KernelEvent> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| KernelEvent {
            name: (*name).to_string(),
            start_us: i as f64 * 10.0,
            duration_us: 1.0,
        })
        .collect()
}

fn events_with_durations(names: &[&str], durations: &[f64]) -> Vec<KernelEvent> {
    names
        .iter()
        .zip(durations)
        .enumerate()
        .map(|(i, (name, &duration_us))| KernelEvent {
            name: (*name).to_string(),
            start_us: i as f64 * 10.0,
            duration_us,
        })
        .collect()
}

#[test]
fn test_trace_too_short_returns_none() {
    // min_block_length * min_repeats = 60 > 10 events
    let names: Vec<&str> = std::iter::repeat("gemm").take(10).collect();
    let events = events_from(&names);
    assert!(detect_repeated_block(&events, &DetectorConfig::default()).is_none());
}

#[test]
fn test_empty_trace_returns_none() {
    assert!(detect_repeated_block(&[], &DetectorConfig::default()).is_none());
}

#[test]
fn test_three_repeats_with_stray_tail() {
    // A B C | A B C | A B C | D
    let events = events_from(&["A", "B", "C", "A", "B", "C", "A", "B", "C", "D"]);
    let config = DetectorConfig {
        min_block_length: 2,
        max_block_length: 3,
        min_repeats: 2,
        target_occurrences: None,
    };

    let block = detect_repeated_block(&events, &config).expect("block expected");
    assert_eq!(block.length, 3);
    assert_eq!(block.occurrences, vec![0, 3, 6]);
    assert_eq!(block.kernel_sequence, vec!["A", "B", "C"]);
    assert_eq!(block.occurrence_count, 3);
    assert_eq!(block.score, 9);
}

#[test]
fn test_concatenated_unit_is_found_exactly() {
    // 4 copies of a 5-kernel unit
    let unit = ["q", "k", "v", "attn", "proj"];
    let names: Vec<&str> = unit.iter().cycle().take(20).copied().collect();
    let events = events_from(&names);
    let config = DetectorConfig {
        min_block_length: 5,
        max_block_length: 5,
        min_repeats: 2,
        target_occurrences: None,
    };

    let block = detect_repeated_block(&events, &config).expect("block expected");
    assert_eq!(block.length, 5);
    assert_eq!(block.occurrence_count, 4);
    assert_eq!(block.occurrences, vec![0, 5, 10, 15]);
    // every occurrence's name slice equals the unit
    for &start in &block.occurrences {
        let slice: Vec<&str> = events[start..start + 5]
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(slice, unit);
    }
}

#[test]
fn test_occurrences_never_overlap() {
    let names: Vec<&str> = ["A", "B"].iter().cycle().take(40).copied().collect();
    let events = events_from(&names);
    let config = DetectorConfig {
        min_block_length: 2,
        max_block_length: 10,
        min_repeats: 2,
        target_occurrences: None,
    };

    let block = detect_repeated_block(&events, &config).expect("block expected");
    for pair in block.occurrences.windows(2) {
        assert!(pair[1] >= pair[0] + block.length);
    }
    let last = *block.occurrences.last().unwrap();
    assert!(last + block.length <= events.len());
}

#[test]
fn test_detection_is_idempotent() {
    let names: Vec<&str> = ["x", "y", "z", "w"].iter().cycle().take(64).copied().collect();
    let events = events_from(&names);
    let config = DetectorConfig {
        min_block_length: 2,
        max_block_length: 16,
        min_repeats: 2,
        target_occurrences: None,
    };

    let first = detect_repeated_block(&events, &config).expect("block expected");
    let second = detect_repeated_block(&events, &config).expect("block expected");
    assert_eq!(first, second);
}

#[test]
fn test_target_occurrences_prefers_closest_count() {
    // Eleven [a, b] repeats and eight [c, d] repeats, each followed by a
    // unique spacer so rotations of the unit never repeat.
    let mut names: Vec<String> = Vec::new();
    for i in 0..11 {
        names.push("a".to_string());
        names.push("b".to_string());
        names.push(format!("spacer_a{i}"));
    }
    for i in 0..8 {
        names.push("c".to_string());
        names.push("d".to_string());
        names.push(format!("spacer_b{i}"));
    }
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let events = events_from(&refs);
    let config = DetectorConfig {
        min_block_length: 2,
        max_block_length: 2,
        min_repeats: 2,
        target_occurrences: Some(10),
    };

    // diffs are 1 and 2; the count-11 candidate must win
    let block = detect_repeated_block(&events, &config).expect("block expected");
    assert_eq!(block.occurrence_count, 11);
    assert_eq!(block.kernel_sequence, vec!["a", "b"]);
    assert_eq!(block.target_occurrences, Some(10));
    assert_eq!(block.occurrence_diff, Some(1));
}

#[test]
fn test_without_target_highest_score_wins() {
    // Same trace as above, but unbiased: score 22 beats score 16
    let mut names: Vec<String> = Vec::new();
    for i in 0..11 {
        names.push("a".to_string());
        names.push("b".to_string());
        names.push(format!("spacer_a{i}"));
    }
    for i in 0..8 {
        names.push("c".to_string());
        names.push("d".to_string());
        names.push(format!("spacer_b{i}"));
    }
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let events = events_from(&refs);
    let config = DetectorConfig {
        min_block_length: 2,
        max_block_length: 2,
        min_repeats: 2,
        target_occurrences: None,
    };

    let block = detect_repeated_block(&events, &config).expect("block expected");
    assert_eq!(block.kernel_sequence, vec!["a", "b"]);
    assert_eq!(block.score, 22);
    assert!(block.occurrence_diff.is_none());
}

#[test]
fn test_tie_broken_by_earliest_first_occurrence() {
    // Two disjoint units, each repeated twice at length 2: identical ranking
    // tuples, so the earlier block must win.
    let events = events_from(&["a", "b", "x1", "a", "b", "x2", "c", "d", "x3", "c", "d"]);
    let config = DetectorConfig {
        min_block_length: 2,
        max_block_length: 2,
        min_repeats: 2,
        target_occurrences: None,
    };

    let block = detect_repeated_block(&events, &config).expect("block expected");
    assert_eq!(block.kernel_sequence, vec!["a", "b"]);
    assert_eq!(block.occurrences[0], 0);
}

#[test]
fn test_single_kernel_position_stats() {
    // ["A"] * 5 with durations 1..=5
    let events = events_with_durations(
        &["A", "A", "A", "A", "A"],
        &[1.0, 2.0, 3.0, 4.0, 5.0],
    );
    let config = DetectorConfig {
        min_block_length: 1,
        max_block_length: 60,
        min_repeats: 5,
        target_occurrences: None,
    };

    let block = detect_repeated_block(&events, &config).expect("block expected");
    assert_eq!(block.length, 1);
    assert_eq!(block.occurrence_count, 5);

    let rows = summarize_block(&events, Some(&block));
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.position, 0);
    assert_eq!(row.kernel_name, "A");
    assert_eq!(row.occurrences, 5);
    assert!((row.mean_us - 3.0).abs() < 1e-5);
    assert!((row.median_us - 3.0).abs() < 1e-5);
    assert!((row.min_us - 1.0).abs() < 1e-5);
    assert!((row.max_us - 5.0).abs() < 1e-5);
}

#[test]
fn test_block_metadata_duration_totals() {
    // Two occurrences of [A, B]: totals 3.0 and 7.0
    let events = events_with_durations(&["A", "B", "A", "B"], &[1.0, 2.0, 3.0, 4.0]);
    let config = DetectorConfig {
        min_block_length: 2,
        max_block_length: 2,
        min_repeats: 2,
        target_occurrences: None,
    };

    let block = detect_repeated_block(&events, &config).expect("block expected");
    let meta = block_metadata(&events, Some(&block), "unit").expect("metadata expected");
    assert_eq!(meta.trace_name, "unit");
    assert_eq!(meta.block_length, 2);
    assert_eq!(meta.occurrences, 2);
    assert_eq!(meta.first_kernel_index, 0);
    assert_eq!(meta.score, 4);
    assert!((meta.mean_block_duration_us - 5.0).abs() < 1e-5);
    // sample std of [3, 7] = sqrt(8)
    assert!((meta.std_block_duration_us - 8.0f32.sqrt()).abs() < 1e-4);
    assert!((meta.min_block_duration_us - 3.0).abs() < 1e-5);
    assert!((meta.max_block_duration_us - 7.0).abs() < 1e-5);
    assert!(meta.target_occurrences.is_none());
}

#[test]
fn test_block_metadata_reports_target_delta() {
    let names: Vec<&str> = ["A", "B"].iter().cycle().take(12).copied().collect();
    let events = events_from(&names);
    let config = DetectorConfig {
        min_block_length: 2,
        max_block_length: 2,
        min_repeats: 2,
        target_occurrences: Some(4),
    };

    let block = detect_repeated_block(&events, &config).expect("block expected");
    let meta = block_metadata(&events, Some(&block), "t").expect("metadata expected");
    assert_eq!(meta.target_occurrences, Some(4));
    assert_eq!(
        meta.occurrence_delta,
        Some(block.occurrence_count.abs_diff(4))
    );
}

#[test]
fn test_max_length_clamped_by_repeats() {
    // 12 events, min_repeats 4: max usable length is 3 even though the
    // configured maximum is far larger
    let names: Vec<&str> = ["p", "q", "r"].iter().cycle().take(12).copied().collect();
    let events = events_from(&names);
    let config = DetectorConfig {
        min_block_length: 1,
        max_block_length: 60,
        min_repeats: 4,
        target_occurrences: None,
    };

    let block = detect_repeated_block(&events, &config).expect("block expected");
    assert!(block.length <= 3);
    assert!(block.occurrence_count >= 4);
}

#[test]
fn test_no_repetition_returns_none() {
    let names: Vec<String> = (0..50).map(|i| format!("unique_{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let events = events_from(&refs);
    let config = DetectorConfig {
        min_block_length: 2,
        max_block_length: 10,
        min_repeats: 2,
        target_occurrences: None,
    };
    assert!(detect_repeated_block(&events, &config).is_none());
}
