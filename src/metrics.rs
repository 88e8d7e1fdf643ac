//! Pure metric calculations over already-collected session counters and
//! samples. Numeric edge cases (zero elapsed time, too few samples, zero
//! attempts) are defined here so callers never see a division by zero or a
//! negative value.

/// Raw words per minute: every keystroke counts, one "word" is 5 keystrokes.
pub fn raw_wpm(total_keystrokes: usize, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds <= 0.0 {
        return 0.0;
    }
    (total_keystrokes as f64 / 5.0) / (elapsed_seconds / 60.0)
}

/// Net words per minute: correct characters only, floored at 0.
pub fn net_wpm(correct_chars: usize, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds <= 0.0 {
        return 0.0;
    }
    let wpm = (correct_chars as f64 / 5.0) / (elapsed_seconds / 60.0);
    wpm.max(0.0)
}

/// Accuracy percentage. Missed characters are deliberately not part of the
/// denominator; only keys the user actually pressed count against them.
pub fn accuracy(correct: usize, incorrect: usize, extra: usize) -> f64 {
    let total = correct + incorrect + extra;
    if total == 0 {
        return 100.0;
    }
    correct as f64 / total as f64 * 100.0
}

/// Consistency as `100 - coefficient of variation` of the per-second raw
/// WPM samples. Fewer than two samples has no defined variance and reads
/// as perfectly consistent.
pub fn consistency(per_second_wpm: &[f64]) -> f64 {
    if per_second_wpm.len() < 2 {
        return 100.0;
    }
    let Some(mean) = mean(per_second_wpm) else {
        return 100.0;
    };
    if mean == 0.0 {
        return 0.0;
    }
    let std_dev = std_dev(per_second_wpm).unwrap_or(0.0);
    let cv = std_dev / mean * 100.0;
    (100.0 - cv).max(0.0)
}

pub fn mean(data: &[f64]) -> Option<f64> {
    match data.len() {
        0 => None,
        n => Some(data.iter().sum::<f64>() / n as f64),
    }
}

/// Population standard deviation.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_wpm_zero_elapsed_is_zero() {
        assert_eq!(raw_wpm(100, 0.0), 0.0);
        assert_eq!(raw_wpm(100, -1.0), 0.0);
    }

    #[test]
    fn raw_wpm_examples() {
        assert_eq!(raw_wpm(0, 10.0), 0.0);
        // 50 keystrokes = 10 "words" in one minute
        assert_eq!(raw_wpm(50, 60.0), 10.0);
        assert_eq!(raw_wpm(50, 30.0), 20.0);
    }

    #[test]
    fn net_wpm_zero_elapsed_is_zero() {
        assert_eq!(net_wpm(100, 0.0), 0.0);
    }

    #[test]
    fn net_wpm_counts_correct_chars_only() {
        assert_eq!(net_wpm(25, 60.0), 5.0);
        assert_eq!(net_wpm(0, 60.0), 0.0);
    }

    #[test]
    fn accuracy_with_no_attempts_is_perfect() {
        assert_eq!(accuracy(0, 0, 0), 100.0);
    }

    #[test]
    fn accuracy_examples() {
        assert_eq!(accuracy(10, 0, 0), 100.0);
        assert_eq!(accuracy(8, 2, 0), 80.0);
        assert_eq!(accuracy(8, 1, 1), 80.0);
        assert_eq!(accuracy(0, 5, 0), 0.0);
    }

    #[test]
    fn consistency_needs_two_samples() {
        assert_eq!(consistency(&[]), 100.0);
        assert_eq!(consistency(&[42.0]), 100.0);
    }

    #[test]
    fn consistency_of_constant_sequence_is_perfect() {
        assert_eq!(consistency(&[50.0, 50.0, 50.0]), 100.0);
    }

    #[test]
    fn consistency_of_zero_mean_is_zero() {
        assert_eq!(consistency(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn consistency_is_floored_at_zero() {
        // Heavily skewed samples: cv far above 100
        assert_eq!(consistency(&[0.0, 0.0, 0.0, 100.0]), 0.0);
    }

    #[test]
    fn consistency_penalizes_variance() {
        let steady = consistency(&[60.0, 62.0, 61.0, 59.0]);
        let erratic = consistency(&[30.0, 90.0, 40.0, 80.0]);
        assert!(steady > erratic);
        assert!(steady > 90.0);
    }

    #[test]
    fn mean_and_std_dev_helpers() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[10.0, 20.0, 30.0]), Some(20.0));
        assert_eq!(std_dev(&[]), None);
        assert_eq!(std_dev(&[5.0, 5.0, 5.0]), Some(0.0));
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.0).abs() < 1e-12);
    }
}
