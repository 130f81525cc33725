//! Run-length and rolling-window helpers

/// Length of the longest run of `true` values.
pub fn longest_run<I>(mask: I) -> usize
where
    I: IntoIterator<Item = bool>,
{
    let mut longest = 0;
    let mut current = 0;
    for flag in mask {
        if flag {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Number of `true` values that belong to runs of at least `window` values.
pub fn windowed_run_count<I>(mask: I, window: usize) -> usize
where
    I: IntoIterator<Item = bool>,
{
    let mut total = 0;
    let mut current = 0;
    for flag in mask {
        if flag {
            current += 1;
        } else {
            if current >= window {
                total += current;
            }
            current = 0;
        }
    }
    if current >= window {
        total += current;
    }
    total
}

/// Sum of the `window` values ending at index `end` (inclusive).
///
/// `None` when the window starts before the series or contains a non-finite
/// value.
pub fn trailing_sum(values: &[f32], end: usize, window: usize) -> Option<f64> {
    if window == 0 || end >= values.len() || end + 1 < window {
        return None;
    }
    let mut sum = 0.0_f64;
    for &v in &values[end + 1 - window..=end] {
        if !v.is_finite() {
            return None;
        }
        sum += f64::from(v);
    }
    Some(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(pattern: &str) -> Vec<bool> {
        pattern.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn longest_run_finds_the_maximum() {
        assert_eq!(longest_run(mask("0110111010")), 3);
        assert_eq!(longest_run(mask("0000")), 0);
        assert_eq!(longest_run(mask("1111")), 4);
        assert_eq!(longest_run(Vec::new()), 0);
    }

    #[test]
    fn windowed_run_count_only_counts_long_runs() {
        // runs of 2, 3 and 1
        let m = mask("0110111010");
        assert_eq!(windowed_run_count(m.clone(), 1), 6);
        assert_eq!(windowed_run_count(m.clone(), 2), 5);
        assert_eq!(windowed_run_count(m.clone(), 3), 3);
        assert_eq!(windowed_run_count(m, 4), 0);
        assert_eq!(windowed_run_count(mask("0111111"), 6), 6);
    }

    #[test]
    fn trailing_sum_requires_full_window() {
        let values = [1.0, 2.0, 3.0, 4.0, f32::NAN, 6.0];
        assert_eq!(trailing_sum(&values, 1, 3), None);
        assert_eq!(trailing_sum(&values, 2, 3), Some(6.0));
        assert_eq!(trailing_sum(&values, 3, 3), Some(9.0));
        assert_eq!(trailing_sum(&values, 4, 3), None);
        assert_eq!(trailing_sum(&values, 5, 1), Some(6.0));
        assert_eq!(trailing_sum(&values, 6, 1), None);
    }
}
