/// Mean after adding `value` to `count` samples averaging `mean`.
pub fn running_mean(mean: f64, count: u32, value: f64) -> f64 {
    (mean * count as f64 + value) / (count as f64 + 1.0)
}

/// Seconds as `MM:SS`. Minutes keep counting past 99.
pub fn format_clock(seconds: u64) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{mins:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_mean() {
        assert_eq!(running_mean(0.0, 0, 4.0), 4.0);
        assert_eq!(running_mean(4.0, 1, 7.0), 5.5);
        assert_eq!(running_mean(5.0, 3, 9.0), 6.0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(60), "01:00");
        assert_eq!(format_clock(754), "12:34");
        assert_eq!(format_clock(6000), "100:00");
    }
}
