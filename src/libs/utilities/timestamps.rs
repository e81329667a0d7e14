use chrono::{DateTime, Duration, Local};

/// Converts a Chrono `Duration` into a short human-readable string.
///
/// A bootstrap run takes anywhere from seconds (dry run) to the better part
/// of an hour (full install), so the two largest non-zero units are shown.
///
/// # Examples
/// * 42 seconds -> `"42s"`
/// * 754 seconds -> `"12m 34s"`
/// * 3725 seconds -> `"1h 2m"`
pub fn format_duration(duration: &Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Local wall-clock time formatted for the start/end banner of a run.
pub fn display_timestamp(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_two_largest_units() {
        assert_eq!(format_duration(&Duration::seconds(42)), "42s");
        assert_eq!(format_duration(&Duration::seconds(754)), "12m 34s");
        assert_eq!(format_duration(&Duration::seconds(3725)), "1h 2m");
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        assert_eq!(format_duration(&Duration::seconds(-5)), "0s");
    }
}
