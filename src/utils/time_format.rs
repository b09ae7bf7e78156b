//! Time display helpers shared by the list and preview views

/// Timestamp cell text: two decimals, `?` when unset
pub fn format_timestamp(time: Option<f64>) -> String {
    match time {
        Some(t) if t.is_finite() => format!("{:.2}", t),
        _ => "?".to_string(),
    }
}

/// Clock text `m:ss`; invalid or negative input shows `0:00`
pub fn format_clock(time: f64) -> String {
    if !time.is_finite() || time <= 0.0 {
        return "0:00".to_string();
    }
    let total = time.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(None), "?");
        assert_eq!(format_timestamp(Some(12.346)), "12.35");
        assert_eq!(format_timestamp(Some(0.0)), "0.00");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(65.9), "1:05");
        assert_eq!(format_clock(f64::NAN), "0:00");
        assert_eq!(format_clock(600.0), "10:00");
    }
}
