use orals_core::progress::TimeRange;
use orals_core::session::FeedbackMode;

/// Parse feedback mode from string
pub fn parse_mode(s: &str) -> std::result::Result<FeedbackMode, String> {
    FeedbackMode::parse(s).map_err(|e| e.to_string())
}

/// Parse reporting window from string
pub fn parse_range(s: &str) -> std::result::Result<TimeRange, String> {
    TimeRange::parse(s).map_err(|e| e.to_string())
}

/// Parse a fraction in [0, 1]
pub fn parse_fraction(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is outside 0.0-1.0", value))
    }
}
