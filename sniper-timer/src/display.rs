//! Readout formatting.

/// Format a millisecond duration as seconds with one decimal place.
///
/// Negative durations render as `0.0`.
pub fn format_seconds(ms: f64) -> String {
    let seconds = ms.max(0.0) / 1000.0;
    format!("{:.1}", seconds)
}
