//! `minutes:seconds` durations.
//!
//! Parsing is lenient by contract: anything that is not exactly two
//! `:`-separated fields counts as zero, and a field that is not a number
//! counts as zero too. Nothing here returns an error.

/// Seconds represented by `raw`, `0.0` when it is not in `minutes:seconds` shape.
///
/// Minutes are whole numbers. Seconds may carry a fraction (`"3:45.5"`).
/// A field is read whole or not at all: `"3.5:00"` and `"3abc:10"` have zero
/// minutes, there is no leading-digits salvage.
pub fn parse_seconds(raw: &str) -> f64 {
  let mut fields = raw.split(':');
  let (Some(minutes), Some(seconds), None) = (fields.next(), fields.next(), fields.next()) else {
    return 0.0;
  };

  let minutes = minutes.trim().parse::<u64>().unwrap_or(0) as f64;
  let seconds =
    seconds.trim().parse::<f64>().ok().filter(|s| s.is_finite() && *s >= 0.0).unwrap_or(0.0);

  minutes * 60.0 + seconds
}

/// Formats a total as `minutes:seconds`, seconds zero-padded.
///
/// Rounds to whole seconds here, once, so that fractions accumulated over a
/// whole setlist are not rounded song by song.
pub fn format_seconds(total: f64) -> String {
  let total = if total.is_finite() && total > 0.0 { total.round() as u64 } else { 0 };
  format!("{}:{:02}", total / 60, total % 60)
}

/// Sum of a sequence of optional durations, formatted.
pub fn sum<'a>(durations: impl IntoIterator<Item = Option<&'a str>>) -> String {
  let total: f64 = durations.into_iter().flatten().map(parse_seconds).sum();
  format_seconds(total)
}
