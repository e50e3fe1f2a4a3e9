//! Cell parsing for listing columns.
//!
//! Every parser returns `None` rather than an error: a bad cell makes that
//! one field missing and never rejects the row.

/// Parses a latitude or longitude in decimal degrees. Returns `None` if
/// empty, unparseable, or non-finite. Zero is a valid coordinate.
#[must_use]
pub fn parse_degrees(s: &str) -> Option<f64> {
    let value = s.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Parses a non-negative amount (price, area). Tolerates a leading `$` and
/// surrounding whitespace.
#[must_use]
pub fn parse_amount(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    let value = trimmed.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Parses a non-negative integer count. Integral floats such as `"3.0"` are
/// accepted since spreadsheet exports often write counts that way.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_count(s: &str) -> Option<u32> {
    let trimmed = s.trim();
    if let Ok(value) = trimmed.parse::<u32>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX)
    {
        Some(value as u32)
    } else {
        None
    }
}

/// Returns the trimmed text, or `None` if empty.
#[must_use]
pub fn parse_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
