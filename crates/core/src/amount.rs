//! Lenient numeric reading of user-entered amounts.
//!
//! Amounts and budgets are stored as the strings the user typed. Anything
//! that does not read as a finite number counts as zero.

/// Read an amount string as a number; blank or non-numeric input yields `0.0`.
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Whether the string reads as a finite number.
pub fn is_numeric(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Render an amount the way it is shown to the user: integral values
/// without a fractional part.
pub fn format_amount(value: f64) -> String {
    if value == 0.0 {
        // Avoid printing "-0".
        return "0".to_string();
    }
    format!("{value}")
}
