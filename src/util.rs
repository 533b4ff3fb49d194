// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" cell handling so the rest of the
// code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Return the trimmed cell text, or `None` when the cell is absent or blank.
pub fn present(s: Option<&str>) -> Option<&str> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Parse a price-like cell such as `$1,250.00`.
///
/// - Strips one leading currency symbol (any non-numeric first character).
/// - Strips thousands separators.
/// - Accepts text that is already plain numeric, so normalized output can be
///   parsed again.
/// - Returns `None` for anything that is not a finite, non-negative amount.
pub fn parse_currency(s: &str) -> Option<f64> {
    let s = s.trim();
    let mut chars = s.chars();
    let first = chars.next()?;
    let rest = if first.is_ascii_digit() || matches!(first, '.' | '-' | '+') {
        s
    } else {
        chars.as_str()
    };
    let rest = rest.trim_start().replace(',', "");
    let value = parse_f64_safe(Some(&rest))?;
    if value < 0.0 {
        return None;
    }
    Some(value)
}

/// Parse a string-like value into `f64` while being forgiving about
/// surrounding whitespace.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Rejects values that contain alphabetic characters (so no `NaN`/`inf`).
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = present(s)?;
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.parse::<f64>().ok()
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = present(s)?;
    s.parse::<i32>().ok()
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Round half away from zero to `places` decimals.
pub fn round_to(v: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (v * factor).round() / factor
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale thousands separators (e.g. `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_percent(n: f64) -> String {
    format!("{}%", format_number(n, 2))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
