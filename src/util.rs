// Numeric and formatting helpers shared by the aggregation modules.
//
// Every ratio in the engine goes through `safe_div`, so a zero denominator
// produces 0 instead of NaN or infinity. Sparse filtered views depend on that.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Lenient numeric cell parse for spreadsheet exports: blank or
/// alphabetic cells ("N/A", "-") give `None`, and thousands separators are
/// ignored.
pub fn parse_f64_safe(cell: Option<&str>) -> Option<f64> {
    let raw = cell?.trim();
    if raw.is_empty() || raw.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    raw.replace(',', "").parse().ok()
}

/// Counts may arrive as `"1,204"` or `"1204.0"`; anything negative or
/// fractional is rejected.
pub fn parse_u64_safe(s: Option<&str>) -> Option<u64> {
    let v = parse_f64_safe(s)?;
    if v < 0.0 || v.fract() != 0.0 {
        return None;
    }
    Some(v as u64)
}

/// Validate a `YYYY-MM` month key.
pub fn parse_month_key(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").ok()
}

/// `"2024-01"` → `"Jan"`. Unparseable keys are returned unchanged.
pub fn format_month(key: &str) -> String {
    match parse_month_key(key) {
        Some(d) => d.format("%b").to_string(),
        None => key.to_string(),
    }
}

/// `numerator / denominator`, or 0 when the denominator is zero.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let v = numerator / denominator;
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Percentage of `part` in `whole`, zero-guarded.
pub fn percent(part: u64, whole: u64) -> f64 {
    safe_div(part as f64 * 100.0, whole as f64)
}

/// Round half away from zero to a fixed number of decimal places.
pub fn round_to(v: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (v * factor).round() / factor
}

/// Running `Σ(value × weight) / Σ(weight)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedMean {
    sum: f64,
    weight: f64,
}

impl WeightedMean {
    pub fn add(&mut self, value: f64, weight: f64) {
        self.sum += value * weight;
        self.weight += weight;
    }

    pub fn value(&self) -> f64 {
        safe_div(self.sum, self.weight)
    }
}

/// Fixed decimals with `en` thousands separators, e.g. `1,234.50`.
pub fn format_number(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (whole, frac) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = whole
        .parse::<u64>()
        .map(|w| w.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| whole.to_string());
    let sign = if n < 0.0 && fixed.chars().any(|c| ('1'..='9').contains(&c)) { "-" } else { "" };
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// `+2.3` / `-1.5`, used for benchmark deltas in previews.
pub fn format_delta(n: f64) -> String {
    let sign = if n >= 0.0 { "+" } else { "" };
    format!("{}{:.1}", sign, n)
}
