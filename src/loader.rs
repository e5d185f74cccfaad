use crate::types::CountyRecord;
use crate::util::{parse_f64_safe, parse_month_key, parse_u64_safe, percent, round_to, safe_div};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON in `{path}`: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("invalid CSV in `{path}`: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("unsupported file extension for `{0}` (expected .json or .csv)")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    /// Records kept despite counts that do not partition `total`, rates above
    /// 100% combined, or malformed month keys.
    pub invariant_warnings: usize,
}

/// Flat CSV export of the county table. No monthly series.
#[derive(Debug, Deserialize)]
struct RawCsvRow {
    fips: Option<String>,
    county: Option<String>,
    state: Option<String>,
    chapter: Option<String>,
    region: Option<String>,
    division: Option<String>,
    total: Option<String>,
    care: Option<String>,
    notification: Option<String>,
    gap: Option<String>,
    #[serde(rename = "avgSvi")]
    avg_svi: Option<String>,
    population: Option<String>,
    households: Option<String>,
    poverty: Option<String>,
    #[serde(rename = "medianIncome")]
    median_income: Option<String>,
    #[serde(rename = "medianAge")]
    median_age: Option<String>,
    #[serde(rename = "diversityIndex")]
    diversity_index: Option<String>,
    #[serde(rename = "homeValue")]
    home_value: Option<String>,
    #[serde(rename = "stationCount")]
    station_count: Option<String>,
}

/// Load a county table, dispatching on the file extension.
pub fn load_records(path: &Path) -> Result<(Vec<CountyRecord>, LoadReport), LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let (records, mut report) = match ext.as_deref() {
        Some("json") => load_json(path)?,
        Some("csv") => load_csv(path)?,
        _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    };

    report.invariant_warnings = records.iter().filter(|r| !check_invariants(r)).count();
    if report.invariant_warnings > 0 {
        tracing::warn!(
            count = report.invariant_warnings,
            "records violate count or rate invariants"
        );
    }
    tracing::info!(
        path = %path.display(),
        loaded = report.loaded_rows,
        skipped = report.parse_errors,
        "county table loaded"
    );
    Ok((records, report))
}

fn load_json(path: &Path) -> Result<(Vec<CountyRecord>, LoadReport), LoadError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let records: Vec<CountyRecord> = serde_json::from_str(&text)
        .map_err(|source| LoadError::Json { path: path.to_path_buf(), source })?;
    let report = LoadReport {
        total_rows: records.len(),
        loaded_rows: records.len(),
        ..Default::default()
    };
    Ok((records, report))
}

fn load_csv(path: &Path) -> Result<(Vec<CountyRecord>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Csv { path: path.to_path_buf(), source })?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawCsvRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };
        let fips = row.fips.unwrap_or_default().trim().to_string();
        if fips.is_empty() {
            parse_errors += 1;
            continue;
        }
        let (Some(total), Some(care), Some(notification), Some(gap)) = (
            parse_u64_safe(row.total.as_deref()),
            parse_u64_safe(row.care.as_deref()),
            parse_u64_safe(row.notification.as_deref()),
            parse_u64_safe(row.gap.as_deref()),
        ) else {
            parse_errors += 1;
            continue;
        };

        let text = |v: Option<String>| v.unwrap_or_default().trim().to_string();
        let count = |v: Option<String>| parse_u64_safe(v.as_deref()).unwrap_or(0);
        let number = |v: Option<String>| parse_f64_safe(v.as_deref()).unwrap_or(0.0);
        let population = count(row.population);

        records.push(CountyRecord {
            fips,
            county: text(row.county),
            state: text(row.state),
            chapter: text(row.chapter),
            region: text(row.region),
            division: text(row.division),
            total,
            care,
            notification,
            gap,
            care_rate: percent(care, total),
            gap_rate: percent(gap, total),
            avg_svi: number(row.avg_svi),
            population,
            households: count(row.households),
            poverty: count(row.poverty),
            median_income: number(row.median_income),
            median_age: number(row.median_age),
            diversity_index: number(row.diversity_index),
            home_value: number(row.home_value),
            fires_per_10k: round_to(safe_div(total as f64 * 10_000.0, population as f64), 1),
            station_count: count(row.station_count),
            monthly: Vec::new(),
        });
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        parse_errors,
        invariant_warnings: 0,
    };
    Ok((records, report))
}

/// `true` when the record's counts partition its total, its rates leave room
/// for notifications, its SVI is in [0, 1] and every monthly entry is well
/// formed.
pub fn check_invariants(r: &CountyRecord) -> bool {
    let counts_ok = r.care + r.notification + r.gap == r.total;
    let rates_ok = r.care_rate + r.gap_rate <= 100.0 + 1e-6 && (0.0..=1.0).contains(&r.avg_svi);
    let monthly_ok = r
        .monthly
        .iter()
        .all(|m| m.care + m.notification + m.gap == m.total && parse_month_key(&m.month).is_some());
    if !(counts_ok && rates_ok && monthly_ok) {
        tracing::debug!(fips = %r.fips, counts_ok, rates_ok, monthly_ok, "invariant violation");
    }
    counts_ok && rates_ok && monthly_ok
}
