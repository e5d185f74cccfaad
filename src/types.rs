use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One month of fire-response counts, keyed by a zero-padded `YYYY-MM` string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyPoint {
    pub month: String,
    pub care: u64,
    pub notification: u64,
    pub gap: u64,
    pub total: u64,
}

/// A single county as delivered by the data pipeline (`by-county.json`).
///
/// Every numeric field defaults to zero and every string to empty, so sparse
/// rows still deserialize. The engine treats records as read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CountyRecord {
    pub fips: String,
    pub county: String,
    pub state: String,
    pub chapter: String,
    pub region: String,
    pub division: String,
    pub total: u64,
    pub care: u64,
    pub notification: u64,
    pub gap: u64,
    pub care_rate: f64,
    pub gap_rate: f64,
    pub avg_svi: f64,
    pub population: u64,
    pub households: u64,
    pub poverty: u64,
    pub median_income: f64,
    pub median_age: f64,
    pub diversity_index: f64,
    pub home_value: f64,
    pub fires_per_10k: f64,
    pub station_count: u64,
    pub monthly: Vec<MonthlyPoint>,
}

impl CountyRecord {
    /// `"County, ST"`, the name used in reports and county-level rows.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.county, self.state)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgLevel {
    #[default]
    National,
    Division,
    Region,
    Chapter,
    State,
    County,
}

impl fmt::Display for OrgLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgLevel::National => write!(f, "national"),
            OrgLevel::Division => write!(f, "division"),
            OrgLevel::Region => write!(f, "region"),
            OrgLevel::Chapter => write!(f, "chapter"),
            OrgLevel::State => write!(f, "state"),
            OrgLevel::County => write!(f, "county"),
        }
    }
}

/// Rolled-up statistics for a group of counties.
///
/// Rates and demographic averages are rounded before the row is returned:
/// rates, age, diversity, fires per 10k, poverty rate and affordability to one
/// decimal, SVI to three, income and home value to whole numbers. Benchmark
/// fields stay `None` until `benchmarks::inject_benchmarks` fills them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRow {
    pub name: String,
    pub level: OrgLevel,
    pub total: u64,
    pub care: u64,
    pub notification: u64,
    pub gap: u64,
    pub care_rate: f64,
    pub gap_rate: f64,
    pub avg_svi: f64,
    pub population: u64,
    pub households: u64,
    pub poverty: u64,
    pub median_income: f64,
    pub median_age: f64,
    pub diversity_index: f64,
    pub home_value: f64,
    pub fires_per_10k: f64,
    pub poverty_rate: f64,
    pub affordability_ratio: f64,
    pub station_count: u64,
    pub county_count: usize,
    pub monthly: Vec<MonthlyPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_care_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_gap_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_care_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_gap_rate: Option<f64>,
}

impl AggregatedRow {
    /// Share of fires that received a notification only. Never stored; it is
    /// whatever care and gap leave over.
    pub fn notification_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 - self.care_rate - self.gap_rate
    }
}

/// Hierarchy and geography selectors, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub division: Option<String>,
    pub region: Option<String>,
    pub chapter: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SviQuintileBucket {
    pub label: String,
    pub range: (f64, f64),
    pub total: u64,
    pub care: u64,
    pub gap: u64,
    pub care_rate: f64,
    pub gap_rate: f64,
    pub population: u64,
    pub county_count: usize,
}

/// Flattened, display-formatted view of an aggregated row for console previews.
#[derive(Debug, Clone, Tabled)]
pub struct AggregatedPreviewRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Counties")]
    pub county_count: usize,
    #[tabled(rename = "Fires")]
    pub total: String,
    #[tabled(rename = "CareRate")]
    pub care_rate: String,
    #[tabled(rename = "GapRate")]
    pub gap_rate: String,
    #[tabled(rename = "vsParent")]
    pub vs_parent: String,
    #[tabled(rename = "AvgSVI")]
    pub avg_svi: String,
    #[tabled(rename = "Fires/10K")]
    pub fires_per_10k: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct SviPreviewRow {
    #[tabled(rename = "Quintile")]
    pub label: String,
    #[tabled(rename = "Counties")]
    pub county_count: usize,
    #[tabled(rename = "Fires")]
    pub total: String,
    #[tabled(rename = "CareRate")]
    pub care_rate: String,
    #[tabled(rename = "GapRate")]
    pub gap_rate: String,
}
