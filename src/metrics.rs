use serde::{Deserialize, Serialize};

use crate::util::{round_to, safe_div};

/// How a count is expressed for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricMode {
    #[default]
    Raw,
    PerCapita,
    PerHousehold,
}

impl std::str::FromStr for MetricMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "raw" => Ok(Self::Raw),
            "perCapita" => Ok(Self::PerCapita),
            "perHousehold" => Ok(Self::PerHousehold),
            other => Err(format!(
                "unsupported metric mode `{other}` (expected raw|perCapita|perHousehold)"
            )),
        }
    }
}

/// Re-express a count under `mode`. Per-capita and per-household values are
/// per 10,000 and rounded to two decimals; a zero base gives 0. Rates should
/// not be passed through here.
pub fn apply_metric_mode(value: f64, population: u64, households: u64, mode: MetricMode) -> f64 {
    match mode {
        MetricMode::Raw => value,
        MetricMode::PerCapita => round_to(safe_div(value * 10_000.0, population as f64), 2),
        MetricMode::PerHousehold => round_to(safe_div(value * 10_000.0, households as f64), 2),
    }
}

/// Column-header suffix for a mode.
pub fn metric_mode_label(mode: MetricMode) -> &'static str {
    match mode {
        MetricMode::Raw => "",
        MetricMode::PerCapita => " per 10K pop",
        MetricMode::PerHousehold => " per 10K HH",
    }
}
