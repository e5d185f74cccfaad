// Social-vulnerability quintiles and the equity-gap comparison between the
// least and most vulnerable communities.
use serde::Serialize;

use crate::types::{CountyRecord, SviQuintileBucket};
use crate::util::{format_int, percent, round_to, safe_div};

/// Fixed bands. Each is closed below and open above, except the last, which
/// also includes 1.0, so every SVI in [0, 1] lands in exactly one band.
pub const SVI_QUINTILES: [(&str, f64, f64); 5] = [
    ("Very Low", 0.0, 0.2),
    ("Low", 0.2, 0.4),
    ("Moderate", 0.4, 0.6),
    ("High", 0.6, 0.8),
    ("Very High", 0.8, 1.0),
];

const SIGNIFICANT_RATIO: f64 = 1.5;
const MODERATE_RATIO: f64 = 1.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityGap {
    pub ratio: f64,
    pub narrative: String,
    pub highest_gap_rate: f64,
    pub lowest_gap_rate: f64,
}

fn in_band(svi: f64, lo: f64, hi: f64) -> bool {
    if hi >= 1.0 {
        svi >= lo && svi <= hi
    } else {
        svi >= lo && svi < hi
    }
}

/// Split records into the five SVI bands. Records outside [0, 1] fall in none.
pub fn bucket_by_svi<'a, I>(records: I) -> Vec<SviQuintileBucket>
where
    I: IntoIterator<Item = &'a CountyRecord>,
{
    let mut buckets: Vec<SviQuintileBucket> = SVI_QUINTILES
        .iter()
        .map(|(label, lo, hi)| SviQuintileBucket {
            label: label.to_string(),
            range: (*lo, *hi),
            total: 0,
            care: 0,
            gap: 0,
            care_rate: 0.0,
            gap_rate: 0.0,
            population: 0,
            county_count: 0,
        })
        .collect();

    for r in records {
        let Some(b) = buckets
            .iter_mut()
            .find(|b| in_band(r.avg_svi, b.range.0, b.range.1))
        else {
            tracing::debug!(fips = %r.fips, svi = r.avg_svi, "svi outside [0, 1], not bucketed");
            continue;
        };
        b.total += r.total;
        b.care += r.care;
        b.gap += r.gap;
        b.population += r.population;
        b.county_count += 1;
    }

    for b in &mut buckets {
        b.care_rate = round_to(percent(b.care, b.total), 1);
        b.gap_rate = round_to(percent(b.gap, b.total), 1);
    }
    buckets
}

/// Compare the gap rate of the most vulnerable non-empty band with the least
/// vulnerable one.
///
/// Fewer than two non-empty bands is not an error: the result has ratio 1 and
/// an "insufficient data" narrative. A zero gap rate in the lowest band gives
/// ratio 0.
pub fn compute_equity_gap(buckets: &[SviQuintileBucket]) -> EquityGap {
    let with_fires: Vec<&SviQuintileBucket> = buckets.iter().filter(|b| b.total > 0).collect();
    let (lowest, highest) = match with_fires.as_slice() {
        [first, .., last] => (*first, *last),
        _ => {
            return EquityGap {
                ratio: 1.0,
                narrative: "Insufficient data for equity analysis.".to_string(),
                highest_gap_rate: 0.0,
                lowest_gap_rate: 0.0,
            }
        }
    };

    let ratio = round_to(safe_div(highest.gap_rate, lowest.gap_rate), 2);
    let narrative = if ratio > SIGNIFICANT_RATIO {
        format!(
            "Highest-vulnerability communities have a {}% gap rate vs {}% in lowest-vulnerability areas, a {}x equity gap. {} counties with {} SVI account for {} missed fires.",
            highest.gap_rate,
            lowest.gap_rate,
            ratio,
            format_int(highest.county_count as u64),
            highest.label,
            format_int(highest.gap),
        )
    } else if ratio > MODERATE_RATIO {
        format!(
            "Moderate equity gap: {}% gap rate in highest-SVI vs {}% in lowest-SVI communities ({}x).",
            highest.gap_rate, lowest.gap_rate, ratio
        )
    } else {
        format!(
            "Gap rates are relatively equitable across SVI quintiles ({}x ratio).",
            ratio
        )
    };

    EquityGap {
        ratio,
        narrative,
        highest_gap_rate: highest.gap_rate,
        lowest_gap_rate: lowest.gap_rate,
    }
}
