use crate::aggregator::aggregate_group;
use crate::filter::selected;
use crate::types::{AggregatedRow, CountyRecord, FilterState, OrgLevel};

/// Copy `rows`, attaching the parent's and the nation's care and gap rates.
/// Nothing is recomputed.
pub fn inject_benchmarks(
    rows: &[AggregatedRow],
    parent: &AggregatedRow,
    national: &AggregatedRow,
) -> Vec<AggregatedRow> {
    rows.iter()
        .map(|row| AggregatedRow {
            parent_care_rate: Some(parent.care_rate),
            parent_gap_rate: Some(parent.gap_rate),
            national_care_rate: Some(national.care_rate),
            national_gap_rate: Some(national.gap_rate),
            ..row.clone()
        })
        .collect()
}

/// Comparison row for a filtered listing: the selected region over the whole
/// dataset, else the selected division, else `national`.
pub fn benchmark_parent(
    records: &[CountyRecord],
    filter: &FilterState,
    national: &AggregatedRow,
) -> AggregatedRow {
    if let Some(region) = selected(&filter.region) {
        let members = records.iter().filter(|r| r.region == region);
        return aggregate_group(region, OrgLevel::Region, members);
    }
    if let Some(division) = selected(&filter.division) {
        let members = records.iter().filter(|r| r.division == division);
        return aggregate_group(division, OrgLevel::Division, members);
    }
    national.clone()
}
