// Record builders shared by the unit tests.
use crate::types::{CountyRecord, MonthlyPoint};
use crate::util::percent;

/// County with a consistent care/notification/gap split and two months of
/// history. Demographics are left at zero; tests set what they need.
#[allow(clippy::too_many_arguments)]
pub fn county(
    fips: &str,
    state: &str,
    chapter: &str,
    region: &str,
    division: &str,
    total: u64,
    care: u64,
    gap: u64,
) -> CountyRecord {
    let notification = total - care - gap;
    let (care_a, gap_a, notif_a) = (care / 2, gap / 2, notification / 2);
    let first = MonthlyPoint {
        month: "2024-01".to_string(),
        care: care_a,
        notification: notif_a,
        gap: gap_a,
        total: care_a + notif_a + gap_a,
    };
    let second = MonthlyPoint {
        month: "2024-02".to_string(),
        care: care - care_a,
        notification: notification - notif_a,
        gap: gap - gap_a,
        total: total - first.total,
    };
    CountyRecord {
        fips: fips.to_string(),
        county: format!("County {}", fips),
        state: state.to_string(),
        chapter: chapter.to_string(),
        region: region.to_string(),
        division: division.to_string(),
        total,
        care,
        notification,
        gap,
        care_rate: percent(care, total),
        gap_rate: percent(gap, total),
        monthly: vec![second, first],
        ..Default::default()
    }
}

pub fn with_demographics(
    mut r: CountyRecord,
    population: u64,
    median_income: f64,
    avg_svi: f64,
    station_count: u64,
) -> CountyRecord {
    r.population = population;
    r.households = population / 2;
    r.poverty = population / 10;
    r.median_income = median_income;
    r.median_age = 40.0;
    r.diversity_index = 50.0;
    r.home_value = median_income * 3.0;
    r.avg_svi = avg_svi;
    r.station_count = station_count;
    r
}
