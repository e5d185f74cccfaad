use flare_engine::{CountyRecord, MonthlyPoint};

pub struct CountyShape {
    pub fips: &'static str,
    pub state: &'static str,
    pub chapter: &'static str,
    pub region: &'static str,
    pub division: &'static str,
    pub care: u64,
    pub notification: u64,
    pub gap: u64,
    pub svi: f64,
    pub population: u64,
    pub stations: u64,
}

pub fn record(s: &CountyShape) -> CountyRecord {
    let total = s.care + s.notification + s.gap;
    let months = ["2024-03", "2024-01", "2024-02"];
    let monthly = months
        .iter()
        .enumerate()
        .map(|(i, m)| {
            // First month takes the remainder so every category still sums.
            let share = |v: u64| if i == 0 { v - 2 * (v / 3) } else { v / 3 };
            let (care, notification, gap) = (share(s.care), share(s.notification), share(s.gap));
            MonthlyPoint {
                month: m.to_string(),
                care,
                notification,
                gap,
                total: care + notification + gap,
            }
        })
        .collect();
    CountyRecord {
        fips: s.fips.to_string(),
        county: format!("County{}", s.fips),
        state: s.state.to_string(),
        chapter: s.chapter.to_string(),
        region: s.region.to_string(),
        division: s.division.to_string(),
        total,
        care: s.care,
        notification: s.notification,
        gap: s.gap,
        care_rate: if total > 0 { s.care as f64 * 100.0 / total as f64 } else { 0.0 },
        gap_rate: if total > 0 { s.gap as f64 * 100.0 / total as f64 } else { 0.0 },
        avg_svi: s.svi,
        population: s.population,
        households: s.population / 3,
        poverty: s.population / 8,
        median_income: if s.population > 0 { 55_000.0 } else { 0.0 },
        median_age: 38.5,
        diversity_index: 42.0,
        home_value: 180_000.0,
        fires_per_10k: 0.0,
        station_count: s.stations,
        monthly,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn county(
    fips: &'static str,
    state: &'static str,
    chapter: &'static str,
    region: &'static str,
    division: &'static str,
    care: u64,
    notification: u64,
    gap: u64,
    svi: f64,
    population: u64,
    stations: u64,
) -> CountyRecord {
    record(&CountyShape { fips, state, chapter, region, division, care, notification, gap, svi, population, stations })
}

/// Two divisions, four regions, seven chapters, twelve counties.
pub fn national_dataset() -> Vec<CountyRecord> {
    vec![
        county("01001", "AL", "Central Alabama", "Alabama", "Southeast", 120, 60, 40, 0.62, 58_000, 6),
        county("01003", "AL", "Central Alabama", "Alabama", "Southeast", 30, 20, 30, 0.81, 0, 0),
        county("01005", "AL", "South Alabama", "Alabama", "Southeast", 90, 40, 70, 0.77, 24_000, 3),
        county("13001", "GA", "North Georgia", "Georgia", "Southeast", 150, 50, 20, 0.35, 110_000, 11),
        county("13003", "GA", "North Georgia", "Georgia", "Southeast", 40, 10, 10, 0.18, 16_000, 2),
        county("13005", "GA", "Coastal Georgia", "Georgia", "Southeast", 80, 40, 60, 0.55, 41_000, 4),
        county("06001", "CA", "Bay Area", "Northern California", "Pacific", 400, 150, 50, 0.22, 1_600_000, 40),
        county("06003", "CA", "Gold Country", "Northern California", "Pacific", 70, 30, 20, 0.41, 12_000, 3),
        county("06005", "CA", "Gold Country", "Northern California", "Pacific", 60, 20, 30, 0.48, 38_000, 0),
        county("41001", "OR", "Cascades", "Oregon", "Pacific", 110, 60, 30, 0.27, 16_000, 5),
        county("41003", "OR", "Cascades", "Oregon", "Pacific", 0, 0, 0, 0.0, 0, 0),
        county("53001", "WA", "", "", "Pacific", 25, 10, 5, 1.0, 19_000, 1),
    ]
}
