// Rollup of county records into organizational rows.
//
// Rates are always recomputed from summed counts; demographic averages are
// weighted by fire count so high-incident counties dominate, except for a
// single-county group, which reports that county's own values. Every ratio is
// zero-guarded and rounded before the row leaves this module.
use std::collections::{BTreeMap, HashMap};

use crate::types::{AggregatedRow, CountyRecord, MonthlyPoint, OrgLevel};
use crate::util::{percent, round_to, safe_div, WeightedMean};

/// Record field a grouped aggregation is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Division,
    Region,
    Chapter,
    State,
    County,
}

impl GroupKey {
    pub fn level(self) -> OrgLevel {
        match self {
            GroupKey::Division => OrgLevel::Division,
            GroupKey::Region => OrgLevel::Region,
            GroupKey::Chapter => OrgLevel::Chapter,
            GroupKey::State => OrgLevel::State,
            GroupKey::County => OrgLevel::County,
        }
    }

    /// Counties group by FIPS code; every other level by its name.
    pub fn value_of(self, r: &CountyRecord) -> &str {
        match self {
            GroupKey::Division => &r.division,
            GroupKey::Region => &r.region,
            GroupKey::Chapter => &r.chapter,
            GroupKey::State => &r.state,
            GroupKey::County => &r.fips,
        }
    }
}

impl std::str::FromStr for GroupKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "division" => Ok(Self::Division),
            "region" => Ok(Self::Region),
            "chapter" => Ok(Self::Chapter),
            "state" => Ok(Self::State),
            "county" => Ok(Self::County),
            other => Err(format!(
                "unsupported group key `{other}` (expected division|region|chapter|state|county)"
            )),
        }
    }
}

/// One row per distinct non-empty key value, in the order keys are first
/// seen. Records with an empty key are left out of the grouping.
pub fn aggregate_by_level<'a, I>(records: I, key: GroupKey) -> Vec<AggregatedRow>
where
    I: IntoIterator<Item = &'a CountyRecord>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&'a CountyRecord>> = Vec::new();
    for r in records {
        let k = key.value_of(r);
        if k.is_empty() {
            continue;
        }
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(r);
    }

    tracing::debug!(?key, groups = groups.len(), "aggregating by level");

    groups
        .into_iter()
        .map(|group| {
            let name = match key {
                GroupKey::County => group[0].display_name(),
                _ => key.value_of(group[0]).to_string(),
            };
            aggregate_group(name, key.level(), group)
        })
        .collect()
}

/// Single national row over every record given.
pub fn aggregate_all<'a, I>(records: I) -> AggregatedRow
where
    I: IntoIterator<Item = &'a CountyRecord>,
{
    aggregate_group("National", OrgLevel::National, records)
}

/// Build one row from an arbitrary group of counties.
pub fn aggregate_group<'a, I>(name: impl Into<String>, level: OrgLevel, records: I) -> AggregatedRow
where
    I: IntoIterator<Item = &'a CountyRecord>,
{
    #[derive(Default)]
    struct Acc {
        total: u64,
        care: u64,
        notification: u64,
        gap: u64,
        population: u64,
        households: u64,
        poverty: u64,
        stations: u64,
        counties: usize,
        income: WeightedMean,
        age: WeightedMean,
        diversity: WeightedMean,
        home: WeightedMean,
        svi: WeightedMean,
        // BTreeMap keeps months in lexical order, which for zero-padded
        // `YYYY-MM` keys is chronological.
        monthly: BTreeMap<String, MonthlyPoint>,
    }

    let mut acc = Acc::default();
    let mut sole: Option<&CountyRecord> = None;
    for r in records {
        acc.counties += 1;
        sole = if acc.counties == 1 { Some(r) } else { None };
        acc.total += r.total;
        acc.care += r.care;
        acc.notification += r.notification;
        acc.gap += r.gap;
        acc.population += r.population;
        acc.households += r.households;
        acc.poverty += r.poverty;
        acc.stations += r.station_count;

        let weight = r.total as f64;
        if r.median_income > 0.0 {
            acc.income.add(r.median_income, weight);
        }
        if r.median_age > 0.0 {
            acc.age.add(r.median_age, weight);
        }
        if r.diversity_index > 0.0 {
            acc.diversity.add(r.diversity_index, weight);
        }
        if r.home_value > 0.0 {
            acc.home.add(r.home_value, weight);
        }
        if r.avg_svi > 0.0 && r.total > 0 {
            acc.svi.add(r.avg_svi, weight);
        }

        for m in &r.monthly {
            let e = acc.monthly.entry(m.month.clone()).or_insert_with(|| MonthlyPoint {
                month: m.month.clone(),
                ..Default::default()
            });
            e.care += m.care;
            e.notification += m.notification;
            e.gap += m.gap;
            e.total += m.total;
        }
    }

    // A lone county keeps its own profile, zero-fire counties included.
    let (income, age, diversity, home, svi) = match sole {
        Some(r) => (r.median_income, r.median_age, r.diversity_index, r.home_value, r.avg_svi),
        None => (
            acc.income.value(),
            acc.age.value(),
            acc.diversity.value(),
            acc.home.value(),
            acc.svi.value(),
        ),
    };

    AggregatedRow {
        name: name.into(),
        level,
        total: acc.total,
        care: acc.care,
        notification: acc.notification,
        gap: acc.gap,
        care_rate: round_to(percent(acc.care, acc.total), 1),
        gap_rate: round_to(percent(acc.gap, acc.total), 1),
        avg_svi: round_to(svi, 3),
        population: acc.population,
        households: acc.households,
        poverty: acc.poverty,
        median_income: income.round(),
        median_age: round_to(age, 1),
        diversity_index: round_to(diversity, 1),
        home_value: home.round(),
        fires_per_10k: round_to(safe_div(acc.total as f64 * 10_000.0, acc.population as f64), 1),
        poverty_rate: round_to(percent(acc.poverty, acc.population), 1),
        affordability_ratio: round_to(safe_div(home, income), 1),
        station_count: acc.stations,
        county_count: acc.counties,
        monthly: acc.monthly.into_values().collect(),
        ..Default::default()
    }
}
