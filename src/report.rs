// Entity reports: one self-contained package per chapter or county, with
// national and parent benchmarks, SVI equity breakdown, peers and a templated
// executive summary.
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

use crate::aggregator::{aggregate_all, aggregate_by_level, aggregate_group, GroupKey};
use crate::config::ReportConfig;
use crate::error::{EngineError, Result};
use crate::svi::{bucket_by_svi, compute_equity_gap};
use crate::types::{AggregatedRow, CountyRecord, MonthlyPoint, OrgLevel, SviQuintileBucket};
use crate::util::{format_int, round_to, safe_div};

/// Compact view of an aggregated row used for benchmarks and peers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerEntity {
    pub name: String,
    pub total: u64,
    pub care_rate: f64,
    pub gap_rate: f64,
    pub avg_svi: f64,
    pub population: u64,
    pub fires_per_10k: f64,
    pub poverty_rate: f64,
    pub median_income: f64,
    pub station_count: u64,
}

impl From<&AggregatedRow> for PeerEntity {
    fn from(row: &AggregatedRow) -> Self {
        PeerEntity {
            name: row.name.clone(),
            total: row.total,
            care_rate: row.care_rate,
            gap_rate: row.gap_rate,
            avg_svi: row.avg_svi,
            population: row.population,
            fires_per_10k: row.fires_per_10k,
            poverty_rate: row.poverty_rate,
            median_income: row.median_income,
            station_count: row.station_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyLine {
    pub name: String,
    pub fips: String,
    pub total: u64,
    pub care_rate: f64,
    pub gap_rate: f64,
    pub station_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub entity_name: String,
    pub entity_level: OrgLevel,
    pub data_date: String,
    /// Left empty by the engine so identical inputs give identical reports;
    /// hosts stamp it with [`ReportData::stamped`].
    pub generated_on: Option<NaiveDate>,

    pub chapter: Option<String>,
    pub region: Option<String>,
    pub division: Option<String>,
    pub state: Option<String>,

    pub total: u64,
    pub care: u64,
    pub notification: u64,
    pub gap: u64,
    pub care_rate: f64,
    pub gap_rate: f64,
    pub avg_svi: f64,
    pub fires_per_10k: f64,

    pub population: u64,
    pub households: u64,
    pub median_income: f64,
    pub poverty_rate: f64,
    pub home_value: f64,
    pub median_age: f64,
    pub diversity_index: f64,
    pub affordability_ratio: f64,

    pub station_count: u64,
    pub fires_per_station: f64,

    pub monthly: Vec<MonthlyPoint>,

    pub quintiles: Vec<SviQuintileBucket>,
    pub equity_narrative: String,
    pub equity_gap: f64,

    pub county_count: usize,
    pub counties: Vec<CountyLine>,

    pub national: PeerEntity,
    pub parent: Option<PeerEntity>,
    pub parent_level: Option<OrgLevel>,
    pub peers: Vec<PeerEntity>,

    /// Counties with zero population, i.e. no census match.
    pub missing_demographics: usize,
    pub missing_stations: usize,

    pub summary: String,
}

impl ReportData {
    pub fn stamped(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }
}

pub fn build_chapter_report(chapter: &str, records: &[CountyRecord]) -> Result<ReportData> {
    build_chapter_report_with(chapter, records, &ReportConfig::default())
}

pub fn build_chapter_report_with(
    chapter: &str,
    records: &[CountyRecord],
    config: &ReportConfig,
) -> Result<ReportData> {
    let members: Vec<&CountyRecord> = records.iter().filter(|r| r.chapter == chapter).collect();
    let Some(first) = members.first().copied() else {
        return Err(EngineError::not_found(OrgLevel::Chapter, chapter));
    };

    let row = aggregate_group(chapter, OrgLevel::Chapter, members.iter().copied());
    let parent = non_empty(&first.region).map(|region| {
        let in_region = records.iter().filter(|r| r.region == region);
        aggregate_group(region.clone(), OrgLevel::Region, in_region)
    });
    let others = records.iter().filter(|r| r.chapter != chapter);
    let peers = select_peers(&aggregate_by_level(others, GroupKey::Chapter), row.total, config);

    let context = EntityContext {
        level: OrgLevel::Chapter,
        chapter: Some(chapter.to_string()),
        region: non_empty(&first.region),
        division: non_empty(&first.division),
        state: None,
        parent,
        parent_level: OrgLevel::Region,
        peers,
    };
    let report = assemble(row, &members, records, context, config);
    tracing::debug!(chapter, counties = report.county_count, peers = report.peers.len(), "assembled chapter report");
    Ok(report)
}

pub fn build_county_report(fips: &str, records: &[CountyRecord]) -> Result<ReportData> {
    build_county_report_with(fips, records, &ReportConfig::default())
}

pub fn build_county_report_with(
    fips: &str,
    records: &[CountyRecord],
    config: &ReportConfig,
) -> Result<ReportData> {
    let Some(county) = records.iter().find(|r| r.fips == fips) else {
        return Err(EngineError::not_found(OrgLevel::County, fips));
    };
    let name = county.display_name();

    let row = aggregate_group(name.clone(), OrgLevel::County, [county]);
    let parent = non_empty(&county.chapter).map(|chapter| {
        let in_chapter = records.iter().filter(|r| r.chapter == chapter);
        aggregate_group(chapter.clone(), OrgLevel::Chapter, in_chapter)
    });
    // Display names can collide, so the focal county is dropped by FIPS.
    let others = records.iter().filter(|r| r.fips != fips);
    let peers = select_peers(&aggregate_by_level(others, GroupKey::County), row.total, config);

    let context = EntityContext {
        level: OrgLevel::County,
        chapter: non_empty(&county.chapter),
        region: non_empty(&county.region),
        division: non_empty(&county.division),
        state: non_empty(&county.state),
        parent,
        parent_level: OrgLevel::Chapter,
        peers,
    };
    let report = assemble(row, &[county], records, context, config);
    tracing::debug!(fips, peers = report.peers.len(), "assembled county report");
    Ok(report)
}

struct EntityContext {
    level: OrgLevel,
    chapter: Option<String>,
    region: Option<String>,
    division: Option<String>,
    state: Option<String>,
    parent: Option<AggregatedRow>,
    parent_level: OrgLevel,
    peers: Vec<PeerEntity>,
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn assemble(
    row: AggregatedRow,
    members: &[&CountyRecord],
    all: &[CountyRecord],
    ctx: EntityContext,
    config: &ReportConfig,
) -> ReportData {
    let national = aggregate_all(all);
    let quintiles = bucket_by_svi(members.iter().copied());
    let equity = compute_equity_gap(&quintiles);

    let mut counties: Vec<CountyLine> = members
        .iter()
        .map(|c| CountyLine {
            name: c.display_name(),
            fips: c.fips.clone(),
            total: c.total,
            care_rate: c.care_rate,
            gap_rate: c.gap_rate,
            station_count: c.station_count,
        })
        .collect();
    counties.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.fips.cmp(&b.fips)));

    let parent_level = ctx.parent.as_ref().map(|_| ctx.parent_level);
    let mut report = ReportData {
        entity_name: row.name.clone(),
        entity_level: ctx.level,
        data_date: config.data_date.clone(),
        generated_on: None,
        chapter: ctx.chapter,
        region: ctx.region,
        division: ctx.division,
        state: ctx.state,
        total: row.total,
        care: row.care,
        notification: row.notification,
        gap: row.gap,
        care_rate: row.care_rate,
        gap_rate: row.gap_rate,
        avg_svi: row.avg_svi,
        fires_per_10k: row.fires_per_10k,
        population: row.population,
        households: row.households,
        median_income: row.median_income,
        poverty_rate: row.poverty_rate,
        home_value: row.home_value,
        median_age: row.median_age,
        diversity_index: row.diversity_index,
        affordability_ratio: row.affordability_ratio,
        station_count: row.station_count,
        fires_per_station: round_to(safe_div(row.total as f64, row.station_count as f64), 1),
        monthly: row.monthly,
        quintiles,
        equity_narrative: equity.narrative,
        equity_gap: equity.ratio,
        county_count: members.len(),
        counties,
        national: PeerEntity::from(&national),
        parent: ctx.parent.as_ref().map(PeerEntity::from),
        parent_level,
        peers: ctx.peers,
        missing_demographics: members.iter().filter(|c| c.population == 0).count(),
        missing_stations: members.iter().filter(|c| c.station_count == 0).count(),
        summary: String::new(),
    };
    report.summary = generate_summary_with(&report, config.benchmark_band);
    report
}

/// Rows whose total lies within the configured band around the focal total,
/// closest first, ties by name. `candidates` must already leave out the focal
/// entity.
pub fn select_peers(
    candidates: &[AggregatedRow],
    focal_total: u64,
    config: &ReportConfig,
) -> Vec<PeerEntity> {
    let focal = focal_total as f64;
    let lo = focal * config.peer_band_low;
    let hi = focal * config.peer_band_high;
    let mut in_band: Vec<&AggregatedRow> = candidates
        .iter()
        .filter(|r| {
            let t = r.total as f64;
            t >= lo && t <= hi
        })
        .collect();
    in_band.sort_by(|a, b| {
        let da = (a.total as f64 - focal).abs();
        let db = (b.total as f64 - focal).abs();
        da.partial_cmp(&db)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    in_band
        .into_iter()
        .take(config.peer_limit)
        .map(PeerEntity::from)
        .collect()
}

/// Three-way comparison against a benchmark with a symmetric tolerance.
fn relative_to(value: f64, benchmark: f64, band: f64) -> &'static str {
    let diff = value - benchmark;
    if diff > band {
        "above"
    } else if diff < -band {
        "below"
    } else {
        "near"
    }
}

fn svi_class(svi: f64) -> &'static str {
    if svi > 0.6 {
        "high"
    } else if svi > 0.4 {
        "moderate"
    } else {
        "low"
    }
}

pub fn generate_summary(report: &ReportData) -> String {
    generate_summary_with(report, ReportConfig::default().benchmark_band)
}

pub fn generate_summary_with(report: &ReportData, band: f64) -> String {
    let national = &report.national;
    let mut s = format!(
        "{} experienced {} residential fire events during {}, serving a population of {}. ",
        report.entity_name,
        format_int(report.total),
        report.data_date,
        format_int(report.population),
    );
    s.push_str(&format!(
        "The care rate of {:.1}% is {} the national average ({:.1}%), ",
        report.care_rate,
        relative_to(report.care_rate, national.care_rate, band),
        national.care_rate,
    ));
    s.push_str(&format!(
        "while the gap rate of {:.1}% is {} the national average ({:.1}%). ",
        report.gap_rate,
        relative_to(report.gap_rate, national.gap_rate, band),
        national.gap_rate,
    ));
    s.push_str(&format!(
        "The area has {} social vulnerability (SVI: {:.2}). ",
        svi_class(report.avg_svi),
        report.avg_svi,
    ));
    if report.median_income > 0.0 && report.median_income < national.median_income * 0.8 {
        s.push_str(&format!(
            "The median income of ${} is below the national average, indicating communities with elevated need. ",
            format_int(report.median_income as u64),
        ));
    }
    if report.station_count > 0 {
        s.push_str(&format!(
            "The area is served by {} fire stations ({} fires per station). ",
            format_int(report.station_count),
            report.fires_per_station,
        ));
    }
    s.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{county, with_demographics};

    fn dataset() -> Vec<CountyRecord> {
        vec![
            with_demographics(county("01001", "AL", "Alabama Central", "Alabama", "Southeast", 100, 60, 10), 50_000, 30_000.0, 0.7, 4),
            with_demographics(county("01003", "AL", "Alabama Central", "Alabama", "Southeast", 20, 10, 5), 0, 0.0, 0.1, 0),
            with_demographics(county("01005", "AL", "Alabama South", "Alabama", "Southeast", 110, 50, 30), 40_000, 60_000.0, 0.5, 2),
            with_demographics(county("13001", "GA", "Georgia North", "Georgia", "Southeast", 90, 30, 40), 60_000, 70_000.0, 0.3, 3),
            with_demographics(county("06001", "CA", "Bay Area", "Northern California", "Pacific", 400, 300, 20), 900_000, 120_000.0, 0.2, 30),
            with_demographics(county("06003", "CA", "Sierra", "Northern California", "Pacific", 125, 70, 20), 80_000, 80_000.0, 0.4, 5),
            with_demographics(county("06005", "CA", "Delta", "Northern California", "Pacific", 59, 20, 20), 30_000, 65_000.0, 0.6, 2),
        ]
    }

    #[test]
    fn unknown_chapter_is_not_found() {
        let err = build_chapter_report("NonExistentChapter", &dataset()).unwrap_err();
        assert_eq!(err.entity_id(), "NonExistentChapter");
        assert!(matches!(err, EngineError::NotFound { level: OrgLevel::Chapter, .. }));
    }

    #[test]
    fn unknown_county_is_not_found() {
        let err = build_county_report("99999", &dataset()).unwrap_err();
        assert_eq!(err, EngineError::not_found(OrgLevel::County, "99999"));
    }

    #[test]
    fn chapter_report_combines_entity_parent_and_national() {
        let records = dataset();
        let report = build_chapter_report("Alabama Central", &records).expect("report");
        assert_eq!(report.entity_level, OrgLevel::Chapter);
        assert_eq!(report.total, 120);
        assert_eq!(report.care, 70);
        assert_eq!(report.care_rate, 58.3);
        assert_eq!(report.county_count, 2);
        assert_eq!(report.region.as_deref(), Some("Alabama"));
        assert_eq!(report.division.as_deref(), Some("Southeast"));
        assert_eq!(report.parent_level, Some(OrgLevel::Region));
        let parent = report.parent.as_ref().expect("parent");
        assert_eq!(parent.name, "Alabama");
        assert_eq!(parent.total, 230);
        assert_eq!(report.national.total, 904);
        assert_eq!(report.station_count, 4);
        assert_eq!(report.fires_per_station, 30.0);
        assert_eq!(report.missing_demographics, 1);
        assert_eq!(report.missing_stations, 1);
        assert_eq!(report.counties[0].fips, "01001");
        assert_eq!(report.quintiles.iter().map(|q| q.county_count).sum::<usize>(), 2);
        assert!(report.generated_on.is_none());
    }

    #[test]
    fn chapter_peers_are_bounded_sorted_and_exclude_focal() {
        let report = build_chapter_report("Alabama Central", &dataset()).expect("report");
        let names: Vec<&str> = report.peers.iter().map(|p| p.name.as_str()).collect();
        // 120 focal: Sierra 125 (5), Alabama South 110 (10), Georgia North 90 (30), Delta 59 excluded.
        assert_eq!(names, vec!["Sierra", "Alabama South", "Georgia North"]);
        for p in &report.peers {
            assert!(p.total as f64 >= 60.0 && p.total as f64 <= 180.0);
            assert_ne!(p.name, "Alabama Central");
        }
    }

    #[test]
    fn peer_limit_truncates() {
        let rows: Vec<AggregatedRow> = (0..10)
            .map(|i| AggregatedRow { name: format!("C{i}"), total: 100 + i, ..Default::default() })
            .collect();
        let peers = select_peers(&rows[1..], 100, &ReportConfig::default());
        let names: Vec<&str> = peers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C1", "C2", "C3", "C4", "C5"]);
    }

    #[test]
    fn county_report_uses_chapter_as_parent() {
        let records = dataset();
        let report = build_county_report("06003", &records).expect("report");
        assert_eq!(report.entity_name, "County 06003, CA");
        assert_eq!(report.entity_level, OrgLevel::County);
        assert_eq!(report.state.as_deref(), Some("CA"));
        assert_eq!(report.county_count, 1);
        assert_eq!(report.parent_level, Some(OrgLevel::Chapter));
        assert_eq!(report.parent.as_ref().map(|p| p.name.as_str()), Some("Sierra"));
        assert_eq!(report.care_rate, 56.0);
        assert!(report.peers.iter().all(|p| p.name != report.entity_name));
        assert!(report.peers.iter().all(|p| (63..=187).contains(&p.total)));
        assert_eq!(report.equity_gap, 1.0);
    }

    #[test]
    fn county_without_chapter_has_no_parent() {
        let mut records = dataset();
        records[6].chapter.clear();
        let report = build_county_report("06005", &records).expect("report");
        assert!(report.parent.is_none());
        assert!(report.parent_level.is_none());
        assert!(report.chapter.is_none());
    }

    #[test]
    fn zero_fire_county_keeps_demographics_in_report() {
        let mut records = dataset();
        records.push(with_demographics(
            county("01009", "AL", "Alabama South", "Alabama", "Southeast", 0, 0, 0),
            20_000,
            30_000.0,
            0.9,
            1,
        ));
        let report = build_county_report("01009", &records).expect("report");
        assert_eq!(report.total, 0);
        assert_eq!(report.avg_svi, 0.9);
        assert_eq!(report.median_income, 30_000.0);
        assert_eq!(report.median_age, 40.0);
        assert_eq!(report.affordability_ratio, 3.0);
        assert!(report.summary.contains("high social vulnerability (SVI: 0.90)"));
        assert!(report.summary.contains("median income of $30,000 is below the national average"));
        assert!(report.peers.is_empty());
    }

    #[test]
    fn county_peers_survive_duplicate_display_names() {
        let mut records = dataset();
        let mut twin = county("01011", "AL", "Alabama South", "Alabama", "Southeast", 100, 50, 20);
        twin.county = records[0].county.clone();
        records.push(twin);
        let report = build_county_report("01001", &records).expect("report");
        assert_eq!(report.entity_name, "County 01001, AL");
        let twins: Vec<&PeerEntity> = report.peers.iter().filter(|p| p.name == report.entity_name).collect();
        assert_eq!(twins.len(), 1);
        assert_eq!(twins[0].total, 100);
    }

    #[test]
    fn reports_are_deterministic() {
        let records = dataset();
        let a = serde_json::to_string(&build_chapter_report("Sierra", &records).expect("a")).expect("json");
        let b = serde_json::to_string(&build_chapter_report("Sierra", &records).expect("b")).expect("json");
        assert_eq!(a, b);
    }

    #[test]
    fn summary_classifies_against_national() {
        let records = dataset();
        let report = build_chapter_report("Georgia North", &records).expect("report");
        // national care 540/904 = 59.7, gap 145/904 = 16.0
        assert_eq!(report.national.care_rate, 59.7);
        assert_eq!(report.national.gap_rate, 16.0);
        assert!(report.summary.starts_with("Georgia North experienced 90 residential fire events during Calendar Year 2024"));
        assert!(report.summary.contains("care rate of 33.3% is below the national average (59.7%)"));
        assert!(report.summary.contains("gap rate of 44.4% is above the national average (16.0%)"));
        assert!(report.summary.contains("low social vulnerability (SVI: 0.30)"));
        assert!(report.summary.contains("served by 3 fire stations (30 fires per station)"));
        assert_eq!(report.summary, generate_summary(&report));
    }

    #[test]
    fn summary_flags_low_income_and_near_rates() {
        let records = dataset();
        let report = build_county_report("01001", &records).expect("report");
        assert!(report.summary.contains("care rate of 60.0% is near the national average"));
        assert!(report.summary.contains("gap rate of 10.0% is below the national average"));
        assert!(report.summary.contains("high social vulnerability"));
        assert!(report.summary.contains("median income of $30,000 is below the national average"));
    }

    #[test]
    fn stamping_sets_date() {
        let report = build_county_report("01001", &dataset()).expect("report");
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).expect("date");
        assert_eq!(report.stamped(date).generated_on, Some(date));
    }
}
