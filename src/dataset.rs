// A loaded, read-only record set with its derived navigation memoized.
//
// Nothing here is global: hosts own a `Dataset`, and replacing the records
// means building a new one, which drops every memoized value with it.
use once_cell::sync::OnceCell;

use crate::aggregator::{aggregate_all, aggregate_by_level, GroupKey};
use crate::benchmarks::{benchmark_parent, inject_benchmarks};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::filter::filter_records;
use crate::hierarchy::{build_org_hierarchy, OrgHierarchy};
use crate::report::{build_chapter_report_with, build_county_report_with, ReportData};
use crate::svi::{bucket_by_svi, compute_equity_gap, EquityGap};
use crate::types::{AggregatedRow, CountyRecord, FilterState, SviQuintileBucket};

#[derive(Debug)]
pub struct Dataset {
    version: u64,
    records: Vec<CountyRecord>,
    hierarchy: OnceCell<OrgHierarchy>,
    national: OnceCell<AggregatedRow>,
}

impl Dataset {
    /// `version` identifies this record set to any cache the host keeps on
    /// top; bump it whenever the records change.
    pub fn new(records: Vec<CountyRecord>, version: u64) -> Self {
        Self {
            version,
            records,
            hierarchy: OnceCell::new(),
            national: OnceCell::new(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn records(&self) -> &[CountyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn hierarchy(&self) -> &OrgHierarchy {
        self.hierarchy.get_or_init(|| build_org_hierarchy(&self.records))
    }

    /// National row over the whole dataset, ignoring any filter.
    pub fn national(&self) -> &AggregatedRow {
        self.national.get_or_init(|| aggregate_all(&self.records))
    }

    pub fn filtered(&self, filter: &FilterState) -> Vec<&CountyRecord> {
        filter_records(&self.records, filter)
    }

    pub fn filtered_national(&self, filter: &FilterState) -> AggregatedRow {
        if filter.is_empty() {
            return self.national().clone();
        }
        aggregate_all(self.filtered(filter))
    }

    /// Rows for a listing under `filter`, benchmarked against the selected
    /// region or division and the nation.
    pub fn aggregate_view(&self, filter: &FilterState, key: GroupKey) -> Vec<AggregatedRow> {
        let rows = aggregate_by_level(self.filtered(filter), key);
        let national = self.national();
        let parent = benchmark_parent(&self.records, filter, national);
        inject_benchmarks(&rows, &parent, national)
    }

    pub fn svi_breakdown(&self, filter: &FilterState) -> (Vec<SviQuintileBucket>, EquityGap) {
        let buckets = bucket_by_svi(self.filtered(filter));
        let gap = compute_equity_gap(&buckets);
        (buckets, gap)
    }

    pub fn chapter_report(&self, chapter: &str, config: &ReportConfig) -> Result<ReportData> {
        build_chapter_report_with(chapter, &self.records, config)
    }

    pub fn county_report(&self, fips: &str, config: &ReportConfig) -> Result<ReportData> {
        build_county_report_with(fips, &self.records, config)
    }
}
