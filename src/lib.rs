//! Hierarchical rollups of county fire-response records.
//!
//! Records go in once; the engine derives the division → region → chapter
//! tree, filters and aggregates on demand, normalizes and benchmarks rows,
//! buckets counties by social vulnerability, and assembles entity reports.
//! Everything is synchronous, in-memory and deterministic. Degenerate input
//! (empty groups, zero denominators) yields zeros, never an error; the only
//! error is [`EngineError::NotFound`] from the report builders.
pub mod aggregator;
pub mod benchmarks;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod output;
pub mod report;
pub mod svi;
pub mod types;
pub mod util;

#[cfg(test)]
mod fixtures;

pub use aggregator::{aggregate_all, aggregate_by_level, aggregate_group, GroupKey};
pub use benchmarks::{benchmark_parent, inject_benchmarks};
pub use dataset::Dataset;
pub use error::EngineError;
pub use filter::filter_records;
pub use hierarchy::{build_org_hierarchy, OrgHierarchy};
pub use metrics::{apply_metric_mode, MetricMode};
pub use report::{build_chapter_report, build_county_report, generate_summary, ReportData};
pub use svi::{bucket_by_svi, compute_equity_gap, EquityGap};
pub use types::{AggregatedRow, CountyRecord, FilterState, MonthlyPoint, OrgLevel, SviQuintileBucket};
