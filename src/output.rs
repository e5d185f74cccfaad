use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use crate::metrics::{apply_metric_mode, metric_mode_label, MetricMode};
use crate::types::{AggregatedPreviewRow, AggregatedRow, SviPreviewRow, SviQuintileBucket};
use crate::util::{format_delta, format_int, format_number};

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Render up to `max_rows` rows as a markdown table.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}

/// Header for the fires column under `mode`.
pub fn fires_header(mode: MetricMode) -> String {
    format!("Fires{}", metric_mode_label(mode))
}

/// Display form of aggregated rows; the fire count is re-expressed under
/// `mode` and care rate is compared with the injected parent benchmark.
pub fn aggregated_preview(rows: &[AggregatedRow], mode: MetricMode) -> Vec<AggregatedPreviewRow> {
    rows.iter()
        .map(|r| {
            let fires = apply_metric_mode(r.total as f64, r.population, r.households, mode);
            AggregatedPreviewRow {
                name: r.name.clone(),
                county_count: r.county_count,
                total: match mode {
                    MetricMode::Raw => format_int(r.total),
                    _ => format_number(fires, 2),
                },
                care_rate: format!("{:.1}%", r.care_rate),
                gap_rate: format!("{:.1}%", r.gap_rate),
                vs_parent: r
                    .parent_care_rate
                    .map(|p| format_delta(r.care_rate - p))
                    .unwrap_or_else(|| "-".to_string()),
                avg_svi: format!("{:.2}", r.avg_svi),
                fires_per_10k: format_number(r.fires_per_10k, 1),
            }
        })
        .collect()
}

pub fn svi_preview(buckets: &[SviQuintileBucket]) -> Vec<SviPreviewRow> {
    buckets
        .iter()
        .map(|b| SviPreviewRow {
            label: b.label.clone(),
            county_count: b.county_count,
            total: format_int(b.total),
            care_rate: format!("{:.1}%", b.care_rate),
            gap_rate: format!("{:.1}%", b.gap_rate),
        })
        .collect()
}
