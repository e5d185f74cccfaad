// Division → region → chapter navigation derived from the county table.
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::filter::selected;
use crate::types::{CountyRecord, FilterState};

/// Organizational tree plus reverse lookups.
///
/// Counties with an empty division, region or chapter take no part in it,
/// though they still count in every aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgHierarchy {
    pub divisions: Vec<String>,
    pub division_to_regions: BTreeMap<String, Vec<String>>,
    pub region_to_chapters: BTreeMap<String, Vec<String>>,
    pub chapter_to_region: BTreeMap<String, String>,
    pub region_to_division: BTreeMap<String, String>,
}

pub fn build_org_hierarchy(records: &[CountyRecord]) -> OrgHierarchy {
    let mut division_sets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut region_sets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut chapter_to_region = BTreeMap::new();
    let mut region_to_division = BTreeMap::new();
    let mut skipped = 0usize;

    for r in records {
        if r.division.is_empty() || r.region.is_empty() || r.chapter.is_empty() {
            skipped += 1;
            continue;
        }
        division_sets
            .entry(r.division.clone())
            .or_default()
            .insert(r.region.clone());
        region_sets
            .entry(r.region.clone())
            .or_default()
            .insert(r.chapter.clone());
        chapter_to_region.insert(r.chapter.clone(), r.region.clone());
        region_to_division.insert(r.region.clone(), r.division.clone());
    }

    // BTreeSet iterates sorted, so the collected vectors are already ordered.
    let divisions: Vec<String> = division_sets.keys().cloned().collect();
    let division_to_regions = division_sets
        .into_iter()
        .map(|(k, v)| (k, v.into_iter().collect()))
        .collect();
    let region_to_chapters = region_sets
        .into_iter()
        .map(|(k, v)| (k, v.into_iter().collect()))
        .collect();

    tracing::debug!(
        divisions = divisions.len(),
        chapters = chapter_to_region.len(),
        skipped,
        "built org hierarchy"
    );

    OrgHierarchy {
        divisions,
        division_to_regions,
        region_to_chapters,
        chapter_to_region,
        region_to_division,
    }
}

impl OrgHierarchy {
    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }

    /// Regions offered under the current filter: those of the selected
    /// division, or every region.
    pub fn region_options(&self, filter: &FilterState) -> Vec<String> {
        if let Some(div) = selected(&filter.division) {
            return self.division_to_regions.get(div).cloned().unwrap_or_default();
        }
        let mut all: Vec<String> = self.division_to_regions.values().flatten().cloned().collect();
        all.sort();
        all
    }

    /// Chapters offered under the current filter, narrowest selector first.
    pub fn chapter_options(&self, filter: &FilterState) -> Vec<String> {
        if let Some(region) = selected(&filter.region) {
            return self.region_to_chapters.get(region).cloned().unwrap_or_default();
        }
        let mut out: Vec<String> = match selected(&filter.division) {
            Some(div) => self
                .division_to_regions
                .get(div)
                .into_iter()
                .flatten()
                .filter_map(|r| self.region_to_chapters.get(r))
                .flatten()
                .cloned()
                .collect(),
            None => self.region_to_chapters.values().flatten().cloned().collect(),
        };
        out.sort();
        out
    }

    pub fn division_of_chapter(&self, chapter: &str) -> Option<&str> {
        let region = self.chapter_to_region.get(chapter)?;
        self.region_to_division.get(region).map(String::as_str)
    }
}

/// Distinct non-empty state codes, sorted.
pub fn state_options(records: &[CountyRecord]) -> Vec<String> {
    let states: BTreeSet<&str> = records
        .iter()
        .map(|r| r.state.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    states.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::county;

    fn sample() -> Vec<CountyRecord> {
        vec![
            county("01001", "AL", "Alabama Central", "Alabama", "Southeast", 10, 4, 3),
            county("01003", "AL", "Alabama South", "Alabama", "Southeast", 20, 8, 6),
            county("13001", "GA", "Georgia North", "Georgia", "Southeast", 5, 2, 1),
            county("06001", "CA", "Bay Area", "Northern California", "Pacific", 40, 20, 10),
            county("06003", "CA", "Bay Area", "Northern California", "Pacific", 7, 3, 2),
        ]
    }

    #[test]
    fn builds_sorted_forward_and_reverse_maps() {
        let h = build_org_hierarchy(&sample());
        assert_eq!(h.divisions, vec!["Pacific", "Southeast"]);
        assert_eq!(h.division_to_regions["Southeast"], vec!["Alabama", "Georgia"]);
        assert_eq!(
            h.region_to_chapters["Alabama"],
            vec!["Alabama Central", "Alabama South"]
        );
        assert_eq!(h.chapter_to_region["Bay Area"], "Northern California");
        assert_eq!(h.region_to_division["Georgia"], "Southeast");
        assert_eq!(h.division_of_chapter("Georgia North"), Some("Southeast"));
    }

    #[test]
    fn reverse_maps_are_covered_by_forward_maps() {
        let h = build_org_hierarchy(&sample());
        for (chapter, region) in &h.chapter_to_region {
            assert!(h.region_to_chapters[region].contains(chapter));
        }
        for (region, division) in &h.region_to_division {
            assert!(h.division_to_regions[division].contains(region));
        }
    }

    #[test]
    fn records_without_chapter_yield_empty_hierarchy() {
        let mut records = sample();
        for r in &mut records {
            r.chapter.clear();
        }
        let h = build_org_hierarchy(&records);
        assert!(h.is_empty());
        assert!(h.division_to_regions.is_empty());
        assert!(h.region_to_chapters.is_empty());
        assert!(h.chapter_to_region.is_empty());
        assert!(h.region_to_division.is_empty());
    }

    #[test]
    fn cascading_options_follow_filter() {
        let h = build_org_hierarchy(&sample());
        let none = FilterState::default();
        assert_eq!(
            h.region_options(&none),
            vec!["Alabama", "Georgia", "Northern California"]
        );

        let div = FilterState { division: Some("Southeast".into()), ..Default::default() };
        assert_eq!(h.region_options(&div), vec!["Alabama", "Georgia"]);
        assert_eq!(
            h.chapter_options(&div),
            vec!["Alabama Central", "Alabama South", "Georgia North"]
        );

        let reg = FilterState { region: Some("Georgia".into()), ..Default::default() };
        assert_eq!(h.chapter_options(&reg), vec!["Georgia North"]);

        let unknown = FilterState { division: Some("Atlantis".into()), ..Default::default() };
        assert!(h.region_options(&unknown).is_empty());
        assert!(h.chapter_options(&unknown).is_empty());
    }

    #[test]
    fn state_options_are_distinct_and_sorted() {
        let mut records = sample();
        records[0].state.clear();
        assert_eq!(state_options(&records), vec!["AL", "CA", "GA"]);
    }
}
