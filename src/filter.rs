use crate::types::{CountyRecord, FilterState};

/// Keep the records whose division, region, chapter and state match every
/// selector that is set. Comparison is exact and case-sensitive; input order
/// is preserved. `Some("")` counts as unset.
pub fn filter_records<'a>(records: &'a [CountyRecord], filter: &FilterState) -> Vec<&'a CountyRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// The selector's value, with a blank string treated as unset.
pub(crate) fn selected(selector: &Option<String>) -> Option<&str> {
    selector.as_deref().filter(|s| !s.is_empty())
}

fn field_matches(selector: &Option<String>, value: &str) -> bool {
    selected(selector).map_or(true, |s| s == value)
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        [&self.division, &self.region, &self.chapter, &self.state]
            .into_iter()
            .all(|sel| selected(sel).is_none())
    }

    pub fn matches(&self, r: &CountyRecord) -> bool {
        field_matches(&self.division, &r.division)
            && field_matches(&self.region, &r.region)
            && field_matches(&self.chapter, &r.chapter)
            && field_matches(&self.state, &r.state)
    }

    /// Move to `next`, clearing selections that can no longer be descendants:
    /// a new division drops region and chapter, a new region drops chapter.
    ///
    /// Hosts call this when the user changes one selector; `filter_records`
    /// itself accepts any combination.
    pub fn apply_change(&self, next: FilterState) -> FilterState {
        let mut out = next;
        if self.division != out.division {
            out.region = None;
            out.chapter = None;
        }
        if self.region != out.region {
            out.chapter = None;
        }
        out
    }
}
