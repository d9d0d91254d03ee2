use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::model::{OrderRecord, SalesTable};

// ---------------------------------------------------------------------------
// Filter criteria: date window plus region / category membership
// ---------------------------------------------------------------------------

/// The user's current selection. All three predicates are AND-ed.
///
/// An empty `regions` or `categories` set means nothing is selected, so no
/// record passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    /// Inclusive lower bound.
    pub start: NaiveDate,
    /// Inclusive upper bound.
    pub end: NaiveDate,
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl FilterCriteria {
    /// Criteria that select everything in `table` (the initial UI state).
    pub fn for_table(table: &SalesTable) -> Self {
        let (start, end) = table
            .date_bounds()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        FilterCriteria {
            start,
            end,
            regions: table.regions().into_iter().collect(),
            categories: table.categories().into_iter().collect(),
        }
    }

    fn matches_membership(&self, record: &OrderRecord) -> bool {
        self.regions.contains(&record.region) && self.categories.contains(&record.category)
    }

    /// Record is inside the selected window and selection.
    pub fn matches(&self, record: &OrderRecord) -> bool {
        record.order_date >= self.start
            && record.order_date <= self.end
            && self.matches_membership(record)
    }

    /// Record is strictly before the window but inside the selection.
    pub fn matches_previous(&self, record: &OrderRecord) -> bool {
        record.order_date < self.start && self.matches_membership(record)
    }
}

/// Result of applying [`FilterCriteria`] to a table.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredViews {
    /// Records inside the selected date range.
    pub current: SalesTable,
    /// Records before the range start, used for the revenue delta.
    pub previous: SalesTable,
}

/// Split `table` into the in-range view and the "previous period" view.
///
/// The previous period is every matching record dated before
/// `criteria.start`, not a window of equal length. Both views keep the
/// source record order.
pub fn apply(table: &SalesTable, criteria: &FilterCriteria) -> FilteredViews {
    let mut current = Vec::new();
    let mut previous = Vec::new();

    for record in &table.records {
        if criteria.matches(record) {
            current.push(record.clone());
        } else if criteria.matches_previous(record) {
            previous.push(record.clone());
        }
    }

    FilteredViews {
        current: table.with_records(current),
        previous: table.with_records(previous),
    }
}
