use serde::Serialize;

use crate::data::aggregate::{self, Metrics, TOP_CUSTOMERS};
use crate::data::filter::{self, FilterCriteria};
use crate::data::model::{SalesTable, YearMonth};

// ---------------------------------------------------------------------------
// View model – everything the dashboard displays for one filter state
// ---------------------------------------------------------------------------

/// One slice of the category pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub revenue: f64,
    /// Share of filtered revenue in percent; 0 when there is no revenue.
    pub percent: f64,
}

/// Derived, read-only summary of a table under a set of criteria.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub criteria: FilterCriteria,
    pub metrics: Metrics,
    pub region_revenue: Vec<(String, f64)>,
    pub category_share: Vec<CategoryShare>,
    pub monthly_revenue: Vec<(YearMonth, f64)>,
    pub top_customers: Vec<(String, f64)>,
    pub filtered_count: usize,
    pub previous_count: usize,
    /// The in-range records, kept for export.
    #[serde(skip)]
    pub filtered: SalesTable,
}

impl ViewModel {
    /// No record matches the current criteria.
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

/// Recompute the whole dashboard for `criteria`. Pure; call on every change.
pub fn render(table: &SalesTable, criteria: &FilterCriteria) -> ViewModel {
    render_with_top(table, criteria, TOP_CUSTOMERS)
}

/// [`render`] with a custom leaderboard size.
pub fn render_with_top(table: &SalesTable, criteria: &FilterCriteria, top_n: usize) -> ViewModel {
    let views = filter::apply(table, criteria);
    let metrics = aggregate::metrics(&views.current, &views.previous);

    let category_share = aggregate::revenue_by_category(&views.current)
        .into_iter()
        .map(|(category, revenue)| CategoryShare {
            percent: if metrics.total_revenue > 0.0 {
                revenue / metrics.total_revenue * 100.0
            } else {
                0.0
            },
            category,
            revenue,
        })
        .collect();

    ViewModel {
        criteria: criteria.clone(),
        metrics,
        region_revenue: aggregate::revenue_by_region(&views.current),
        category_share,
        monthly_revenue: aggregate::monthly_revenue(&views.current),
        top_customers: aggregate::top_customers(&views.current, top_n),
        filtered_count: views.current.len(),
        previous_count: views.previous.len(),
        filtered: views.current,
    }
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// `$1,234` – whole currency units with thousands separators.
pub fn format_currency(value: f64) -> String {
    let (sign, digits) = whole_units(value);
    format!("{sign}${digits}")
}

/// `+1,234`, `-1,234` or `0`.
pub fn format_delta(value: f64) -> String {
    match whole_units(value) {
        (_, digits) if digits == "0" => digits,
        ("-", digits) => format!("-{digits}"),
        (_, digits) => format!("+{digits}"),
    }
}

/// `12.5%`
pub fn format_percent(percent: f64) -> String {
    format!("{percent:.1}%")
}

fn whole_units(value: f64) -> (&'static str, String) {
    let rounded = value.round();
    // Also folds -0.0 into "0".
    if rounded == 0.0 || !rounded.is_finite() {
        return ("", "0".to_string());
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    (sign, group_thousands(rounded.abs() as u64))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
