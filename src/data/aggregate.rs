use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::model::{OrderRecord, SalesTable, YearMonth};

/// How many customers the leaderboard shows.
pub const TOP_CUSTOMERS: usize = 5;

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Metrics {
    pub total_revenue: f64,
    /// Distinct `Order_ID`s.
    pub total_orders: usize,
    /// Distinct `Customer_Name`s.
    pub total_customers: usize,
    pub previous_revenue: f64,
    /// `total_revenue - previous_revenue`.
    pub revenue_change: f64,
}

/// Headline numbers for the filtered view and its comparison period.
pub fn metrics(current: &SalesTable, previous: &SalesTable) -> Metrics {
    let total_revenue = current.total_sales();
    let previous_revenue = previous.total_sales();
    Metrics {
        total_revenue,
        total_orders: count_distinct(current, |r| r.order_id.as_str()),
        total_customers: count_distinct(current, |r| r.customer_name.as_str()),
        previous_revenue,
        revenue_change: total_revenue - previous_revenue,
    }
}

fn count_distinct<'a>(table: &'a SalesTable, key: impl Fn(&'a OrderRecord) -> &'a str) -> usize {
    table.records.iter().map(key).collect::<HashSet<_>>().len()
}

// ---------------------------------------------------------------------------
// Group-by reductions
// ---------------------------------------------------------------------------

/// Sum `Total_Sales` per key, keys ascending.
pub fn sum_by<K, F>(table: &SalesTable, key: F) -> Vec<(K, f64)>
where
    K: Ord,
    F: Fn(&OrderRecord) -> K,
{
    let mut sums: BTreeMap<K, f64> = BTreeMap::new();
    for record in &table.records {
        *sums.entry(key(record)).or_insert(0.0) += record.total_sales();
    }
    sums.into_iter().collect()
}

pub fn revenue_by_region(table: &SalesTable) -> Vec<(String, f64)> {
    sum_by(table, |r| r.region.clone())
}

pub fn revenue_by_category(table: &SalesTable) -> Vec<(String, f64)> {
    sum_by(table, |r| r.category.clone())
}

/// Revenue per calendar month; months without orders are absent.
pub fn monthly_revenue(table: &SalesTable) -> Vec<(YearMonth, f64)> {
    sum_by(table, OrderRecord::month)
}

/// The `n` customers with the highest summed sales.
///
/// Equal sums keep the order in which customers first appear in `table`.
pub fn top_customers(table: &SalesTable, n: usize) -> Vec<(String, f64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();

    for record in &table.records {
        let slot = *index.entry(record.customer_name.as_str()).or_insert_with(|| {
            totals.push((record.customer_name.clone(), 0.0));
            totals.len() - 1
        });
        totals[slot].1 += record.total_sales();
    }

    // Stable sort: ties stay in encounter order.
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals.truncate(n);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;

    const SAMPLE_CSV: &str = "\
Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price
R1,2024-01-01,East,A,Alice,2,10.0
R2,2024-02-01,West,B,Bob,1,5.0
R3,2024-02-15,East,B,Carol,4,2.5
R3,2024-02-15,East,A,Carol,1,3.0
R5,2024-03-20,North,A,Dave,1,10.0
R6,2024-03-21,North,C,Erin,1,20.0
R7,2024-03-22,West,C,Frank,2,1.0
";

    fn table() -> SalesTable {
        parse_csv(SAMPLE_CSV.as_bytes()).unwrap()
    }

    #[test]
    fn group_sums_add_up_to_total() {
        let t = table();
        let total = t.total_sales();
        for groups in [revenue_by_region(&t), revenue_by_category(&t)] {
            let sum: f64 = groups.iter().map(|(_, v)| v).sum();
            assert!((sum - total).abs() < 1e-9);
        }
        let monthly: f64 = monthly_revenue(&t).iter().map(|(_, v)| v).sum();
        assert!((monthly - total).abs() < 1e-9);
    }

    #[test]
    fn region_revenue_sorted_by_key() {
        let regions = revenue_by_region(&table());
        let keys: Vec<&str> = regions.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["East", "North", "West"]);
        assert!((regions[0].1 - 33.0).abs() < 1e-9);
    }

    #[test]
    fn monthly_revenue_is_chronological() {
        let months = monthly_revenue(&table());
        let labels: Vec<String> = months.iter().map(|(m, _)| m.to_string()).collect();
        assert_eq!(labels, vec!["2024-01", "2024-02", "2024-03"]);
        assert!((months[1].1 - 18.0).abs() < 1e-9);
    }

    #[test]
    fn top_customers_sorted_and_truncated() {
        let top = top_customers(&table(), 3);
        assert_eq!(top.len(), 3);
        // Alice and Erin both sum to 20; Alice appears first.
        assert_eq!(top[0].0, "Alice");
        assert_eq!(top[1].0, "Erin");
        assert_eq!(top[2].0, "Carol");
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));

        assert!(top_customers(&table(), 0).is_empty());
        assert_eq!(top_customers(&table(), 50).len(), 6);
    }

    #[test]
    fn metrics_count_distinct_orders_and_customers() {
        let t = table();
        let empty = t.with_records(Vec::new());
        let m = metrics(&t, &empty);
        assert_eq!(m.total_orders, 6);
        assert_eq!(m.total_customers, 6);
        assert!((m.total_revenue - 70.0).abs() < 1e-9);
        assert_eq!(m.revenue_change, m.total_revenue);
    }

    #[test]
    fn empty_table_gives_zero_metrics() {
        let t = table().with_records(Vec::new());
        assert_eq!(metrics(&t, &t), Metrics::default());
        assert!(revenue_by_region(&t).is_empty());
        assert!(top_customers(&t, TOP_CUSTOMERS).is_empty());
    }
}
