//! Headless report: apply dashboard filters to a CSV and print the view
//! model as JSON, optionally writing the filtered orders back out.
//!
//! ```text
//! sales_report <input.csv> [--from YYYY-MM-DD] [--to YYYY-MM-DD]
//!              [--region R]... [--category C]... [--top N] [--out report.csv]
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

use sales_dashboard::data::{export, loader};
use sales_dashboard::data::aggregate::TOP_CUSTOMERS;
use sales_dashboard::view::render_with_top;
use sales_dashboard::FilterCriteria;

#[derive(Debug, Default)]
struct Args {
    input: PathBuf,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    regions: BTreeSet<String>,
    categories: BTreeSet<String>,
    top: Option<usize>,
    out: Option<PathBuf>,
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut input = None;

    while let Some(arg) = argv.next() {
        let mut value = |flag: &str| argv.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--from" => args.from = Some(parse_day(&value("--from")?)?),
            "--to" => args.to = Some(parse_day(&value("--to")?)?),
            "--region" => {
                args.regions.insert(value("--region")?);
            }
            "--category" => {
                args.categories.insert(value("--category")?);
            }
            "--top" => {
                let n = value("--top")?;
                args.top = Some(n.parse().with_context(|| format!("--top: '{n}' is not a count"))?);
            }
            "--out" => args.out = Some(PathBuf::from(value("--out")?)),
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            path if input.is_none() => input = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument '{extra}'"),
        }
    }

    args.input = input.context("usage: sales_report <input.csv> [--from D] [--to D] [--region R]... [--category C]... [--top N] [--out FILE]")?;
    Ok(args)
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("'{s}' is not a YYYY-MM-DD date"))
}

/// Unspecified flags keep the dashboard defaults (full range, all values).
fn criteria_for(table: &sales_dashboard::SalesTable, args: &Args) -> FilterCriteria {
    let mut criteria = FilterCriteria::for_table(table);
    if let Some(from) = args.from {
        criteria.start = from;
    }
    if let Some(to) = args.to {
        criteria.end = to;
    }
    if !args.regions.is_empty() {
        criteria.regions = args.regions.clone();
    }
    if !args.categories.is_empty() {
        criteria.categories = args.categories.clone();
    }
    criteria
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args(std::env::args().skip(1))?;
    let table = loader::load_file(&args.input)?;
    let criteria = criteria_for(&table, &args);

    let view = render_with_top(&table, &criteria, args.top.unwrap_or(TOP_CUSTOMERS));
    log::info!("{} of {} orders match", view.filtered_count, table.len());

    println!("{}", serde_json::to_string_pretty(&view).context("encoding view model")?);

    if let Some(out) = &args.out {
        export::save_file(&view.filtered, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> impl Iterator<Item = String> {
        items.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_repeated_filters() {
        let args = parse_args(argv(&[
            "orders.csv",
            "--region",
            "East",
            "--region",
            "West",
            "--from",
            "2024-02-01",
            "--top",
            "3",
        ]))
        .unwrap();
        assert_eq!(args.input, PathBuf::from("orders.csv"));
        assert_eq!(args.regions.len(), 2);
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(args.top, Some(3));
        assert!(args.out.is_none());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(argv(&[])).is_err());
        assert!(parse_args(argv(&["a.csv", "--from"])).is_err());
        assert!(parse_args(argv(&["a.csv", "--from", "02/01/2024"])).is_err());
        assert!(parse_args(argv(&["a.csv", "--verbose"])).is_err());
        assert!(parse_args(argv(&["a.csv", "b.csv"])).is_err());
    }

    #[test]
    fn unspecified_filters_select_everything() {
        let csv_data = "\
Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price
R1,2024-01-01,East,A,Alice,2,10.0
R2,2024-02-01,West,B,Bob,1,5.0
";
        let table = loader::parse_csv(csv_data.as_bytes()).unwrap();
        let args = parse_args(argv(&["a.csv", "--category", "B"])).unwrap();
        let criteria = criteria_for(&table, &args);
        assert_eq!(criteria.regions.len(), 2);
        assert_eq!(criteria.categories.len(), 1);
        assert_eq!(render_with_top(&table, &criteria, 5).filtered_count, 1);
    }
}
