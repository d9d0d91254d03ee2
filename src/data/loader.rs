use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};

use super::error::MalformedInputError;
use super::model::{ColumnKind, Field, OrderRecord, SalesTable, Schema};

/// Date layouts tried in order; the first that parses wins.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Date-time layouts; only the calendar day is kept.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an order table from a file on disk.
pub fn load_file(path: &Path) -> Result<SalesTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if ext != "csv" {
        bail!("Unsupported file extension: .{ext} (expected .csv)");
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let table = parse_csv(file).with_context(|| format!("parsing {}", path.display()))?;

    log::info!(
        "Loaded {} orders from {} ({} columns)",
        table.len(),
        path.display(),
        table.schema.columns().len()
    );
    Ok(table)
}

/// Parse delimited text with a header row into a [`SalesTable`].
///
/// The header must contain `Order_ID, Order_Date, Region, Category,
/// Customer_Name, Quantity, Price` (any order). Other columns are kept and
/// written back on export. A `Total_Sales` column in the input is ignored
/// and recomputed from `Quantity × Price`.
pub fn parse_csv<R: Read>(reader: R) -> Result<SalesTable, MalformedInputError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let schema = Schema::from_headers(&headers)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(row_no as u64 + 2);
        records.push(parse_row(&schema, &row, line)?);
    }

    log::debug!("parsed {} rows with {} extra columns", records.len(), schema.extra_count());
    Ok(SalesTable::new(schema, records))
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

fn parse_row(
    schema: &Schema,
    row: &csv::StringRecord,
    line: u64,
) -> Result<OrderRecord, MalformedInputError> {
    let get = |field: Field| cell(schema, row, field, line);

    let raw_date = get(Field::OrderDate)?;
    let order_date =
        parse_date(raw_date).ok_or_else(|| invalid(line, Field::OrderDate, raw_date, "is not a valid date"))?;

    let quantity = parse_quantity(get(Field::Quantity)?, line)?;
    let price = parse_price(get(Field::Price)?, line)?;

    let mut extra = vec![String::new(); schema.extra_count()];
    for ((_, kind), value) in schema.columns().iter().zip(row.iter()) {
        if let ColumnKind::Extra(i) = kind {
            extra[*i] = value.to_string();
        }
    }

    Ok(OrderRecord {
        order_id: get(Field::OrderId)?.to_string(),
        order_date,
        region: get(Field::Region)?.to_string(),
        category: get(Field::Category)?.to_string(),
        customer_name: get(Field::CustomerName)?.to_string(),
        quantity,
        price,
        extra,
    })
}

fn cell<'r>(
    schema: &Schema,
    row: &'r csv::StringRecord,
    field: Field,
    line: u64,
) -> Result<&'r str, MalformedInputError> {
    schema
        .position(field)
        .and_then(|i| row.get(i))
        .ok_or_else(|| invalid(line, field, "", "is missing"))
}

/// Parse an order date in one of the accepted layouts.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_quantity(s: &str, line: u64) -> Result<u64, MalformedInputError> {
    let t = s.trim();
    if let Ok(q) = t.parse::<u64>() {
        return Ok(q);
    }
    // Spreadsheet exports sometimes write integral counts as "3.0".
    match t.parse::<f64>() {
        Ok(v) if v < 0.0 => Err(invalid(line, Field::Quantity, s, "must not be negative")),
        Ok(v) if v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
        _ => Err(invalid(line, Field::Quantity, s, "is not a whole number")),
    }
}

fn parse_price(s: &str, line: u64) -> Result<f64, MalformedInputError> {
    match s.trim().parse::<f64>() {
        Ok(v) if !v.is_finite() => Err(invalid(line, Field::Price, s, "is not a finite number")),
        Ok(v) if v < 0.0 => Err(invalid(line, Field::Price, s, "must not be negative")),
        Ok(v) => Ok(v),
        Err(_) => Err(invalid(line, Field::Price, s, "is not a number")),
    }
}

fn invalid(line: u64, field: Field, value: &str, reason: &str) -> MalformedInputError {
    MalformedInputError::InvalidField {
        line,
        column: field.name().to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price
R1,2024-01-01,East,A,Alice,2,10.0
R2,2024-02-01,West,B,Bob,1,5.0
";

    #[test]
    fn load_sample_csv() {
        let table = parse_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);

        let r1 = &table.records[0];
        assert_eq!(r1.order_id, "R1");
        assert_eq!(r1.order_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(r1.region, "East");
        assert_eq!(r1.customer_name, "Alice");
        assert_eq!(r1.quantity, 2);
        assert!((r1.total_sales() - 20.0).abs() < 1e-9);
        assert!((table.records[1].total_sales() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn missing_price_column_is_rejected() {
        let csv_data = "\
Order_ID,Order_Date,Region,Category,Customer_Name,Quantity
R1,2024-01-01,East,A,Alice,2
";
        let err = parse_csv(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::MissingColumn { ref column } if column == "Price"
        ));
    }

    #[test]
    fn empty_input_is_missing_columns() {
        let err = parse_csv("".as_bytes()).unwrap_err();
        assert!(matches!(err, MalformedInputError::MissingColumn { .. }));
    }

    #[test]
    fn header_only_yields_empty_table() {
        let csv_data = "Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price\n";
        let table = parse_csv(csv_data.as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.date_bounds(), None);
    }

    #[test]
    fn bad_date_reports_line_and_column() {
        let csv_data = "\
Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price
R1,2024-01-01,East,A,Alice,2,10.0
R2,2024-02-30,West,B,Bob,1,5.0
";
        match parse_csv(csv_data.as_bytes()).unwrap_err() {
            MalformedInputError::InvalidField {
                line,
                column,
                value,
                ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Order_Date");
                assert_eq!(value, "2024-02-30");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn numeric_fields_are_validated() {
        let negative_qty = "\
Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price
R1,2024-01-01,East,A,Alice,-2,10.0
";
        let err = parse_csv(negative_qty.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("must not be negative"));

        let text_price = "\
Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price
R1,2024-01-01,East,A,Alice,2,ten
";
        let err = parse_csv(text_price.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Price"));

        let nan_price = "\
Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price
R1,2024-01-01,East,A,Alice,2,NaN
";
        assert!(parse_csv(nan_price.as_bytes()).is_err());
    }

    #[test]
    fn ragged_row_is_a_csv_error() {
        let csv_data = "\
Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price
R1,2024-01-01,East,A,Alice,2
";
        let err = parse_csv(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, MalformedInputError::Csv(_)));
    }

    #[test]
    fn integral_float_quantity_is_accepted() {
        let csv_data = "\
Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price
R1,2024-01-01,East,A,Alice, 3.0 ,1.5
";
        let table = parse_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(table.records[0].quantity, 3);

        let fractional = csv_data.replace(" 3.0 ", "2.5");
        assert!(parse_csv(fractional.as_bytes()).is_err());
    }

    #[test]
    fn extra_columns_and_stale_totals() {
        let csv_data = "\
Sales_Rep,Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price,Total_Sales
\"Doe, Jane\",R1,2024-01-01,East,A,Alice,2,10.0,999
";
        let table = parse_csv(csv_data.as_bytes()).unwrap();
        let r1 = &table.records[0];
        assert_eq!(r1.extra, vec!["Doe, Jane".to_string()]);
        assert!((r1.total_sales() - 20.0).abs() < 1e-9);
        assert!(table.schema.has_total_sales());
    }

    #[test]
    fn accepted_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7);
        assert_eq!(parse_date("2024-03-07"), expected);
        assert_eq!(parse_date("2024/03/07"), expected);
        assert_eq!(parse_date("03/07/2024"), expected);
        assert_eq!(parse_date("07.03.2024"), expected);
        assert_eq!(parse_date("2024-03-07 13:45:00"), expected);
        assert_eq!(parse_date("2024-03-07T13:45:00"), expected);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn load_file_rejects_other_extensions() {
        let err = load_file(Path::new("orders.parquet")).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }
}
