use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{ColumnKind, Field, OrderRecord, SalesTable};

/// File name offered by the save dialog.
pub const DEFAULT_EXPORT_NAME: &str = "filtered_sales_report.csv";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Write `table` as CSV: source header order, `Total_Sales` appended when
/// the source lacked it, one row per record.
pub fn write_csv<W: Write>(table: &SalesTable, writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.schema.export_header())?;

    let append_total = !table.schema.has_total_sales();
    for record in &table.records {
        let mut row: Vec<String> = table
            .schema
            .columns()
            .iter()
            .map(|(_, kind)| cell(record, *kind))
            .collect();
        if append_total {
            row.push(record.total_sales().to_string());
        }
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}

/// Serialize `table` into an in-memory UTF-8 CSV buffer.
pub fn to_csv_bytes(table: &SalesTable) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

/// Write `table` to `path`, replacing any existing file.
pub fn save_file(table: &SalesTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, std::io::BufWriter::new(file))
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} orders to {}", table.len(), path.display());
    Ok(())
}

fn cell(record: &OrderRecord, kind: ColumnKind) -> String {
    match kind {
        ColumnKind::Required(Field::OrderId) => record.order_id.clone(),
        ColumnKind::Required(Field::OrderDate) => record.order_date.format(DATE_FORMAT).to_string(),
        ColumnKind::Required(Field::Region) => record.region.clone(),
        ColumnKind::Required(Field::Category) => record.category.clone(),
        ColumnKind::Required(Field::CustomerName) => record.customer_name.clone(),
        ColumnKind::Required(Field::Quantity) => record.quantity.to_string(),
        ColumnKind::Required(Field::Price) => record.price.to_string(),
        ColumnKind::Extra(i) => record.extra.get(i).cloned().unwrap_or_default(),
        ColumnKind::TotalSales => record.total_sales().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{self, FilterCriteria};
    use crate::data::loader::parse_csv;

    const SAMPLE_CSV: &str = "\
Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price,Sales_Rep
R1,2024-01-01,East,A,Alice,2,10.0,\"Doe, Jane\"
R2,2024-02-01,West,B,Bob,1,5.0,Kim
R3,2024-02-03,East,B,Carol,3,0.1,
";

    #[test]
    fn export_appends_total_sales() {
        let table = parse_csv(SAMPLE_CSV.as_bytes()).unwrap();
        let text = String::from_utf8(to_csv_bytes(&table).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Order_ID,Order_Date,Region,Category,Customer_Name,Quantity,Price,Sales_Rep,Total_Sales")
        );
        assert_eq!(lines.next(), Some("R1,2024-01-01,East,A,Alice,2,10,\"Doe, Jane\",20"));
    }

    #[test]
    fn filtered_export_round_trips() {
        let table = parse_csv(SAMPLE_CSV.as_bytes()).unwrap();
        let mut criteria = FilterCriteria::for_table(&table);
        criteria.regions.remove("West");
        let filtered = filter::apply(&table, &criteria).current;

        let bytes = to_csv_bytes(&filtered).unwrap();
        let reparsed = parse_csv(bytes.as_slice()).unwrap();
        assert_eq!(reparsed.records, filtered.records);

        // Second pass is byte-identical: Total_Sales is now a source column.
        assert_eq!(to_csv_bytes(&reparsed).unwrap(), bytes);
    }

    #[test]
    fn empty_table_exports_header_only() {
        let table = parse_csv(SAMPLE_CSV.as_bytes()).unwrap().with_records(Vec::new());
        let text = String::from_utf8(to_csv_bytes(&table).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn save_file_writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_NAME);
        let table = parse_csv(SAMPLE_CSV.as_bytes()).unwrap();

        save_file(&table, &path).unwrap();
        let reloaded = crate::data::loader::load_file(&path).unwrap();
        assert_eq!(reloaded.records, table.records);
    }
}
