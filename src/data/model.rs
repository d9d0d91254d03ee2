use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

use super::error::MalformedInputError;

/// Name of the derived revenue column.
pub const TOTAL_SALES: &str = "Total_Sales";

// ---------------------------------------------------------------------------
// Field – the seven required order columns
// ---------------------------------------------------------------------------

/// A required column of the order schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    OrderId,
    OrderDate,
    Region,
    Category,
    CustomerName,
    Quantity,
    Price,
}

impl Field {
    /// All required fields, in the order they are validated.
    pub const ALL: [Field; 7] = [
        Field::OrderId,
        Field::OrderDate,
        Field::Region,
        Field::Category,
        Field::CustomerName,
        Field::Quantity,
        Field::Price,
    ];

    /// Header name as it must appear in the CSV.
    pub fn name(self) -> &'static str {
        match self {
            Field::OrderId => "Order_ID",
            Field::OrderDate => "Order_Date",
            Field::Region => "Region",
            Field::Category => "Category",
            Field::CustomerName => "Customer_Name",
            Field::Quantity => "Quantity",
            Field::Price => "Price",
        }
    }

    fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Schema – column layout of the source file
// ---------------------------------------------------------------------------

/// What a single source column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Required(Field),
    /// Pass-through column; the index points into [`OrderRecord::extra`].
    Extra(usize),
    /// A `Total_Sales` column present in the source. Recomputed, never trusted.
    TotalSales,
}

/// Ordered header of the uploaded file with each column classified.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<(String, ColumnKind)>,
    extra_count: usize,
}

impl Schema {
    /// Classify a header row. Fails on the first missing required column.
    ///
    /// When a name repeats, the first occurrence wins and later ones are
    /// carried through as extra columns.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, MalformedInputError> {
        let mut seen_required: HashSet<Field> = HashSet::new();
        let mut seen_total = false;
        let mut extra_count = 0;

        let columns: Vec<(String, ColumnKind)> = headers
            .iter()
            .map(|h| {
                let name = h.as_ref().to_string();
                let kind = match Field::from_name(&name) {
                    Some(field) if seen_required.insert(field) => ColumnKind::Required(field),
                    _ if name == TOTAL_SALES && !seen_total => {
                        seen_total = true;
                        ColumnKind::TotalSales
                    }
                    _ => {
                        extra_count += 1;
                        ColumnKind::Extra(extra_count - 1)
                    }
                };
                (name, kind)
            })
            .collect();

        if let Some(missing) = Field::ALL.into_iter().find(|f| !seen_required.contains(f)) {
            return Err(MalformedInputError::MissingColumn {
                column: missing.name().to_string(),
            });
        }

        Ok(Schema {
            columns,
            extra_count,
        })
    }

    /// Source columns in source order.
    pub fn columns(&self) -> &[(String, ColumnKind)] {
        &self.columns
    }

    /// Index of a required field in the source row.
    pub fn position(&self, field: Field) -> Option<usize> {
        self.columns
            .iter()
            .position(|(_, kind)| *kind == ColumnKind::Required(field))
    }

    /// Number of pass-through columns.
    pub fn extra_count(&self) -> usize {
        self.extra_count
    }

    /// Whether the source file already carried a `Total_Sales` column.
    pub fn has_total_sales(&self) -> bool {
        self.columns
            .iter()
            .any(|(_, kind)| *kind == ColumnKind::TotalSales)
    }

    /// Header written on export: the source header, plus `Total_Sales`
    /// appended when the source lacked it.
    pub fn export_header(&self) -> Vec<&str> {
        let mut header: Vec<&str> = self.columns.iter().map(|(n, _)| n.as_str()).collect();
        if !self.has_total_sales() {
            header.push(TOTAL_SALES);
        }
        header
    }
}

// ---------------------------------------------------------------------------
// OrderRecord – one row of the upload
// ---------------------------------------------------------------------------

/// A single validated order line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub region: String,
    pub category: String,
    pub customer_name: String,
    pub quantity: u64,
    pub price: f64,
    /// Pass-through column values, indexed by [`ColumnKind::Extra`].
    pub extra: Vec<String>,
}

impl OrderRecord {
    /// Derived revenue: `Quantity × Price`.
    pub fn total_sales(&self) -> f64 {
        self.quantity as f64 * self.price
    }

    /// Calendar month the order falls in.
    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.order_date)
    }
}

// ---------------------------------------------------------------------------
// YearMonth – monthly trend key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year 0, handy as a continuous plot axis.
    pub fn ordinal(self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    pub fn from_ordinal(ordinal: i64) -> Self {
        YearMonth {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// SalesTable – the complete uploaded dataset (or a filtered view of it)
// ---------------------------------------------------------------------------

/// Ordered collection of order records sharing one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesTable {
    pub schema: Schema,
    pub records: Vec<OrderRecord>,
}

impl SalesTable {
    pub fn new(schema: Schema, records: Vec<OrderRecord>) -> Self {
        SalesTable { schema, records }
    }

    /// A sub-table with the same schema.
    pub fn with_records(&self, records: Vec<OrderRecord>) -> Self {
        SalesTable {
            schema: self.schema.clone(),
            records,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest order date, or `None` for an empty table.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.order_date).min()?;
        let max = self.records.iter().map(|r| r.order_date).max()?;
        Some((min, max))
    }

    /// Distinct regions in first-encounter order.
    pub fn regions(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.region.as_str()))
    }

    /// Distinct categories in first-encounter order.
    pub fn categories(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.category.as_str()))
    }

    /// Sum of `Total_Sales` over all records.
    pub fn total_sales(&self) -> f64 {
        self.records.iter().map(OrderRecord::total_sales).sum()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
