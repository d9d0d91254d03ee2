use thiserror::Error;

/// The upload could not be turned into a [`SalesTable`](super::model::SalesTable).
///
/// Parsing is all-or-nothing: any of these aborts the load and no partial
/// table is produced.
#[derive(Debug, Error)]
pub enum MalformedInputError {
    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("line {line}, column '{column}': '{value}' {reason}")]
    InvalidField {
        /// 1-based line in the file; the header is line 1.
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}
