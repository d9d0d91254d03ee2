//! Data layer: typed order table, parsing, filtering, aggregation, export.
//!
//! Architecture:
//! ```text
//!   uploaded .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse + validate → SalesTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  date range ∧ region ∧ category → current / previous
//!   └──────────┘
//!        │
//!        ├──────────────┐
//!        ▼              ▼
//!   ┌───────────┐  ┌──────────┐
//!   │ aggregate │  │  export  │  filtered view → .csv bytes
//!   └───────────┘  └──────────┘
//! ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;

pub use error::MalformedInputError;
