//! Sales performance reporting over uploaded CSV order exports.
//!
//! [`data`] turns a CSV upload into a typed [`SalesTable`], filters it and
//! computes group-by summaries. [`view::render`] bundles everything the
//! dashboard shows into a single [`ViewModel`].

pub mod data;
pub mod view;

pub use data::filter::FilterCriteria;
pub use data::model::SalesTable;
pub use data::MalformedInputError;
pub use view::{render, ViewModel};
