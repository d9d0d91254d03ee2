use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;

use sales_dashboard::data::{export, loader};
use sales_dashboard::view::{render, ViewModel};
use sales_dashboard::{FilterCriteria, SalesTable};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Filter dimensions
// ---------------------------------------------------------------------------

/// A multi-select filter in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Region,
    Category,
}

impl Dimension {
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::Category => "Category",
        }
    }
}

// ---------------------------------------------------------------------------
// Session: one uploaded file and its filter state
// ---------------------------------------------------------------------------

pub struct Session {
    /// Where the table was loaded from.
    pub source: PathBuf,
    pub table: SalesTable,
    pub criteria: FilterCriteria,
    /// Result of the last [`render`]; rebuilt on every filter change.
    pub view: ViewModel,
    /// Multi-select options in first-encounter order.
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    pub region_colors: ColorMap,
    pub category_colors: ColorMap,
}

impl Session {
    fn new(source: PathBuf, table: SalesTable) -> Self {
        let criteria = FilterCriteria::for_table(&table);
        let view = render(&table, &criteria);
        let regions = table.regions();
        let categories = table.categories();
        Session {
            source,
            region_colors: ColorMap::new(regions.iter().cloned()),
            category_colors: ColorMap::new(categories.iter().cloned()),
            regions,
            categories,
            criteria,
            view,
            table,
        }
    }

    /// Options offered for a dimension.
    pub fn options(&self, dim: Dimension) -> &[String] {
        match dim {
            Dimension::Region => &self.regions,
            Dimension::Category => &self.categories,
        }
    }

    /// Date picker bounds (min/max order date).
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.table.date_bounds()
    }

    fn refresh(&mut self) {
        self.view = render(&self.table, &self.criteria);
        log::debug!(
            "{} of {} orders match {}..={}",
            self.view.filtered_count,
            self.table.len(),
            self.criteria.start,
            self.criteria.end
        );
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset and filters (None until the user loads a file).
    pub session: Option<Session>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl AppState {
    /// Load a CSV from disk. On failure the previous session is kept.
    pub fn load_path(&mut self, path: &Path) {
        self.loading = true;
        match loader::load_file(path) {
            Ok(table) => self.set_table(path.to_path_buf(), table),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.loading = false;
            }
        }
    }

    /// Replace the session with a freshly uploaded table, all filters open.
    pub fn set_table(&mut self, source: PathBuf, table: SalesTable) {
        self.session = Some(Session::new(source, table));
        self.status_message = None;
        self.loading = false;
    }

    /// Move the range start; drags the end along if it would invert.
    pub fn set_start_date(&mut self, date: NaiveDate) {
        if let Some(session) = &mut self.session {
            let date = clamp_date(date, session.date_bounds());
            session.criteria.start = date;
            if session.criteria.end < date {
                session.criteria.end = date;
            }
            session.refresh();
        }
    }

    /// Move the range end; drags the start along if it would invert.
    pub fn set_end_date(&mut self, date: NaiveDate) {
        if let Some(session) = &mut self.session {
            let date = clamp_date(date, session.date_bounds());
            session.criteria.end = date;
            if session.criteria.start > date {
                session.criteria.start = date;
            }
            session.refresh();
        }
    }

    /// Toggle a single value in a multi-select.
    pub fn toggle(&mut self, dim: Dimension, value: &str) {
        if let Some(session) = &mut self.session {
            let selected = selection(&mut session.criteria, dim);
            if !selected.remove(value) {
                selected.insert(value.to_string());
            }
            session.refresh();
        }
    }

    /// Select every value of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        if let Some(session) = &mut self.session {
            let all = session.options(dim).to_vec();
            *selection(&mut session.criteria, dim) = all.into_iter().collect();
            session.refresh();
        }
    }

    /// Deselect every value of a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        if let Some(session) = &mut self.session {
            selection(&mut session.criteria, dim).clear();
            session.refresh();
        }
    }

    /// Write the currently filtered records to `path`.
    pub fn export_to(&mut self, path: &Path) -> Result<()> {
        let Some(session) = &self.session else {
            anyhow::bail!("no dataset loaded");
        };
        match export::save_file(&session.view.filtered, path) {
            Ok(()) => {
                self.status_message = Some(format!(
                    "Saved {} orders to {}",
                    session.view.filtered_count,
                    path.display()
                ));
                Ok(())
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                Err(e)
            }
        }
    }
}

fn selection(criteria: &mut FilterCriteria, dim: Dimension) -> &mut std::collections::BTreeSet<String> {
    match dim {
        Dimension::Region => &mut criteria.regions,
        Dimension::Category => &mut criteria.categories,
    }
}

fn clamp_date(date: NaiveDate, bounds: Option<(NaiveDate, NaiveDate)>) -> NaiveDate {
    match bounds {
        Some((min, max)) => date.clamp(min, max),
        None => date,
    }
}
