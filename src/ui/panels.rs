use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use sales_dashboard::data::export::DEFAULT_EXPORT_NAME;

use crate::state::{AppState, Dimension};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(session) = &state.session else {
        ui.label("No dataset loaded.");
        return;
    };

    // Copy what the widgets need so handlers can take `&mut state`.
    let mut start = session.criteria.start;
    let mut end = session.criteria.end;
    let has_dates = session.date_bounds().is_some();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            ui.strong("Select Date Range");
            if has_dates {
                egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
                    ui.label("From");
                    if ui
                        .add(DatePickerButton::new(&mut start).id_salt("start_date"))
                        .changed()
                    {
                        state.set_start_date(start);
                    }
                    ui.end_row();

                    ui.label("To");
                    if ui
                        .add(DatePickerButton::new(&mut end).id_salt("end_date"))
                        .changed()
                    {
                        state.set_end_date(end);
                    }
                    ui.end_row();
                });
            } else {
                ui.label("No orders in file.");
            }
            ui.separator();

            // ---- Multi-selects ----
            for dim in [Dimension::Region, Dimension::Category] {
                multi_select(ui, state, dim);
            }
        });
}

/// Collapsible checkbox list with All / None shortcuts.
fn multi_select(ui: &mut Ui, state: &mut AppState, dim: Dimension) {
    let Some(session) = &state.session else {
        return;
    };
    let options = session.options(dim).to_vec();
    let selected = match dim {
        Dimension::Region => session.criteria.regions.clone(),
        Dimension::Category => session.criteria.categories.clone(),
    };
    let colors = match dim {
        Dimension::Region => session.region_colors.clone(),
        Dimension::Category => session.category_colors.clone(),
    };

    // Show count of selected / total in the header
    let header_text = format!(
        "Select {}  ({}/{})",
        dim.label(),
        selected.len(),
        options.len()
    );

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(dim.label())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(dim);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(dim);
                }
            });

            for value in &options {
                let mut checked = selected.contains(value);
                let text = RichText::new(value).color(colors.color_for(value));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle(dim, value);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.session.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.loading {
            ui.spinner();
        }

        if let Some(session) = &state.session {
            let name = session
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}: {} orders loaded, {} match filters",
                session.table.len(),
                session.view.filtered_count
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload Sales CSV File")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download Filtered Report")
        .set_file_name(DEFAULT_EXPORT_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        // Failures are reported through `status_message`.
        let _ = state.export_to(&path);
    }
}
