use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};

use sales_dashboard::data::model::YearMonth;
use sales_dashboard::view::{format_currency, format_delta, format_percent, ViewModel};

use crate::state::{AppState, Session};

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render metrics, charts and the customer leaderboard.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(session) = &state.session else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Please upload a CSV file to view the dashboard.  (File → Open CSV…)");
        });
        return;
    };
    let view = &session.view;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Key Metrics");
            metric_cards(ui, view);
            if view.is_empty() {
                ui.label(RichText::new("No orders match the current filters.").italics());
            }
            ui.add_space(8.0);

            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].heading("Revenue by Region");
                region_bars(&mut cols[0], session);
                cols[1].heading("Revenue Distribution by Category");
                category_pie(&mut cols[1], session);
            });
            ui.add_space(8.0);

            ui.heading("Monthly Revenue Trend");
            monthly_trend(ui, view);
            ui.add_space(8.0);

            ui.heading("Top 5 Customers");
            top_customers(ui, view);
        });
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

fn metric_cards(ui: &mut Ui, view: &ViewModel) {
    let m = &view.metrics;
    let delta_color = if m.revenue_change < 0.0 {
        Color32::LIGHT_RED
    } else {
        Color32::LIGHT_GREEN
    };

    ui.columns(3, |cols: &mut [Ui]| {
        card(&mut cols[0], "Total Revenue", format_currency(m.total_revenue), |ui| {
            ui.label(RichText::new(format_delta(m.revenue_change)).color(delta_color))
                .on_hover_text("Change against all matching orders before the range start");
        });
        card(&mut cols[1], "Total Orders", m.total_orders.to_string(), |_| {});
        card(&mut cols[2], "Total Customers", m.total_customers.to_string(), |_| {});
    });
}

fn card(ui: &mut Ui, title: &str, value: String, extra: impl FnOnce(&mut Ui)) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(title);
        ui.label(RichText::new(value).size(24.0).strong());
        extra(ui);
    });
}

// ---------------------------------------------------------------------------
// Region bar chart
// ---------------------------------------------------------------------------

fn region_bars(ui: &mut Ui, session: &Session) {
    let data = &session.view.region_revenue;
    let labels: Vec<String> = data.iter().map(|(region, _)| region.clone()).collect();

    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, (region, revenue))| {
            Bar::new(i as f64, *revenue)
                .name(region)
                .fill(session.region_colors.color_for(region))
                .width(0.6)
        })
        .collect();

    Plot::new("region_revenue")
        .height(CHART_HEIGHT)
        .y_axis_label("Revenue")
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Axis label for integral tick positions, blank in between.
fn category_label(labels: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Category pie chart
// ---------------------------------------------------------------------------

fn category_pie(ui: &mut Ui, session: &Session) {
    let shares = &session.view.category_share;
    let fractions: Vec<f64> = shares.iter().map(|s| s.percent / 100.0).collect();

    Plot::new("category_share")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for ((share, wedges), label_at) in shares
                .iter()
                .zip(pie_wedges(&fractions))
                .zip(pie_label_positions(&fractions))
            {
                let color = session.category_colors.color_for(&share.category);
                for wedge in wedges {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(wedge))
                            .name(&share.category)
                            .fill_color(color)
                            .stroke(egui::Stroke::new(1.0, color)),
                    );
                }
                plot_ui.text(Text::new(
                    PlotPoint::new(label_at[0], label_at[1]),
                    RichText::new(format_percent(share.percent)).strong(),
                ));
            }
        });
}

/// Max sweep of a single polygon; egui fills convex shapes only.
const MAX_WEDGE: f64 = FRAC_PI_2;
const ARC_STEP: f64 = TAU / 180.0;

/// Unit-circle slices for `fractions`, clockwise from 12 o'clock.
///
/// Each slice is split into convex wedges of at most a quarter turn.
fn pie_wedges(fractions: &[f64]) -> Vec<Vec<Vec<[f64; 2]>>> {
    let mut angle = FRAC_PI_2;
    fractions
        .iter()
        .map(|&fraction| {
            let sweep = fraction * TAU;
            let end = angle - sweep;
            let mut wedges = Vec::new();
            let mut from = angle;
            while from - end > 1e-9 {
                let to = (from - MAX_WEDGE).max(end);
                let mut points = vec![[0.0, 0.0]];
                let steps = ((from - to) / ARC_STEP).ceil().max(1.0) as usize;
                for k in 0..=steps {
                    let a = from - (from - to) * k as f64 / steps as f64;
                    points.push([a.cos(), a.sin()]);
                }
                wedges.push(points);
                from = to;
            }
            angle = end;
            wedges
        })
        .collect()
}

/// Where each slice's percentage label goes (mid-angle, 0.65 radius).
fn pie_label_positions(fractions: &[f64]) -> Vec<[f64; 2]> {
    let mut angle = FRAC_PI_2;
    fractions
        .iter()
        .map(|&fraction| {
            let mid = angle - fraction * TAU / 2.0;
            angle -= fraction * TAU;
            [0.65 * mid.cos(), 0.65 * mid.sin()]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

fn monthly_trend(ui: &mut Ui, view: &ViewModel) {
    let points: Vec<[f64; 2]> = view
        .monthly_revenue
        .iter()
        .map(|(month, revenue)| [month.ordinal() as f64, *revenue])
        .collect();

    Plot::new("monthly_revenue")
        .height(CHART_HEIGHT)
        .y_axis_label("Revenue")
        .x_axis_formatter(|mark: GridMark, _range| {
            let rounded = mark.value.round();
            if (mark.value - rounded).abs() > 1e-6 {
                String::new()
            } else {
                YearMonth::from_ordinal(rounded as i64).to_string()
            }
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Revenue")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .name("Revenue")
                    .color(Color32::LIGHT_BLUE)
                    .radius(4.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Top customers
// ---------------------------------------------------------------------------

fn top_customers(ui: &mut Ui, view: &ViewModel) {
    egui::Grid::new("top_customers")
        .num_columns(2)
        .striped(true)
        .min_col_width(160.0)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Customer_Name");
            ui.strong("Total_Sales");
            ui.end_row();

            for (customer, total) in &view.top_customers {
                ui.label(customer);
                ui.label(format!("{total:.2}"));
                ui.end_row();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wedges_cover_each_slice_in_quarter_turns() {
        let wedges = pie_wedges(&[0.6, 0.4]);
        assert_eq!(wedges.len(), 2);
        // 0.6 of a turn = 216° → three wedges; 0.4 = 144° → two.
        assert_eq!(wedges[0].len(), 3);
        assert_eq!(wedges[1].len(), 2);

        let first = &wedges[0][0];
        assert_eq!(first[0], [0.0, 0.0]);
        assert!((first[1][0]).abs() < 1e-9 && (first[1][1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_slices_produce_no_wedges() {
        assert!(pie_wedges(&[0.0])[0].is_empty());
        assert!(pie_wedges(&[]).is_empty());
    }

    #[test]
    fn axis_labels_only_on_integral_ticks() {
        let labels = vec!["East".to_string(), "West".to_string()];
        assert_eq!(category_label(&labels, 1.0), "West");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }
}
