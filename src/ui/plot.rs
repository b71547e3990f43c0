use chrono::{Datelike, NaiveDate};
use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::model::{EvHistoryPoint, EvType, GasPricePoint, VehicleDataset};
use crate::data::stats::{CategoryCount, ModelMeanRange};

// ---------------------------------------------------------------------------
// Washington map (lat/lon scatter)
// ---------------------------------------------------------------------------

/// Scatter the filtered vehicles by registration coordinates, one series per
/// EV type. Rows without a parsed location are simply absent.
pub fn map_scatter(ui: &mut Ui, dataset: &VehicleDataset, indices: &[usize], colors: &ColorMap) {
    Plot::new("wa_map")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(1.0)
        .show(ui, |plot_ui| {
            for ev_type in EvType::ALL {
                let label = ev_type.to_string();
                let points: PlotPoints = indices
                    .iter()
                    .map(|&i| &dataset.records[i])
                    .filter(|r| r.ev_type == ev_type)
                    .filter_map(|r| r.location.map(|p| [p.lon, p.lat]))
                    .collect();

                plot_ui.points(
                    Points::new(points)
                        .name(&label)
                        .color(colors.color_for(&label))
                        .radius(2.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Horizontal bar charts
// ---------------------------------------------------------------------------

/// Ranked category counts (top-20 cities / counties) as horizontal bars,
/// highest count at the top.
pub fn count_bars(ui: &mut Ui, id: &str, counts: &[CategoryCount]) {
    let labels: Vec<String> = counts.iter().map(|c| c.label.clone()).collect();
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| Bar::new((counts.len() - i) as f64, c.count as f64))
        .collect();

    // Fixed height: these charts stack inside the statistics scroll area.
    horizontal_bar_plot(id, labels)
        .height(320.0)
        .x_axis_label("Vehicles")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().width(0.6));
        });
}

/// Mean electric range per (make, model) as horizontal bars, longest mean
/// range at the top.
pub fn model_range_bars(ui: &mut Ui, ranges: &[ModelMeanRange]) {
    let mut ranked: Vec<&ModelMeanRange> = ranges.iter().collect();
    ranked.sort_by(|a, b| b.mean_range.total_cmp(&a.mean_range));

    let labels: Vec<String> = ranked
        .iter()
        .map(|m| format!("{} {}", m.make, m.model))
        .collect();
    let bars: Vec<Bar> = ranked
        .iter()
        .enumerate()
        .map(|(i, m)| Bar::new((ranked.len() - i) as f64, m.mean_range))
        .collect();

    horizontal_bar_plot("model_ranges", labels)
        .x_axis_label("Average Range (miles)")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().width(0.6));
        });
}

/// Shared horizontal-bar configuration: bars sit at y = n..1 so rank 0 draws
/// at the top, and the y axis shows the category labels.
fn horizontal_bar_plot(id: &str, labels: Vec<String>) -> Plot<'static> {
    let n = labels.len();
    Plot::new(id.to_string())
        .y_axis_formatter(move |mark, _range| {
            let slot = mark.value.round();
            if (mark.value - slot).abs() > 1e-6 || slot < 1.0 || slot > n as f64 {
                return String::new();
            }
            labels.get(n - slot as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_grid([true, false])
}

// ---------------------------------------------------------------------------
// Time-series line charts
// ---------------------------------------------------------------------------

/// Calendar date → x coordinate (days since the common era).
fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// Format a day-number grid mark back into a "Mon YYYY" label.
fn date_axis_label(value: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(value.round() as i32)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_default()
}

fn date_series_plot(id: &str) -> Plot<'static> {
    Plot::new(id.to_string())
        .x_axis_formatter(|mark, _range| date_axis_label(mark.value))
        .allow_scroll(false)
}

/// Monthly average retail gas price. Unaffected by the vehicle filters.
pub fn gas_price_plot(ui: &mut Ui, series: &[GasPricePoint]) {
    let points: PlotPoints = series
        .iter()
        .map(|p| [day_number(p.month), p.price_per_gallon])
        .collect();

    date_series_plot("gas_prices")
        .height(240.0)
        .y_axis_label("Dollars per Gallon")
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("Gas price").width(1.5));
        });
}

/// Statewide EV population over time. Unaffected by the vehicle filters.
pub fn ev_history_plot(ui: &mut Ui, series: &[EvHistoryPoint]) {
    let points: PlotPoints = series
        .iter()
        .map(|p| [day_number(p.date), p.ev_total as f64])
        .collect();

    date_series_plot("ev_history")
        .height(240.0)
        .y_axis_label("Registered EVs")
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("EV total").width(1.5));
        });
}
