use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Datasets, VehicleDataset};
use crate::data::stats::RangeStats;
use crate::state::{AppState, Tab};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel – tab strip and the four views
// ---------------------------------------------------------------------------

/// Render the tab strip and the active view.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(datasets) = state.datasets.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data folder to explore EV registrations  (File → Open data folder…)");
        });
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            if ui
                .selectable_label(state.active_tab == tab, tab.label())
                .clicked()
            {
                state.active_tab = tab;
            }
        }
    });
    ui.separator();

    match state.active_tab {
        Tab::Table => table_view(ui, &datasets.vehicles, state),
        Tab::Map => map_view(ui, &datasets.vehicles, state),
        Tab::Range => range_view(ui, state),
        Tab::Stats => stats_view(ui, &datasets, state),
    }
}

fn no_data_warning(ui: &mut Ui) {
    ui.label(RichText::new("Warning: no data found. Change your filters.").color(Color32::YELLOW));
}

// ---------------------------------------------------------------------------
// Table view
// ---------------------------------------------------------------------------

fn table_view(ui: &mut Ui, vehicles: &VehicleDataset, state: &AppState) {
    if state.visible_indices.is_empty() {
        no_data_warning(ui);
        return;
    }

    const HEADERS: [&str; 8] = [
        "County", "City", "Make", "Model", "Year", "Type", "Range", "CAFV",
    ];

    let text_height = egui::TextStyle::Body.resolve(ui.style()).size + 4.0;
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(60.0), HEADERS.len())
        .header(text_height + 4.0, |mut header| {
            for title in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            // Virtualized: only the rows in view are laid out.
            body.rows(text_height, state.visible_indices.len(), |mut row| {
                let rec = &vehicles.records[state.visible_indices[row.index()]];
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.county);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.city);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.make);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.model);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.model_year.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.ev_type.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.electric_range.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.cafv.to_string());
                });
            });
        });
}

// ---------------------------------------------------------------------------
// Map view
// ---------------------------------------------------------------------------

fn map_view(ui: &mut Ui, vehicles: &VehicleDataset, state: &AppState) {
    if state.visible_indices.is_empty() {
        no_data_warning(ui);
        return;
    }

    let located = state
        .visible_indices
        .iter()
        .filter(|&&i| vehicles.records[i].location.is_some())
        .count();
    if located == 0 {
        ui.label("No location data for the current selection.");
        return;
    }

    ui.label(format!(
        "{located} of {} matching vehicles have coordinates",
        state.visible_indices.len()
    ));
    plot::map_scatter(ui, vehicles, &state.visible_indices, &state.type_colors);
}

// ---------------------------------------------------------------------------
// Electric-range view
// ---------------------------------------------------------------------------

fn range_view(ui: &mut Ui, state: &AppState) {
    ui.label("Vehicles recorded with a 0 electric range are ignored in the statistics below.");
    ui.add_space(4.0);

    match &state.criteria.model {
        // A specific model: the four summary tiles.
        Some(model) => {
            let make = state.criteria.make.as_deref().unwrap_or("");
            ui.strong(format!("Statistics: {make} {model}"));
            ui.add_space(4.0);
            match state.views.range_stats {
                Some(stats) => range_tiles(ui, stats),
                None => no_data_warning(ui),
            }
        }
        // All models: average range per (make, model).
        None => {
            ui.label("Select a model in the sidebar to see its statistics.");
            ui.add_space(4.0);
            if state.views.model_ranges.is_empty() {
                no_data_warning(ui);
            } else {
                plot::model_range_bars(ui, &state.views.model_ranges);
            }
        }
    }
}

fn range_tiles(ui: &mut Ui, stats: RangeStats) {
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Average Range", format!("{:.0}", stats.mean));
        metric(&mut cols[1], "Median Range", format!("{:.0}", stats.median));
        metric(&mut cols[2], "Max Range", stats.max.to_string());
        metric(&mut cols[3], "Min Range", stats.min.to_string());
    });
}

/// A small labelled number, Streamlit-metric style.
fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.heading(value);
    });
}

// ---------------------------------------------------------------------------
// Statistics view
// ---------------------------------------------------------------------------

fn stats_view(ui: &mut Ui, datasets: &Datasets, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Drivetrain and CAFV eligibility");
            ui.add_space(4.0);
            let types = state.views.type_counts;
            let cafv = state.views.cafv_counts;
            ui.columns(5, |cols: &mut [Ui]| {
                metric(&mut cols[0], "BEV", types.bev.to_string());
                metric(&mut cols[1], "PHEV", types.phev.to_string());
                metric(&mut cols[2], "CAFV eligible", cafv.eligible.to_string());
                metric(&mut cols[3], "Not eligible", cafv.not_eligible.to_string());
                metric(&mut cols[4], "Unknown", cafv.unknown.to_string());
            });
            ui.add_space(8.0);

            if state.visible_indices.is_empty() {
                no_data_warning(ui);
            } else {
                ui.separator();
                ui.strong("Top 20 cities");
                plot::count_bars(ui, "top_cities", &state.views.top_cities);

                ui.separator();
                ui.strong("Top 20 counties");
                plot::count_bars(ui, "top_counties", &state.views.top_counties);
            }

            // The two time series are fixed context, not filter outputs.
            ui.separator();
            ui.strong("Monthly gas price (US average)");
            plot::gas_price_plot(ui, &datasets.gas_prices);

            ui.separator();
            ui.strong("Washington EV population over time");
            plot::ev_history_plot(ui, &datasets.ev_history);
        });
}
