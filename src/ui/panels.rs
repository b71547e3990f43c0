use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::EvType;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: EV type, make, cascading model, year range.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(datasets) = state.datasets.clone() else {
        ui.label("No data loaded.");
        return;
    };
    let vehicles = &datasets.vehicles;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- EV type ----
            ui.strong("EV Type");
            let type_text = state
                .criteria
                .ev_type
                .map(|t| t.to_string())
                .unwrap_or_else(|| "All".to_string());
            egui::ComboBox::from_id_salt("ev_type")
                .selected_text(type_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.criteria.ev_type.is_none(), "All")
                        .clicked()
                    {
                        state.set_ev_type(None);
                    }
                    for ev_type in EvType::ALL {
                        let selected = state.criteria.ev_type == Some(ev_type);
                        if ui
                            .selectable_label(selected, ev_type.to_string())
                            .clicked()
                        {
                            state.set_ev_type(Some(ev_type));
                        }
                    }
                });
            ui.add_space(8.0);

            // ---- Make ----
            ui.strong("Make");
            let make_text = state.criteria.make.clone().unwrap_or_else(|| "All".to_string());
            egui::ComboBox::from_id_salt("make")
                .selected_text(make_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.criteria.make.is_none(), "All")
                        .clicked()
                    {
                        state.set_make(None);
                    }
                    for make in vehicles.distinct_makes() {
                        let selected = state.criteria.make.as_deref() == Some(make.as_str());
                        if ui.selectable_label(selected, make).clicked() {
                            state.set_make(Some(make.clone()));
                        }
                    }
                });
            ui.add_space(8.0);

            // ---- Model (cascades from the make; empty under "All") ----
            ui.strong("Model");
            let models: &[String] = match &state.criteria.make {
                Some(make) => vehicles.models_for_make(make),
                None => &[],
            };
            let model_text = state.criteria.model.clone().unwrap_or_else(|| "All".to_string());
            egui::ComboBox::from_id_salt("model")
                .selected_text(model_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.criteria.model.is_none(), "All")
                        .clicked()
                    {
                        state.set_model(None);
                    }
                    for model in models {
                        let selected = state.criteria.model.as_deref() == Some(model.as_str());
                        if ui.selectable_label(selected, model).clicked() {
                            state.set_model(Some(model.clone()));
                        }
                    }
                });
            ui.add_space(8.0);

            // ---- Model year range ----
            ui.strong("Model Year");
            let (bound_lo, bound_hi) = vehicles.year_bounds().unwrap_or(state.criteria.year_range);
            let (mut lo, mut hi) = state.criteria.year_range;
            let mut changed = false;
            ui.horizontal(|ui: &mut Ui| {
                ui.label("From");
                changed |= ui
                    .add(egui::Slider::new(&mut lo, bound_lo..=bound_hi))
                    .changed();
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("To");
                changed |= ui
                    .add(egui::Slider::new(&mut hi, bound_lo..=bound_hi))
                    .changed();
            });
            if changed {
                state.set_year_range(lo, hi);
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
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.data_dir.is_some(), egui::Button::new("Reload data"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.datasets {
            ui.label(format!(
                "{} vehicles loaded, {} matching",
                ds.vehicles.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

/// Pick the directory holding the three CSV exports and load it.
pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open EV data folder")
        .pick_folder();

    if let Some(dir) = folder {
        state.load_data_dir(&dir);
    }
}
