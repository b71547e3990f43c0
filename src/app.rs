use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, views};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EvDashApp {
    pub state: AppState,
}

impl Default for EvDashApp {
    fn default() -> Self {
        Self {
            state: AppState::default(),
        }
    }
}

impl EvDashApp {
    /// Start with the conventional `./data` directory already loaded if its
    /// three files are present; otherwise start empty with a hint.
    pub fn with_default_data() -> Self {
        let mut app = Self::default();
        let paths = crate::data::loader::default_data_paths();
        if paths.all_exist() {
            app.state.load_data_dir(std::path::Path::new("data"));
        } else {
            log::info!("no ./data directory with the three CSV exports; waiting for File → Open");
        }
        app
    }
}

impl eframe::App for EvDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabbed views ----
        egui::CentralPanel::default().show(ctx, |ui| {
            views::central_panel(ui, &mut self.state);
        });
    }
}
