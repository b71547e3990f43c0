use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::filter::{FilterCriteria, filtered_indices};
use crate::data::loader::{self, DataPaths};
use crate::data::model::{Datasets, EvType};
use crate::data::stats::DerivedViews;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The central-panel tab the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Table,
    Map,
    Range,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Table, Tab::Map, Tab::Range, Tab::Stats];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Table => "Table",
            Tab::Map => "Washington Map",
            Tab::Range => "Electric Range",
            Tab::Stats => "Statistics",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded tables (None until a data folder is opened).
    pub datasets: Option<Arc<Datasets>>,

    /// Directory the tables were loaded from, for the reload action.
    pub data_dir: Option<PathBuf>,

    /// Current selector values from the side panel.
    pub criteria: FilterCriteria,

    /// Indices of vehicle records passing the current criteria (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates over the visible records, recomputed on every change.
    pub views: DerivedViews,

    /// Which central tab is active.
    pub active_tab: Tab,

    /// Colours for the BEV/PHEV series on the map.
    pub type_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        let type_labels: Vec<String> = EvType::ALL.iter().map(|t| t.to_string()).collect();
        Self {
            datasets: None,
            data_dir: None,
            criteria: FilterCriteria::default(),
            visible_indices: Vec::new(),
            views: DerivedViews::default(),
            active_tab: Tab::Table,
            type_colors: ColorMap::new(&type_labels),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest freshly loaded tables: reset the selectors to their defaults
    /// and compute the initial views.
    pub fn set_datasets(&mut self, datasets: Arc<Datasets>, dir: PathBuf) {
        self.criteria = FilterCriteria::for_dataset(&datasets.vehicles);
        self.datasets = Some(datasets);
        self.data_dir = Some(dir);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and the derived views after any selector
    /// change. One synchronous pass; nothing else caches.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.datasets {
            self.visible_indices = filtered_indices(&ds.vehicles, &self.criteria);
            self.views = DerivedViews::compute(&ds.vehicles, &self.visible_indices);
        } else {
            self.visible_indices.clear();
            self.views = DerivedViews::default();
        }
    }

    /// Change the EV-type selector (`None` = All).
    pub fn set_ev_type(&mut self, ev_type: Option<EvType>) {
        if self.criteria.ev_type != ev_type {
            self.criteria.ev_type = ev_type;
            self.refilter();
        }
    }

    /// Change the make selector. The model list cascades from the make, so
    /// the model selection resets to All whenever the make changes.
    pub fn set_make(&mut self, make: Option<String>) {
        if self.criteria.make != make {
            self.criteria.make = make;
            self.criteria.model = None;
            self.refilter();
        }
    }

    /// Change the model selector (`None` = All).
    pub fn set_model(&mut self, model: Option<String>) {
        if self.criteria.model != model {
            self.criteria.model = model;
            self.refilter();
        }
    }

    /// Apply an edited year range, keeping it ordered.
    pub fn set_year_range(&mut self, lo: i32, hi: i32) {
        let range = if lo <= hi { (lo, hi) } else { (hi, lo) };
        if self.criteria.year_range != range {
            self.criteria.year_range = range;
            self.refilter();
        }
    }

    /// Load the three tables from a data directory (cached per path set).
    pub fn load_data_dir(&mut self, dir: &Path) {
        let paths = DataPaths::in_dir(dir);
        match loader::load_datasets_cached(&paths) {
            Ok(datasets) => {
                log::info!(
                    "Loaded {} WA vehicles, {} gas-price months, {} EV-history points from {}",
                    datasets.vehicles.len(),
                    datasets.gas_prices.len(),
                    datasets.ev_history.len(),
                    dir.display()
                );
                self.set_datasets(datasets, dir.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load data: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Drop the load cache and re-read the current data directory.
    pub fn reload(&mut self) {
        loader::invalidate_cache();
        if let Some(dir) = self.data_dir.clone() {
            self.load_data_dir(&dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CafvEligibility, VehicleDataset, VehicleRecord};

    fn record(make: &str, model: &str, year: i32) -> VehicleRecord {
        VehicleRecord {
            county: "King".to_string(),
            city: "Seattle".to_string(),
            make: make.to_string(),
            model: model.to_string(),
            model_year: year,
            ev_type: EvType::Bev,
            electric_range: 200,
            cafv: CafvEligibility::Eligible,
            location: None,
        }
    }

    fn state_with_rows(rows: Vec<VehicleRecord>) -> AppState {
        let datasets = Datasets {
            vehicles: VehicleDataset::from_records(rows),
            ..Datasets::default()
        };
        let mut state = AppState::default();
        state.set_datasets(Arc::new(datasets), PathBuf::from("data"));
        state
    }

    #[test]
    fn set_datasets_starts_with_everything_visible() {
        let state = state_with_rows(vec![
            record("Tesla", "Model 3", 2020),
            record("Nissan", "Leaf", 2015),
        ]);
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.views.type_counts.bev, 2);
    }

    #[test]
    fn changing_make_resets_the_model_selection() {
        let mut state = state_with_rows(vec![
            record("Tesla", "Model 3", 2020),
            record("Nissan", "Leaf", 2015),
        ]);

        state.set_make(Some("Tesla".to_string()));
        state.set_model(Some("Model 3".to_string()));
        assert_eq!(state.visible_indices, vec![0]);

        state.set_make(Some("Nissan".to_string()));
        assert_eq!(state.criteria.model, None);
        assert_eq!(state.visible_indices, vec![1]);
    }

    #[test]
    fn year_range_edits_stay_ordered_and_refilter() {
        let mut state = state_with_rows(vec![
            record("Tesla", "Model 3", 2020),
            record("Nissan", "Leaf", 2015),
        ]);

        state.set_year_range(2021, 2016);
        assert_eq!(state.criteria.year_range, (2016, 2021));
        assert_eq!(state.visible_indices, vec![0]);
        assert!(state.views.range_stats.is_some());
    }
}
