use super::model::{EvType, VehicleDataset, VehicleRecord};

// ---------------------------------------------------------------------------
// Filter criteria: one value per selector in the side panel
// ---------------------------------------------------------------------------

/// Default year-range preselection, clamped into the dataset's real bounds.
pub const DEFAULT_YEAR_RANGE: (i32, i32) = (2010, 2023);

/// The user's current selections. `None` is the "All" choice: the predicate
/// for that field is skipped entirely. The year range is always applied,
/// inclusive on both ends.
///
/// A fresh value is produced on every interaction; the pipeline never keeps
/// a reference to it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub ev_type: Option<EvType>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year_range: (i32, i32),
}

impl Default for FilterCriteria {
    fn default() -> Self {
        FilterCriteria {
            ev_type: None,
            make: None,
            model: None,
            year_range: DEFAULT_YEAR_RANGE,
        }
    }
}

impl FilterCriteria {
    /// Everything at "All", with the year preselection clamped into the
    /// dataset's min/max model years.
    pub fn for_dataset(dataset: &VehicleDataset) -> Self {
        let year_range = match dataset.year_bounds() {
            Some((lo, hi)) => (
                DEFAULT_YEAR_RANGE.0.clamp(lo, hi),
                DEFAULT_YEAR_RANGE.1.clamp(lo, hi),
            ),
            None => DEFAULT_YEAR_RANGE,
        };
        FilterCriteria {
            year_range,
            ..FilterCriteria::default()
        }
    }

    /// Whether a record passes every active predicate. The predicates are
    /// independent equality/range checks combined with AND, so application
    /// order cannot change the outcome.
    pub fn matches(&self, rec: &VehicleRecord) -> bool {
        if let Some(ev_type) = self.ev_type {
            if rec.ev_type != ev_type {
                return false;
            }
        }
        if let Some(make) = &self.make {
            if rec.make != *make {
                return false;
            }
        }
        if let Some(model) = &self.model {
            if rec.model != *model {
                return false;
            }
        }
        let (lo, hi) = self.year_range;
        rec.model_year >= lo && rec.model_year <= hi
    }
}

/// Return indices of records passing the current criteria. An empty result
/// is a normal outcome, not an error; the views render it as an explicit
/// "no data" state.
pub fn filtered_indices(dataset: &VehicleDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CafvEligibility;

    fn record(make: &str, model: &str, year: i32, ev_type: EvType, range: u32) -> VehicleRecord {
        VehicleRecord {
            county: "King".to_string(),
            city: "Seattle".to_string(),
            make: make.to_string(),
            model: model.to_string(),
            model_year: year,
            ev_type,
            electric_range: range,
            cafv: CafvEligibility::Eligible,
            location: None,
        }
    }

    fn two_row_dataset() -> VehicleDataset {
        VehicleDataset::from_records(vec![
            record("Tesla", "Model 3", 2020, EvType::Bev, 250),
            record("Nissan", "Leaf", 2015, EvType::Bev, 150),
        ])
    }

    #[test]
    fn all_sentinels_return_every_row() {
        let ds = two_row_dataset();
        let criteria = FilterCriteria {
            year_range: (2010, 2023),
            ..FilterCriteria::default()
        };
        assert_eq!(filtered_indices(&ds, &criteria), vec![0, 1]);
    }

    #[test]
    fn make_filter_selects_matching_row() {
        let ds = two_row_dataset();
        let criteria = FilterCriteria {
            make: Some("Tesla".to_string()),
            year_range: (2010, 2023),
            ..FilterCriteria::default()
        };
        assert_eq!(filtered_indices(&ds, &criteria), vec![0]);
    }

    #[test]
    fn year_range_is_inclusive_on_both_ends() {
        let ds = two_row_dataset();
        let exact = FilterCriteria {
            year_range: (2015, 2020),
            ..FilterCriteria::default()
        };
        assert_eq!(filtered_indices(&ds, &exact), vec![0, 1]);

        let below = FilterCriteria {
            year_range: (2016, 2020),
            ..FilterCriteria::default()
        };
        assert_eq!(filtered_indices(&ds, &below), vec![0]);
    }

    #[test]
    fn disjoint_year_range_yields_empty_not_error() {
        let ds = two_row_dataset();
        let criteria = FilterCriteria {
            year_range: (2021, 2023),
            ..FilterCriteria::default()
        };
        assert!(filtered_indices(&ds, &criteria).is_empty());
    }

    #[test]
    fn predicates_combine_with_and() {
        let ds = VehicleDataset::from_records(vec![
            record("Tesla", "Model 3", 2020, EvType::Bev, 250),
            record("Tesla", "Model 3", 2020, EvType::Phev, 30),
            record("Tesla", "Model Y", 2020, EvType::Bev, 260),
            record("Nissan", "Leaf", 2020, EvType::Bev, 150),
        ]);
        let criteria = FilterCriteria {
            ev_type: Some(EvType::Bev),
            make: Some("Tesla".to_string()),
            model: Some("Model 3".to_string()),
            year_range: (2010, 2023),
        };
        let indices = filtered_indices(&ds, &criteria);
        assert_eq!(indices, vec![0]);
        for (i, rec) in ds.records.iter().enumerate() {
            // Soundness + completeness: membership in the result is exactly
            // "passes every predicate".
            assert_eq!(indices.contains(&i), criteria.matches(rec));
        }
    }

    #[test]
    fn default_year_range_clamps_into_dataset_bounds() {
        let ds = VehicleDataset::from_records(vec![
            record("Tesla", "Model 3", 2018, EvType::Bev, 250),
            record("Nissan", "Leaf", 2021, EvType::Bev, 150),
        ]);
        let criteria = FilterCriteria::for_dataset(&ds);
        assert_eq!(criteria.year_range, (2018, 2021));

        let wide = VehicleDataset::from_records(vec![
            record("Tesla", "Roadster", 2008, EvType::Bev, 220),
            record("Tesla", "Model 3", 2024, EvType::Bev, 260),
        ]);
        assert_eq!(FilterCriteria::for_dataset(&wide).year_range, (2010, 2023));
    }
}
