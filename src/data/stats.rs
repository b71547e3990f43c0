use std::collections::HashMap;

use super::model::{CafvEligibility, EvType, VehicleDataset, VehicleRecord};

/// Number of groups kept by the per-city and per-county rankings.
pub const TOP_N: usize = 20;

// ---------------------------------------------------------------------------
// Electric-range statistics
// ---------------------------------------------------------------------------

/// Summary of `electric_range` over a set of records. Ranges recorded as 0
/// mean "not recorded" and are excluded before anything is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeStats {
    pub mean: f64,
    pub median: f64,
    pub min: u32,
    pub max: u32,
}

/// Compute range statistics, skipping the zero sentinel. `None` when no
/// usable range remains, so callers render "no data" instead of a NaN.
pub fn range_stats<'a>(records: impl IntoIterator<Item = &'a VehicleRecord>) -> Option<RangeStats> {
    let mut ranges: Vec<u32> = records
        .into_iter()
        .map(|r| r.electric_range)
        .filter(|&r| r > 0)
        .collect();
    if ranges.is_empty() {
        return None;
    }
    ranges.sort_unstable();

    let n = ranges.len();
    let sum: u64 = ranges.iter().map(|&r| u64::from(r)).sum();
    let median = if n % 2 == 0 {
        (f64::from(ranges[n / 2 - 1]) + f64::from(ranges[n / 2])) / 2.0
    } else {
        f64::from(ranges[n / 2])
    };

    Some(RangeStats {
        mean: sum as f64 / n as f64,
        median,
        min: ranges[0],
        max: ranges[n - 1],
    })
}

// ---------------------------------------------------------------------------
// Group-by views
// ---------------------------------------------------------------------------

/// One ranked group of the city/county views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Group labels, count each group, rank by count descending, keep the top
/// `n`. The sort is stable, so equal counts keep first-seen table order.
pub fn top_counts<'a>(labels: impl IntoIterator<Item = &'a str>, n: usize) -> Vec<CategoryCount> {
    let mut order: Vec<(&'a str, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for label in labels {
        match index.get(label) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(label, order.len());
                order.push((label, 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.truncate(n);
    order
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

/// Mean electric range of one (make, model) group.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMeanRange {
    pub make: String,
    pub model: String,
    pub mean_range: f64,
}

/// Group by (make, model) in first-seen order and average `electric_range`.
/// Zero-range rows count toward the mean here, while [`range_stats`] drops
/// them; the two views intentionally disagree (see DESIGN.md).
pub fn mean_range_by_model<'a>(
    records: impl IntoIterator<Item = &'a VehicleRecord>,
) -> Vec<ModelMeanRange> {
    let mut order: Vec<(&'a str, &'a str)> = Vec::new();
    let mut groups: HashMap<(&'a str, &'a str), (u64, u64)> = HashMap::new();

    for rec in records {
        let key = (rec.make.as_str(), rec.model.as_str());
        let (sum, count) = groups.entry(key).or_insert_with(|| {
            order.push(key);
            (0, 0)
        });
        *sum += u64::from(rec.electric_range);
        *count += 1;
    }

    order
        .into_iter()
        .map(|key| {
            let (sum, count) = groups[&key];
            ModelMeanRange {
                make: key.0.to_string(),
                model: key.1.to_string(),
                mean_range: sum as f64 / count as f64,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Simple counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvTypeCounts {
    pub bev: usize,
    pub phev: usize,
}

pub fn ev_type_counts<'a>(records: impl IntoIterator<Item = &'a VehicleRecord>) -> EvTypeCounts {
    let mut counts = EvTypeCounts::default();
    for rec in records {
        match rec.ev_type {
            EvType::Bev => counts.bev += 1,
            EvType::Phev => counts.phev += 1,
        }
    }
    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CafvCounts {
    pub eligible: usize,
    pub not_eligible: usize,
    pub unknown: usize,
}

pub fn cafv_counts<'a>(records: impl IntoIterator<Item = &'a VehicleRecord>) -> CafvCounts {
    let mut counts = CafvCounts::default();
    for rec in records {
        match rec.cafv {
            CafvEligibility::Eligible => counts.eligible += 1,
            CafvEligibility::NotEligible => counts.not_eligible += 1,
            CafvEligibility::Unknown => counts.unknown += 1,
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// DerivedViews – one synchronous pass over the filtered rows
// ---------------------------------------------------------------------------

/// Everything the chart and statistics views render. Recomputed as a whole
/// whenever the filter selection changes; no view keeps state of its own.
#[derive(Debug, Clone, Default)]
pub struct DerivedViews {
    pub range_stats: Option<RangeStats>,
    pub model_ranges: Vec<ModelMeanRange>,
    pub top_cities: Vec<CategoryCount>,
    pub top_counties: Vec<CategoryCount>,
    pub type_counts: EvTypeCounts,
    pub cafv_counts: CafvCounts,
}

impl DerivedViews {
    pub fn compute(dataset: &VehicleDataset, indices: &[usize]) -> Self {
        let visible = || indices.iter().map(|&i| &dataset.records[i]);
        DerivedViews {
            range_stats: range_stats(visible()),
            model_ranges: mean_range_by_model(visible()),
            top_cities: top_counts(visible().map(|r| r.city.as_str()), TOP_N),
            top_counties: top_counts(visible().map(|r| r.county.as_str()), TOP_N),
            type_counts: ev_type_counts(visible()),
            cafv_counts: cafv_counts(visible()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_range(range: u32) -> VehicleRecord {
        record("Tesla", "Model 3", EvType::Bev, CafvEligibility::Eligible, range)
    }

    fn record(
        make: &str,
        model: &str,
        ev_type: EvType,
        cafv: CafvEligibility,
        range: u32,
    ) -> VehicleRecord {
        VehicleRecord {
            county: "King".to_string(),
            city: "Seattle".to_string(),
            make: make.to_string(),
            model: model.to_string(),
            model_year: 2020,
            ev_type,
            electric_range: range,
            cafv,
            location: None,
        }
    }

    #[test]
    fn range_stats_exclude_the_zero_sentinel() {
        let records: Vec<VehicleRecord> = [0, 50, 100].map(record_with_range).into_iter().collect();
        let stats = range_stats(records.iter()).unwrap();
        assert!((stats.mean - 75.0).abs() < f64::EPSILON);
        assert!((stats.median - 75.0).abs() < f64::EPSILON);
        assert_eq!(stats.min, 50);
        assert_eq!(stats.max, 100);
    }

    #[test]
    fn range_stats_on_nothing_usable_is_none() {
        assert!(range_stats([].iter()).is_none());
        let zeros: Vec<VehicleRecord> = [0, 0].map(record_with_range).into_iter().collect();
        assert!(range_stats(zeros.iter()).is_none());
    }

    #[test]
    fn median_of_odd_count_is_the_middle_value() {
        let records: Vec<VehicleRecord> = [30, 10, 20].map(record_with_range).into_iter().collect();
        let stats = range_stats(records.iter()).unwrap();
        assert!((stats.median - 20.0).abs() < f64::EPSILON);
        assert!((stats.mean - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn model_means_include_the_zero_sentinel() {
        let records: Vec<VehicleRecord> = [0, 50, 100].map(record_with_range).into_iter().collect();
        let means = mean_range_by_model(records.iter());
        assert_eq!(means.len(), 1);
        assert!((means[0].mean_range - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn model_means_group_by_make_and_model() {
        let records = vec![
            record("Tesla", "Model 3", EvType::Bev, CafvEligibility::Eligible, 250),
            record("Nissan", "Leaf", EvType::Bev, CafvEligibility::Eligible, 150),
            record("Tesla", "Model 3", EvType::Bev, CafvEligibility::Eligible, 200),
        ];
        let means = mean_range_by_model(records.iter());
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].make, "Tesla");
        assert_eq!(means[0].model, "Model 3");
        assert!((means[0].mean_range - 225.0).abs() < f64::EPSILON);
        assert_eq!(means[1].make, "Nissan");
    }

    #[test]
    fn top_counts_rank_descending_and_cap_at_n() {
        let labels = ["Olympia", "Seattle", "Seattle", "Tacoma", "Seattle", "Tacoma"];
        let ranked = top_counts(labels.into_iter(), 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "Seattle");
        assert_eq!(ranked[0].count, 3);
        assert_eq!(ranked[1].label, "Tacoma");
        assert_eq!(ranked[1].count, 2);
        assert!(ranked.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn top_counts_break_ties_by_first_seen_order() {
        let labels = ["Tacoma", "Olympia", "Olympia", "Tacoma", "Spokane"];
        let ranked = top_counts(labels.into_iter(), 10);
        assert_eq!(ranked[0].label, "Tacoma");
        assert_eq!(ranked[1].label, "Olympia");
        assert_eq!(ranked[2].label, "Spokane");
    }

    #[test]
    fn type_and_cafv_counts_add_up() {
        let records = vec![
            record("Tesla", "Model 3", EvType::Bev, CafvEligibility::Eligible, 250),
            record("BMW", "330e", EvType::Phev, CafvEligibility::NotEligible, 20),
            record("Kia", "Niro", EvType::Phev, CafvEligibility::Unknown, 0),
        ];
        let types = ev_type_counts(records.iter());
        assert_eq!(types, EvTypeCounts { bev: 1, phev: 2 });

        let cafv = cafv_counts(records.iter());
        assert_eq!(
            cafv,
            CafvCounts {
                eligible: 1,
                not_eligible: 1,
                unknown: 1
            }
        );
    }

    #[test]
    fn derived_views_follow_the_given_indices() {
        let dataset = VehicleDataset::from_records(vec![
            record("Tesla", "Model 3", EvType::Bev, CafvEligibility::Eligible, 250),
            record("BMW", "330e", EvType::Phev, CafvEligibility::NotEligible, 20),
            record("Kia", "Niro", EvType::Phev, CafvEligibility::Unknown, 0),
        ]);

        let views = DerivedViews::compute(&dataset, &[0, 2]);
        assert_eq!(views.type_counts, EvTypeCounts { bev: 1, phev: 1 });
        assert_eq!(views.model_ranges.len(), 2);
        // Only the Tesla contributes a usable range; the Kia's 0 is excluded.
        let stats = views.range_stats.unwrap();
        assert_eq!(stats.min, 250);
        assert_eq!(stats.max, 250);

        let empty = DerivedViews::compute(&dataset, &[]);
        assert!(empty.range_stats.is_none());
        assert!(empty.top_cities.is_empty());
    }
}
