use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// EvType – drivetrain classification
// ---------------------------------------------------------------------------

/// Electric-vehicle drivetrain type, as labelled in the registration export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvType {
    Bev,
    Phev,
}

impl EvType {
    pub const ALL: [EvType; 2] = [EvType::Bev, EvType::Phev];

    /// Parse the long-form label used by the source CSV.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Battery Electric Vehicle (BEV)" => Some(EvType::Bev),
            "Plug-in Hybrid Electric Vehicle (PHEV)" => Some(EvType::Phev),
            _ => None,
        }
    }
}

impl fmt::Display for EvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvType::Bev => write!(f, "BEV"),
            EvType::Phev => write!(f, "PHEV"),
        }
    }
}

// ---------------------------------------------------------------------------
// CafvEligibility – Clean Alternative Fuel Vehicle classification
// ---------------------------------------------------------------------------

/// CAFV eligibility as recorded by the Washington Department of Licensing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CafvEligibility {
    Eligible,
    /// Not eligible because the battery range is too low.
    NotEligible,
    /// Range has not been researched yet.
    Unknown,
}

impl CafvEligibility {
    /// Parse the long-form label used by the source CSV.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Clean Alternative Fuel Vehicle Eligible" => Some(CafvEligibility::Eligible),
            "Not eligible due to low battery range" => Some(CafvEligibility::NotEligible),
            "Eligibility unknown as battery range has not been researched" => {
                Some(CafvEligibility::Unknown)
            }
            _ => None,
        }
    }
}

impl fmt::Display for CafvEligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CafvEligibility::Eligible => write!(f, "Eligible"),
            CafvEligibility::NotEligible => write!(f, "Not eligible (low range)"),
            CafvEligibility::Unknown => write!(f, "Unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// GeoPoint – registration coordinates
// ---------------------------------------------------------------------------

/// Parsed `Vehicle Location` coordinates. Latitude and longitude are always
/// present together; rows whose location string does not parse carry no
/// `GeoPoint` at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

// ---------------------------------------------------------------------------
// VehicleRecord – one row of the registration table
// ---------------------------------------------------------------------------

/// A single registered vehicle. The loader keeps Washington rows only, so
/// every record in a [`VehicleDataset`] is implicitly `State == "WA"`.
#[derive(Debug, Clone)]
pub struct VehicleRecord {
    pub county: String,
    pub city: String,
    pub make: String,
    pub model: String,
    pub model_year: i32,
    pub ev_type: EvType,
    /// Rated electric-only range in miles; 0 means "not recorded".
    pub electric_range: u32,
    pub cafv: CafvEligibility,
    pub location: Option<GeoPoint>,
}

// ---------------------------------------------------------------------------
// VehicleDataset – the registration table with precomputed indices
// ---------------------------------------------------------------------------

/// The full vehicle table plus the lookups the filter panel needs: distinct
/// makes, distinct models per make, and the model-year bounds. Uniques keep
/// the order in which values first appear in the file, mirroring how the
/// selectors in the source dashboard were populated.
#[derive(Debug, Clone, Default)]
pub struct VehicleDataset {
    pub records: Vec<VehicleRecord>,
    makes: Vec<String>,
    models_by_make: HashMap<String, Vec<String>>,
    year_bounds: Option<(i32, i32)>,
}

impl VehicleDataset {
    /// Build the dataset and its selector indices from loaded records.
    pub fn from_records(records: Vec<VehicleRecord>) -> Self {
        let mut makes: Vec<String> = Vec::new();
        let mut models_by_make: HashMap<String, Vec<String>> = HashMap::new();
        let mut year_bounds: Option<(i32, i32)> = None;

        for rec in &records {
            if !makes.contains(&rec.make) {
                makes.push(rec.make.clone());
            }
            let models = models_by_make.entry(rec.make.clone()).or_default();
            if !models.contains(&rec.model) {
                models.push(rec.model.clone());
            }
            year_bounds = Some(match year_bounds {
                Some((lo, hi)) => (lo.min(rec.model_year), hi.max(rec.model_year)),
                None => (rec.model_year, rec.model_year),
            });
        }

        VehicleDataset {
            records,
            makes,
            models_by_make,
            year_bounds,
        }
    }

    /// Number of vehicle records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct makes over the whole (unfiltered) table, first-seen order.
    pub fn distinct_makes(&self) -> &[String] {
        &self.makes
    }

    /// Distinct models observed on rows of the given make, first-seen order.
    /// Unknown makes yield an empty slice.
    pub fn models_for_make(&self, make: &str) -> &[String] {
        self.models_by_make
            .get(make)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Min/max model year over the whole table, `None` when empty.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.year_bounds
    }
}

// ---------------------------------------------------------------------------
// Auxiliary time series
// ---------------------------------------------------------------------------

/// One month of the national average retail gas price series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasPricePoint {
    /// First day of the month the price was reported for.
    pub month: NaiveDate,
    pub price_per_gallon: f64,
}

/// One snapshot of the statewide EV population count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvHistoryPoint {
    pub date: NaiveDate,
    pub ev_total: u64,
}

// ---------------------------------------------------------------------------
// Datasets – everything the dashboard works from
// ---------------------------------------------------------------------------

/// The three loaded tables. Immutable after loading; the two time series are
/// never touched by the vehicle filters.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub vehicles: VehicleDataset,
    pub gas_prices: Vec<GasPricePoint>,
    pub ev_history: Vec<EvHistoryPoint>,
}
