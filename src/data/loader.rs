use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use super::model::{
    CafvEligibility, Datasets, EvHistoryPoint, EvType, GasPricePoint, GeoPoint, VehicleDataset,
    VehicleRecord,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure while loading one of the source files. Any error aborts the whole
/// load; the dashboard never runs on a partial set of tables.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl LoadError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn parse(path: &Path, message: impl Into<String>) -> Self {
        LoadError::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Classify a `csv` crate error: I/O failures keep their own variant so a
/// missing or unreadable file is distinguishable from malformed content.
fn csv_error(path: &Path, err: csv::Error) -> LoadError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::io(path, source),
        _ => LoadError::parse(path, message),
    }
}

// ---------------------------------------------------------------------------
// Source file locations
// ---------------------------------------------------------------------------

pub const VEHICLE_FILE: &str = "Electric_Vehicle_Population_Data.csv";
pub const GAS_PRICE_FILE: &str = "Monthly_Gas_Prices.csv";
pub const EV_HISTORY_FILE: &str = "Electric_Vehicle_Population_Size_History.csv";

/// The three source files a dashboard session works from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub vehicles: PathBuf,
    pub gas_prices: PathBuf,
    pub ev_history: PathBuf,
}

impl DataPaths {
    /// Conventional file names inside a data directory.
    pub fn in_dir(dir: &Path) -> Self {
        DataPaths {
            vehicles: dir.join(VEHICLE_FILE),
            gas_prices: dir.join(GAS_PRICE_FILE),
            ev_history: dir.join(EV_HISTORY_FILE),
        }
    }

    /// Whether all three files are present (startup probe for `./data`).
    pub fn all_exist(&self) -> bool {
        self.vehicles.is_file() && self.gas_prices.is_file() && self.ev_history.is_file()
    }
}

/// Default location the app looks in at startup.
pub fn default_data_paths() -> DataPaths {
    DataPaths::in_dir(Path::new("data"))
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Load all three tables from disk. Pure with respect to process state; see
/// [`load_datasets_cached`] for the memoized variant the UI uses.
pub fn load_datasets(paths: &DataPaths) -> Result<Datasets, LoadError> {
    let vehicles = load_vehicles(&paths.vehicles)?;
    let gas_prices = load_gas_prices(&paths.gas_prices)?;
    let ev_history = load_ev_history(&paths.ev_history)?;
    Ok(Datasets {
        vehicles,
        gas_prices,
        ev_history,
    })
}

/// Single-entry cache: the last successfully loaded path set and its tables.
static CACHE: Mutex<Option<(DataPaths, Arc<Datasets>)>> = Mutex::new(None);

/// Load with process-lifetime caching keyed by the path set. Repeated calls
/// with the same paths return the same `Arc` without touching disk; a new
/// path set replaces the cache entry. Failures are never cached.
pub fn load_datasets_cached(paths: &DataPaths) -> Result<Arc<Datasets>, LoadError> {
    let mut cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some((cached_paths, datasets)) = cache.as_ref() {
        if cached_paths == paths {
            return Ok(Arc::clone(datasets));
        }
    }

    let datasets = Arc::new(load_datasets(paths)?);
    *cache = Some((paths.clone(), Arc::clone(&datasets)));
    Ok(datasets)
}

/// Drop the cached tables so the next load re-reads from disk. Used by the
/// "Reload data" action and by tests.
pub fn invalidate_cache() {
    *CACHE.lock().unwrap_or_else(PoisonError::into_inner) = None;
}

// ---------------------------------------------------------------------------
// Vehicle population table
// ---------------------------------------------------------------------------

/// The columns we consume from the registration export. Extra columns in the
/// file (VIN, MSRP, utility, census tract, …) are ignored.
#[derive(Debug, Deserialize)]
struct RawVehicleRow {
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "County")]
    county: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Make")]
    make: String,
    #[serde(rename = "Model")]
    model: String,
    #[serde(rename = "Model Year")]
    model_year: i32,
    #[serde(rename = "Electric Vehicle Type")]
    ev_type: String,
    /// Empty in some rows; empty means "not recorded".
    #[serde(rename = "Electric Range")]
    electric_range: Option<u32>,
    #[serde(rename = "Clean Alternative Fuel Vehicle (CAFV) Eligibility")]
    cafv: String,
    #[serde(rename = "Vehicle Location", default)]
    location: String,
}

fn load_vehicles(path: &Path) -> Result<VehicleDataset, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<RawVehicleRow>().enumerate() {
        let raw = result.map_err(|e| csv_error(path, e))?;

        // Out-of-state registrations are dropped before any normalization.
        if raw.state != "WA" {
            continue;
        }

        let ev_type = EvType::from_label(&raw.ev_type).ok_or_else(|| {
            LoadError::parse(
                path,
                format!("row {row_no}: unknown EV type {:?}", raw.ev_type),
            )
        })?;
        let cafv = CafvEligibility::from_label(&raw.cafv).ok_or_else(|| {
            LoadError::parse(
                path,
                format!("row {row_no}: unknown CAFV eligibility {:?}", raw.cafv),
            )
        })?;

        records.push(VehicleRecord {
            county: raw.county,
            city: raw.city,
            make: raw.make,
            model: raw.model,
            model_year: raw.model_year,
            ev_type,
            electric_range: raw.electric_range.unwrap_or(0),
            cafv,
            location: parse_point(&raw.location),
        });
    }

    Ok(VehicleDataset::from_records(records))
}

/// Extract coordinates from a `POINT (<lon> <lat>)` well-known-text string.
/// Anything that does not yield exactly two floats inside the parentheses
/// gives `None`; a partial pair is never produced.
fn parse_point(location: &str) -> Option<GeoPoint> {
    let open = location.find('(')?;
    let close = location.rfind(')')?;
    let inner = location.get(open + 1..close)?;

    let mut tokens = inner.split_whitespace();
    let lon: f64 = tokens.next()?.parse().ok()?;
    let lat: f64 = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some(GeoPoint { lat, lon })
}

// ---------------------------------------------------------------------------
// Gas price time series
// ---------------------------------------------------------------------------

/// The price column header varies between exports of this series, so the
/// loader requires `Month` first and takes the price from the second column.
fn load_gas_prices(path: &Path) -> Result<Vec<GasPricePoint>, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers().map_err(|e| csv_error(path, e))?;
    if headers.get(0) != Some("Month") {
        return Err(LoadError::parse(
            path,
            format!(
                "expected 'Month' as the first column, found {:?}",
                headers.get(0).unwrap_or("")
            ),
        ));
    }
    if headers.len() < 2 {
        return Err(LoadError::parse(path, "expected a price column after 'Month'"));
    }

    let mut points = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| csv_error(path, e))?;

        let label = record.get(0).unwrap_or("");
        let month = parse_month_label(label).ok_or_else(|| {
            LoadError::parse(path, format!("row {row_no}: bad month label {label:?}"))
        })?;

        let raw_price = record.get(1).unwrap_or("");
        let price_per_gallon: f64 = raw_price.trim().parse().map_err(|_| {
            LoadError::parse(path, format!("row {row_no}: bad price {raw_price:?}"))
        })?;

        points.push(GasPricePoint {
            month,
            price_per_gallon,
        });
    }
    Ok(points)
}

/// `"Jan-23"` → 2023-01-01. The label carries no day, so the point is pinned
/// to the first of the month.
fn parse_month_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("01-{}", label.trim()), "%d-%b-%y").ok()
}

// ---------------------------------------------------------------------------
// EV population history
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawHistoryRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Electric Vehicle (EV) Total")]
    ev_total: u64,
}

fn load_ev_history(path: &Path) -> Result<Vec<EvHistoryPoint>, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut points = Vec::new();
    for (row_no, result) in reader.deserialize::<RawHistoryRow>().enumerate() {
        let raw = result.map_err(|e| csv_error(path, e))?;
        let date = parse_history_date(&raw.date).ok_or_else(|| {
            LoadError::parse(path, format!("row {row_no}: bad date label {:?}", raw.date))
        })?;
        points.push(EvHistoryPoint {
            date,
            ev_total: raw.ev_total,
        });
    }
    Ok(points)
}

/// `"January 31 2023"` → calendar date. Some exports write a comma after the
/// day; both spellings are accepted.
fn parse_history_date(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    NaiveDate::parse_from_str(label, "%B %d %Y")
        .or_else(|_| NaiveDate::parse_from_str(label, "%B %d, %Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_point_coordinates() {
        let p = parse_point("POINT (-122.23825 47.49461)").unwrap();
        assert!((p.lon - -122.23825).abs() < f64::EPSILON);
        assert!((p.lat - 47.49461).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_malformed_points() {
        assert!(parse_point("").is_none());
        assert!(parse_point("POINT ()").is_none());
        assert!(parse_point("POINT (-122.23825)").is_none());
        assert!(parse_point("POINT (-122.2 47.4 12.0)").is_none());
        assert!(parse_point("POINT (abc 47.4)").is_none());
        assert!(parse_point("-122.2 47.4").is_none());
    }

    #[test]
    fn parses_month_labels_to_first_of_month() {
        assert_eq!(
            parse_month_label("Jan-23"),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        assert_eq!(
            parse_month_label("Aug-98"),
            NaiveDate::from_ymd_opt(1998, 8, 1)
        );
        assert_eq!(parse_month_label("2023-01"), None);
    }

    #[test]
    fn parses_history_dates_with_and_without_comma() {
        assert_eq!(
            parse_history_date("January 31 2023"),
            NaiveDate::from_ymd_opt(2023, 1, 31)
        );
        assert_eq!(
            parse_history_date("January 31, 2023"),
            NaiveDate::from_ymd_opt(2023, 1, 31)
        );
        assert_eq!(parse_history_date("31 January 2023"), None);
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const VEHICLE_CSV: &str = "\
County,City,State,Make,Model,Model Year,Electric Vehicle Type,Clean Alternative Fuel Vehicle (CAFV) Eligibility,Electric Range,Vehicle Location
King,Seattle,WA,TESLA,MODEL 3,2020,Battery Electric Vehicle (BEV),Clean Alternative Fuel Vehicle Eligible,266,POINT (-122.33 47.60)
Clark,Vancouver,WA,NISSAN,LEAF,2015,Battery Electric Vehicle (BEV),Clean Alternative Fuel Vehicle Eligible,84,POINT (-122.66 45.63)
Multnomah,Portland,OR,TESLA,MODEL Y,2021,Battery Electric Vehicle (BEV),Eligibility unknown as battery range has not been researched,,POINT (-122.67 45.52)
Kitsap,Bremerton,WA,BMW,330E,2021,Plug-in Hybrid Electric Vehicle (PHEV),Not eligible due to low battery range,,
";

    const GAS_CSV: &str = "\
Month,U.S. All Grades Retail Gasoline Prices (Dollars per Gallon)
Jan-23,3.445
Feb-23,3.497
";

    const HISTORY_CSV: &str = "\
Date,Electric Vehicle (EV) Total
January 31 2023,104714
February 28 2023,107524
";

    fn write_sources(dir: &Path) -> DataPaths {
        DataPaths {
            vehicles: write_file(dir, VEHICLE_FILE, VEHICLE_CSV),
            gas_prices: write_file(dir, GAS_PRICE_FILE, GAS_CSV),
            ev_history: write_file(dir, EV_HISTORY_FILE, HISTORY_CSV),
        }
    }

    #[test]
    fn keeps_washington_rows_only() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sources(dir.path());

        let datasets = load_datasets(&paths).unwrap();
        let vehicles = &datasets.vehicles;
        assert_eq!(vehicles.len(), 3);
        assert!(vehicles.records.iter().all(|r| r.make != "TESLA" || r.model != "MODEL Y"));

        // Missing range becomes the "not recorded" sentinel, missing
        // location stays None.
        let bmw = vehicles
            .records
            .iter()
            .find(|r| r.make == "BMW")
            .unwrap();
        assert_eq!(bmw.electric_range, 0);
        assert!(bmw.location.is_none());

        assert_eq!(datasets.gas_prices.len(), 2);
        assert_eq!(datasets.ev_history.len(), 2);
        assert_eq!(datasets.ev_history[0].ev_total, 104_714);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_sources(dir.path());
        paths.vehicles = dir.path().join("nope.csv");

        match load_datasets(&paths) {
            Err(LoadError::Io { path, .. }) => assert!(path.ends_with("nope.csv")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn bad_month_label_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_sources(dir.path());
        paths.gas_prices = write_file(
            dir.path(),
            "bad_gas.csv",
            "Month,Price\nJan-23,3.4\nSometime,3.5\n",
        );

        match load_datasets(&paths) {
            Err(LoadError::Parse { message, .. }) => assert!(message.contains("Sometime")),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_ev_type_label_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_sources(dir.path());
        paths.vehicles = write_file(
            dir.path(),
            "bad_vehicles.csv",
            "\
County,City,State,Make,Model,Model Year,Electric Vehicle Type,Clean Alternative Fuel Vehicle (CAFV) Eligibility,Electric Range,Vehicle Location
King,Seattle,WA,TESLA,MODEL 3,2020,Steam Powered,Clean Alternative Fuel Vehicle Eligible,266,
",
        );

        match load_datasets(&paths) {
            Err(LoadError::Parse { message, .. }) => assert!(message.contains("Steam Powered")),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn cache_returns_same_tables_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sources(dir.path());

        invalidate_cache();
        let first = load_datasets_cached(&paths).unwrap();
        let second = load_datasets_cached(&paths).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        invalidate_cache();
        let third = load_datasets_cached(&paths).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first.vehicles.len(), third.vehicles.len());
        invalidate_cache();
    }
}
