use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range_i(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }
}

const BEV_LABEL: &str = "Battery Electric Vehicle (BEV)";
const PHEV_LABEL: &str = "Plug-in Hybrid Electric Vehicle (PHEV)";
const CAFV_ELIGIBLE: &str = "Clean Alternative Fuel Vehicle Eligible";
const CAFV_NOT_ELIGIBLE: &str = "Not eligible due to low battery range";
const CAFV_UNKNOWN: &str = "Eligibility unknown as battery range has not been researched";

/// (make, model, BEV?, typical rated range in miles)
const MODELS: [(&str, &str, bool, u32); 10] = [
    ("TESLA", "MODEL 3", true, 250),
    ("TESLA", "MODEL Y", true, 290),
    ("NISSAN", "LEAF", true, 150),
    ("CHEVROLET", "BOLT EV", true, 238),
    ("KIA", "NIRO", true, 230),
    ("VOLKSWAGEN", "ID.4", true, 260),
    ("BMW", "330E", false, 22),
    ("TOYOTA", "PRIUS PRIME", false, 25),
    ("CHRYSLER", "PACIFICA", false, 32),
    ("VOLVO", "XC90", false, 18),
];

/// (county, city, lon, lat) anchors; points get jitter around the anchor.
const PLACES: [(&str, &str, f64, f64); 8] = [
    ("King", "Seattle", -122.33, 47.60),
    ("King", "Bellevue", -122.20, 47.61),
    ("Snohomish", "Everett", -122.20, 47.98),
    ("Pierce", "Tacoma", -122.44, 47.25),
    ("Clark", "Vancouver", -122.66, 45.63),
    ("Spokane", "Spokane", -117.43, 47.66),
    ("Thurston", "Olympia", -122.90, 47.04),
    ("Kitsap", "Bremerton", -122.63, 47.57),
];

fn write_vehicles(dir: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let path = dir.join("Electric_Vehicle_Population_Data.csv");
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "County",
        "City",
        "State",
        "Make",
        "Model",
        "Model Year",
        "Electric Vehicle Type",
        "Clean Alternative Fuel Vehicle (CAFV) Eligibility",
        "Electric Range",
        "Vehicle Location",
    ])?;

    let n = 600;
    for i in 0..n {
        let &(make, model, bev, base_range) = rng.pick(&MODELS);
        let &(county, city, lon, lat) = rng.pick(&PLACES);

        // A few out-of-state registrations; the loader drops these.
        let state = if i % 40 == 0 { "OR" } else { "WA" };
        let year = rng.range_i(2011, 2024);

        // Roughly one row in eight has no recorded range (empty cell);
        // eligibility has not been researched for those.
        let range_known = rng.next_f64() > 0.125;
        let range = if range_known {
            let jitter = rng.range_i(-20, 20).max(-(i64::from(base_range) - 10));
            (i64::from(base_range) + jitter) as u32
        } else {
            0
        };
        let cafv = if !range_known {
            CAFV_UNKNOWN
        } else if range >= 30 {
            CAFV_ELIGIBLE
        } else {
            CAFV_NOT_ELIGIBLE
        };

        // Most rows carry coordinates; some exports leave the cell blank.
        let location = if rng.next_f64() > 0.05 {
            format!(
                "POINT ({:.5} {:.5})",
                lon + (rng.next_f64() - 0.5) * 0.2,
                lat + (rng.next_f64() - 0.5) * 0.2
            )
        } else {
            String::new()
        };

        let range_cell = if range_known {
            range.to_string()
        } else {
            String::new()
        };
        writer.write_record([
            county,
            city,
            state,
            make,
            model,
            &year.to_string(),
            if bev { BEV_LABEL } else { PHEV_LABEL },
            cafv,
            &range_cell,
            &location,
        ])?;
    }
    writer.flush()?;
    Ok(n)
}

fn write_gas_prices(dir: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let path = dir.join("Monthly_Gas_Prices.csv");
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "Month",
        "U.S. All Grades All Formulations Retail Gasoline Prices (Dollars per Gallon)",
    ])?;

    let mut price = 2.4;
    let mut months = 0;
    for year in 2017..=2023 {
        for month in 1..=12 {
            let date = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
            price = (price + (rng.next_f64() - 0.45) * 0.25).clamp(1.8, 5.0);
            writer.write_record([date.format("%b-%y").to_string(), format!("{price:.3}")])?;
            months += 1;
        }
    }
    writer.flush()?;
    Ok(months)
}

fn write_ev_history(dir: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let path = dir.join("Electric_Vehicle_Population_Size_History.csv");
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["Date", "Electric Vehicle (EV) Total"])?;

    let mut total: u64 = 24_000;
    let mut points = 0;
    for year in 2017..=2023 {
        for month in 1..=12 {
            // Last day of the month, as the real export reports it.
            let next = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1)
            };
            let date = next.unwrap().pred_opt().unwrap();

            total += 500 + rng.next_u64() % 1500;
            writer.write_record([date.format("%B %d %Y").to_string(), total.to_string()])?;
            points += 1;
        }
    }
    writer.flush()?;
    Ok(points)
}

fn main() -> Result<()> {
    let dir = Path::new("data");
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let vehicles = write_vehicles(dir, &mut rng)?;
    let months = write_gas_prices(dir, &mut rng)?;
    let points = write_ev_history(dir, &mut rng)?;

    println!(
        "Wrote {vehicles} vehicle rows, {months} gas-price months, {points} EV-history points to {}",
        dir.display()
    );
    Ok(())
}
