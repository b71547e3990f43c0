/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  three CSV exports
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files → Datasets (WA rows only, lat/lon split)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Datasets  │  VehicleDataset + gas-price / EV-history series
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐     ┌──────────┐
///   │  filter   │ ──▶ │  stats    │  criteria → indices → derived views
///   └──────────┘     └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
