/// Data layer: measurement types, loading, selection and matrix assembly.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv / measurement directory
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse input → MeasurementSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  metadata selection + perturbation order → indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  prepare  │  crop, subtract reference → data Matrix
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod prepare;
