/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  coerce cells, drop incomplete / pre-cutoff rows
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ GamesTable │  immutable Vec<Record>, distinct-value indices
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → predicates → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  scores by genre, releases per (year, platform)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
