//! Data layer: core types, loading, and filtering.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → rows, conform to Schema
//!   └──────────┘
//!        │
//!        ▼
//!   ┌─────────────┐
//!   │ RecordStore  │  Vec<Record>, column index
//!   └─────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  apply FilterConfig → filtered records
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
