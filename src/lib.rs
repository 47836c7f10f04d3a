//! Extraction, normalization and geocoding for the Beijing historical
//! geography datasets.
//!
//! ```text
//! JSON sources ──► loader ──► dynasty / metrics / water ──► StructuredDataset
//!                        └──► geo (gazetteer) ─────────────┘
//! ```

pub mod config;
pub mod dynasty;
pub mod error;
pub mod gazetteer;
pub mod geo;
pub mod loader;
pub mod metrics;
pub mod sources;
pub mod water;

pub use jingshi_types as types;
