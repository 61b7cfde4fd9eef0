//! Analysis layer: dependency extraction, file discovery, and
//! impact/relationship analysis.
//!
//! Everything in this layer is recomputed on demand from file content and
//! directory listings; nothing is cached or persisted here.

pub mod dependency;
pub mod discovery;
pub mod impact;

pub use dependency::analyze;
pub use discovery::discover;
pub use impact::{assess_impact, map_relationships};
