//! EO-Floods - Flood maps from earth-observation imagery
//!
//! [`FloodMap`] is the entry point: it validates the area and time window,
//! builds the requested provider and forwards the flood map workflow to it.

pub mod context;
pub mod floodmap;
pub mod provider;

pub use context::SessionContext;
pub use floodmap::FloodMap;
pub use provider::{AvailableData, ExportOutcome, Provider};
