//! HydraFloods provider: flood extents orchestrated on an imagery platform
//!
//! Datasets are bound to an area and time window as lazy collection
//! expressions. The pipeline derives per-image water masks, the preview
//! builder turns bindings and extents into map layers, and the exporter
//! submits one platform task per image.

pub mod binding;
pub mod export;
pub mod filters;
pub mod pipeline;
pub mod preview;
pub mod provider;
pub mod render;

pub use binding::{DatasetBinding, DatasetSummary, ImageSummary};
pub use export::{ExportReport, ExportRequest, SubmittedExport};
pub use pipeline::{FloodExtent, FloodExtentOptions, FloodExtents};
pub use preview::{FloodExtentView, PreviewOptions};
pub use provider::{HydraFloodsProvider, ProviderSettings};
pub use render::RenderPool;
