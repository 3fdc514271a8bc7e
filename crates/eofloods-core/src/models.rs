pub mod aoi;
pub mod dataset;
pub mod dates;
pub mod export;
pub mod expr;
pub mod map;

pub use aoi::BoundingBox;
pub use dataset::{
    AlgorithmParams, DatasetSpec, ImageryType, ProviderKind, ThresholdAlgorithm, VisParams,
};
pub use dates::{DateInput, DateWindow, TimeWindow};
pub use export::{ExportDestination, ExportKind, ExportTask, TaskId};
pub use expr::{
    Boundary, CollectionExpr, DateFilter, ImageExpr, ImageOp, MaskExpr, COUNTRY_BOUNDARIES_ASSET,
    SURFACE_WATER_ASSET, SURFACE_WATER_OCCURRENCE_BAND, TIME_START_PROPERTY,
};
pub use map::{LayerSource, MapLayer, MapView};
