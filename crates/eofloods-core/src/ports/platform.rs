use crate::error::Result;
use crate::models::{CollectionExpr, ExportTask, ImageExpr, TaskId, VisParams};
use chrono::NaiveDateTime;

/// Port for the remote imagery platform that evaluates expressions
///
/// Every call blocks until the platform answers. Implementations must be
/// shareable across threads because map rendering runs on a worker.
pub trait ImageryPlatform: Send + Sync {
    /// Short identifier used in log messages
    fn name(&self) -> &str;

    /// Number of images in a collection
    fn image_count(&self, collection: &CollectionExpr) -> Result<usize>;

    /// Acquisition time of every image, in collection order
    fn image_dates(&self, collection: &CollectionExpr) -> Result<Vec<NaiveDateTime>>;

    /// Percentage of unmasked `qa_band` pixels per image, in collection order
    fn quality_scores(&self, collection: &CollectionExpr, qa_band: &str) -> Result<Vec<f64>>;

    /// Native pixel size of an image in meters
    fn nominal_scale(&self, image: &ImageExpr) -> Result<f64>;

    /// Register a visualization and return its XYZ tile URL template
    fn tile_url(&self, image: &ImageExpr, vis_params: &VisParams) -> Result<String>;

    /// Start an export job; returns once the platform has accepted it
    fn submit_export(&self, task: &ExportTask) -> Result<TaskId>;
}
