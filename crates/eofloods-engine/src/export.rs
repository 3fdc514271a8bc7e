//! Export job submission.
//!
//! One task is submitted per image. Submission returns once the platform has
//! accepted the task; completion is not tracked.

use eofloods_core::models::export::DEFAULT_MAX_PIXELS;
use eofloods_core::models::{
    BoundingBox, CollectionExpr, ExportDestination, ExportKind, ExportTask, ImageExpr, TaskId,
};
use eofloods_core::ports::ImageryPlatform;
use eofloods_core::Result;
use serde::Serialize;

pub const DEFAULT_EXPORT_FOLDER: &str = "EO_Floods";

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub kind: ExportKind,
    /// Also export the imagery the flood extents were derived from
    pub include_base_data: bool,
    /// Drive folder; the configured folder when `None`
    pub folder: Option<String>,
    /// Prefix of asset ids for asset exports
    pub asset_path: String,
    /// Pixel size in meters; the configured scale when `None`, else the
    /// native scale of the exported image
    pub scale: Option<f64>,
    /// Date sub-selection used if flood extents still need generating
    pub dates: Option<Vec<String>>,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self { kind: ExportKind::ToDrive, include_base_data: false, folder: None, asset_path: String::new(), scale: None, dates: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedExport {
    pub dataset: String,
    pub description: String,
    pub task_id: TaskId,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExportReport {
    pub tasks: Vec<SubmittedExport>,
}

impl ExportReport {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn for_dataset<'a>(&'a self, dataset: &'a str) -> impl Iterator<Item = &'a SubmittedExport> + 'a {
        self.tasks.iter().filter(move |t| t.dataset == dataset)
    }
}

/// Where and how a batch of images is written
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExportTarget<'a> {
    pub kind: ExportKind,
    pub folder: &'a str,
    pub asset_path: &'a str,
    /// Fixed pixel size; the collection's nominal scale when `None`
    pub scale: Option<f64>,
    pub region: BoundingBox,
}

impl ExportTarget<'_> {
    fn destination(&self, description: &str) -> ExportDestination {
        match self.kind {
            ExportKind::ToDrive => ExportDestination::Drive { folder: self.folder.to_string() },
            ExportKind::ToAsset => ExportDestination::Asset { asset_id: format!("{}{}", self.asset_path, description) },
        }
    }
}

/// Submit one export task per image, named `{prefix}_{index}`
pub(crate) fn export_collection(
    platform: &dyn ImageryPlatform,
    dataset: &str,
    collection: &CollectionExpr,
    prefix: &str,
    target: &ExportTarget<'_>,
    report: &mut ExportReport,
) -> Result<()> {
    let count = platform.image_count(collection)?;
    if count == 0 {
        return Ok(());
    }
    let scale = match target.scale {
        Some(scale) => scale,
        None => platform.nominal_scale(&ImageExpr::nth(collection.clone(), 0))?,
    };
    for index in 0..count {
        let description = format!("{}_{}", prefix, index);
        let task = ExportTask {
            image: ImageExpr::nth(collection.clone(), index),
            destination: target.destination(&description),
            description: description.clone(),
            scale,
            region: target.region,
            max_pixels: DEFAULT_MAX_PIXELS,
        };
        let task_id = platform.submit_export(&task)?;
        report.tasks.push(SubmittedExport { dataset: dataset.to_string(), description, task_id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eofloods_core::models::TimeWindow;
    use eofloods_platform::MemoryPlatform;

    fn region() -> BoundingBox {
        BoundingBox::new(4.221067, 51.949474, 4.471006, 52.073727).unwrap()
    }

    fn collection() -> CollectionExpr {
        let window = TimeWindow::parse("2023-04-01", "2023-04-30").unwrap();
        CollectionExpr::load("COPERNICUS/S1_GRD", region(), window.as_date_window())
    }

    #[test]
    fn test_one_task_per_image_with_indexed_names() {
        let platform = MemoryPlatform::synthetic();
        let target =
            ExportTarget { kind: ExportKind::ToDrive, folder: "EO_Floods", asset_path: "", scale: Some(30.0), region: region() };
        let mut report = ExportReport::default();

        export_collection(&platform, "Sentinel-1", &collection(), "S1_flood_extent", &target, &mut report).unwrap();

        let descriptions: Vec<_> = report.tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["S1_flood_extent_0", "S1_flood_extent_1", "S1_flood_extent_2", "S1_flood_extent_3", "S1_flood_extent_4"]
        );

        let submitted = platform.submitted_exports();
        assert_eq!(submitted.len(), 5);
        assert_eq!(submitted[0].destination, ExportDestination::Drive { folder: "EO_Floods".into() });
        assert_eq!(submitted[0].max_pixels, 1e13);
        assert_eq!(submitted[4].image, ImageExpr::nth(collection(), 4));
    }

    #[test]
    fn test_asset_destination_prefixed() {
        let platform = MemoryPlatform::synthetic();
        let target = ExportTarget {
            kind: ExportKind::ToAsset,
            folder: "EO_Floods",
            asset_path: "projects/floods/assets/",
            scale: Some(10.0),
            region: region(),
        };
        let mut report = ExportReport::default();
        export_collection(&platform, "Sentinel-1", &collection(), "S1_EO_Floodmap", &target, &mut report).unwrap();

        let first = &platform.submitted_exports()[0];
        assert_eq!(first.destination, ExportDestination::Asset { asset_id: "projects/floods/assets/S1_EO_Floodmap_0".into() });
        assert_eq!(first.scale, 10.0);
        assert_eq!(report.for_dataset("Sentinel-1").count(), 5);
    }

    #[test]
    fn test_native_scale_when_unset() {
        let platform = MemoryPlatform::synthetic();
        let target = ExportTarget { kind: ExportKind::ToDrive, folder: "EO_Floods", asset_path: "", scale: None, region: region() };
        let mut report = ExportReport::default();
        export_collection(&platform, "Sentinel-1", &collection(), "S1_flood_extent", &target, &mut report).unwrap();

        let submitted = platform.submitted_exports();
        assert!(!submitted.is_empty());
        assert!(submitted.iter().all(|task| task.scale == 10.0));
    }
}
