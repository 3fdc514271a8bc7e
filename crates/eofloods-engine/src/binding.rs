use eofloods_core::models::dates::format_timestamp;
use eofloods_core::models::{
    Boundary, BoundingBox, CollectionExpr, DateFilter, DatasetSpec, ImageOp, TimeWindow,
};
use eofloods_core::ports::ImageryPlatform;
use eofloods_core::Result;
use serde::Serialize;

/// A dataset bound to an area of interest and a time window
///
/// The spec is copied on bind, so per-session changes never reach the
/// registry. The collection starts as a plain load and is replaced when the
/// selection narrows it down to specific dates.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBinding {
    pub spec: DatasetSpec,
    pub region: BoundingBox,
    pub window: TimeWindow,
    pub collection: CollectionExpr,
}

/// Acquisition time and quality of one image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSummary {
    pub timestamp: String,
    /// Percentage of unmasked quality band pixels in the area of interest
    pub quality_score: f64,
}

/// What a bound dataset holds for the current selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub name: String,
    pub asset_id: String,
    pub providers: String,
    pub images: Vec<ImageSummary>,
}

impl DatasetSummary {
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

impl DatasetBinding {
    pub fn bind(spec: &DatasetSpec, region: BoundingBox, window: TimeWindow) -> Self {
        let collection = CollectionExpr::load(spec.asset_id.clone(), region, window.as_date_window());
        Self { spec: spec.clone(), region, window, collection }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Replace the bound collection with its date-filtered subset
    pub fn restrict(&mut self, filter: DateFilter) {
        self.collection = self.collection.clone().filter(filter);
    }

    /// Collection used for quality scoring
    ///
    /// Global tiles are clipped to the area of interest first so the score
    /// reflects the area rather than the whole tile.
    pub fn scoring_collection(&self) -> CollectionExpr {
        if self.spec.global_coverage {
            self.collection.clone().map(ImageOp::Clip { boundary: Boundary::Region { region: self.region } })
        } else {
            self.collection.clone()
        }
    }

    pub fn summarize(&self, platform: &dyn ImageryPlatform) -> Result<DatasetSummary> {
        let count = platform.image_count(&self.collection)?;
        let images = if count > 0 {
            let dates = platform.image_dates(&self.collection)?;
            let scores = platform.quality_scores(&self.scoring_collection(), &self.spec.qa_band)?;
            dates
                .iter()
                .zip(scores)
                .map(|(date, quality_score)| ImageSummary { timestamp: format_timestamp(date), quality_score })
                .collect()
        } else {
            Vec::new()
        };

        Ok(DatasetSummary {
            name: self.spec.name.clone(),
            asset_id: self.spec.asset_id.clone(),
            providers: self.spec.provider_names(),
            images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::date_filter;
    use eofloods_core::registry;
    use eofloods_platform::MemoryPlatform;

    fn bind(name: &str) -> DatasetBinding {
        let region = BoundingBox::new(4.221067, 51.949474, 4.471006, 52.073727).unwrap();
        let window = TimeWindow::parse("2023-04-01", "2023-04-30").unwrap();
        DatasetBinding::bind(registry::lookup(name).unwrap(), region, window)
    }

    #[test]
    fn test_bind_copies_spec() {
        let mut binding = bind("Sentinel-1");
        binding.spec.qa_band = "VH".to_string();
        assert_eq!(registry::lookup("Sentinel-1").unwrap().qa_band, "VV");
        assert_eq!(binding.collection.asset_id(), "COPERNICUS/S1_GRD");
    }

    #[test]
    fn test_summary_lists_dates_and_scores() {
        let platform = MemoryPlatform::synthetic();
        let summary = bind("Sentinel-1").summarize(&platform).unwrap();
        assert_eq!(summary.name, "Sentinel-1");
        assert_eq!(summary.image_count(), 5);
        assert_eq!(summary.images[0].timestamp, "2023-04-02 05:50:00.000");
        assert_eq!(summary.providers, "GFM, Hydrafloods");
    }

    #[test]
    fn test_restrict_replaces_collection() {
        let platform = MemoryPlatform::synthetic();
        let mut binding = bind("Sentinel-1");
        binding.restrict(date_filter(&["2023-04-08", "2023-04-14"]).unwrap());
        assert_eq!(binding.summarize(&platform).unwrap().image_count(), 2);
    }

    #[test]
    fn test_global_datasets_clipped_for_scoring() {
        let viirs = bind("VIIRS").scoring_collection();
        assert_eq!(viirs.op_names(), vec!["clip"]);
        assert!(bind("Landsat 8").scoring_collection().op_names().is_empty());
    }
}
