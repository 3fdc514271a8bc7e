//! In-memory imagery platform for development and testing.
//!
//! Collections are evaluated against a catalog of scenes. Scenes come from an
//! explicit list and from revisit rules that generate one acquisition every
//! few days for an asset, anywhere on the globe. Pixel operations do not
//! change which scenes a collection holds, so only loads and date filters
//! affect counts.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use eofloods_core::models::{
    BoundingBox, CollectionExpr, DateWindow, ExportTask, ImageExpr, TaskId, VisParams,
};
use eofloods_core::ports::ImageryPlatform;
use eofloods_core::{registry, FloodError, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::Duration;

/// Scale reported for images that are not backed by a scene
const DEFAULT_SCALE: f64 = 30.0;

/// A single acquisition in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub asset_id: String,
    pub acquired: NaiveDateTime,
    pub footprint: BoundingBox,
    /// Percentage of unmasked quality band pixels
    pub clear_percentage: f64,
    /// Native pixel size in meters
    pub scale: f64,
}

impl Scene {
    pub fn new(asset_id: impl Into<String>, acquired: NaiveDateTime, footprint: BoundingBox) -> Self {
        Self { asset_id: asset_id.into(), acquired, footprint, clear_percentage: 100.0, scale: DEFAULT_SCALE }
    }

    pub fn with_clear_percentage(mut self, clear_percentage: f64) -> Self {
        self.clear_percentage = clear_percentage;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Repeating global acquisitions of one asset
#[derive(Debug, Clone, PartialEq)]
pub struct Revisit {
    pub asset_id: String,
    /// Days between two acquisitions
    pub every_days: u32,
    /// Offset of the first acquisition from 2000-01-01
    pub phase_days: u32,
    pub time_of_day: NaiveTime,
    pub scale: f64,
}

impl Revisit {
    /// Scenes acquired inside `window`
    fn scenes(&self, window: &DateWindow) -> Vec<Scene> {
        let Some(anchor) = NaiveDate::from_ymd_opt(2000, 1, 1) else {
            return Vec::new();
        };
        let every = i64::from(self.every_days.max(1));
        let phase = i64::from(self.phase_days) % every;

        window
            .start
            .date()
            .iter_days()
            .take_while(|day| *day <= window.end.date())
            .filter(|day| (*day - anchor).num_days().rem_euclid(every) == phase)
            .map(|day| day.and_time(self.time_of_day))
            .filter(|acquired| window.contains(acquired))
            .map(|acquired| {
                let ordinal = (acquired.date() - anchor).num_days();
                // Deterministic cloud cover between 40% and 100%
                let clear = 40.0 + (ordinal * 7919).rem_euclid(6000) as f64 / 100.0;
                Scene::new(self.asset_id.clone(), acquired, BoundingBox::global())
                    .with_clear_percentage(clear)
                    .with_scale(self.scale)
            })
            .collect()
    }
}

/// Imagery platform evaluated against an in-memory scene catalog
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    scenes: Vec<Scene>,
    revisits: Vec<Revisit>,
    latency: Option<Duration>,
    exports: Mutex<Vec<ExportTask>>,
    tiles: Mutex<Vec<ImageExpr>>,
}

impl MemoryPlatform {
    /// Create an empty platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform with a revisit rule for every registered dataset
    pub fn synthetic() -> Self {
        registry::all().iter().filter_map(|spec| synthetic_revisit(&spec.short_name, &spec.asset_id)).fold(
            Self::new(),
            |platform, revisit| platform.with_revisit(revisit),
        )
    }

    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scenes.push(scene);
        self
    }

    pub fn with_scenes(mut self, scenes: impl IntoIterator<Item = Scene>) -> Self {
        self.scenes.extend(scenes);
        self
    }

    pub fn with_revisit(mut self, revisit: Revisit) -> Self {
        self.revisits.push(revisit);
        self
    }

    /// Delay every call, simulating a slow remote evaluation
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Export tasks accepted so far, in submission order
    pub fn submitted_exports(&self) -> Vec<ExportTask> {
        self.exports.lock().map(|exports| exports.clone()).unwrap_or_default()
    }

    /// Number of tile layers registered so far
    pub fn rendered_tiles(&self) -> usize {
        self.tiles.lock().map(|tiles| tiles.len()).unwrap_or_default()
    }

    fn pause(&self) {
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
    }

    fn evaluate(&self, collection: &CollectionExpr) -> Result<Vec<Scene>> {
        match collection {
            CollectionExpr::Load { asset_id, region, window } => {
                let mut scenes: Vec<Scene> = self
                    .scenes
                    .iter()
                    .filter(|s| {
                        s.asset_id == *asset_id && s.footprint.intersects(region) && window.contains(&s.acquired)
                    })
                    .cloned()
                    .chain(self.revisits.iter().filter(|r| r.asset_id == *asset_id).flat_map(|r| r.scenes(window)))
                    .collect();
                scenes.sort_by_key(|s| s.acquired);
                Ok(scenes)
            }
            CollectionExpr::Filter { input, filter } => {
                let mut scenes = self.evaluate(input)?;
                scenes.retain(|s| filter.matches(&s.acquired));
                Ok(scenes)
            }
            CollectionExpr::Map { input, .. } => self.evaluate(input),
        }
    }

    /// Scene an image expression is read from, if any
    fn resolve(&self, image: &ImageExpr) -> Result<Option<Scene>> {
        match image {
            ImageExpr::Nth { collection, index } => {
                let scenes = self.evaluate(collection)?;
                let count = scenes.len();
                scenes.into_iter().nth(*index).map(Some).ok_or_else(|| {
                    FloodError::platform(
                        "resolve image",
                        format!("index {} out of range for collection of {} images", index, count),
                    )
                })
            }
            ImageExpr::Mosaic { collection } | ImageExpr::Max { collection } => {
                Ok(self.evaluate(collection)?.into_iter().next())
            }
            ImageExpr::SelfMask { image } => self.resolve(image),
            ImageExpr::Asset { .. } => Ok(None),
        }
    }
}

impl ImageryPlatform for MemoryPlatform {
    fn name(&self) -> &str {
        "memory"
    }

    fn image_count(&self, collection: &CollectionExpr) -> Result<usize> {
        self.pause();
        Ok(self.evaluate(collection)?.len())
    }

    fn image_dates(&self, collection: &CollectionExpr) -> Result<Vec<NaiveDateTime>> {
        self.pause();
        Ok(self.evaluate(collection)?.iter().map(|s| s.acquired).collect())
    }

    fn quality_scores(&self, collection: &CollectionExpr, _qa_band: &str) -> Result<Vec<f64>> {
        self.pause();
        Ok(self
            .evaluate(collection)?
            .iter()
            .map(|s| (s.clear_percentage * 100.0).round() / 100.0)
            .collect())
    }

    fn nominal_scale(&self, image: &ImageExpr) -> Result<f64> {
        self.pause();
        Ok(self.resolve(image)?.map(|s| s.scale).unwrap_or(DEFAULT_SCALE))
    }

    fn tile_url(&self, image: &ImageExpr, vis_params: &VisParams) -> Result<String> {
        self.pause();
        self.resolve(image)?;

        let mut hasher = DefaultHasher::new();
        serde_json::to_string(image)?.hash(&mut hasher);
        serde_json::to_string(vis_params)?.hash(&mut hasher);

        self.tiles
            .lock()
            .map_err(|e| FloodError::platform("tile_url", e))?
            .push(image.clone());
        Ok(format!("memory://tiles/{:016x}/{{z}}/{{x}}/{{y}}", hasher.finish()))
    }

    fn submit_export(&self, task: &ExportTask) -> Result<TaskId> {
        self.pause();
        self.resolve(&task.image)?;

        self.exports
            .lock()
            .map_err(|e| FloodError::platform("submit_export", e))?
            .push(task.clone());
        let id = TaskId(uuid::Uuid::new_v4().simple().to_string().to_uppercase());
        tracing::debug!("Accepted export task {} ({})", id, task.description);
        Ok(id)
    }
}

fn synthetic_revisit(short_name: &str, asset_id: &str) -> Option<Revisit> {
    let (every_days, phase_days, hour, minute, scale) = match short_name {
        "S1" => (6, 2, 5, 50, 10.0),
        "S2" => (5, 1, 10, 40, 10.0),
        "L7" => (16, 3, 10, 15, 30.0),
        "L8" => (16, 11, 10, 30, 30.0),
        "VIIRS" => (1, 0, 13, 30, 500.0),
        "MODIS" => (1, 0, 10, 30, 500.0),
        _ => return None,
    };
    Some(Revisit {
        asset_id: asset_id.to_string(),
        every_days,
        phase_days,
        time_of_day: NaiveTime::from_hms_opt(hour, minute, 0)?,
        scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eofloods_core::models::{DateFilter, ExportDestination, ImageOp, TimeWindow};

    fn rotterdam() -> BoundingBox {
        BoundingBox::new(4.221067, 51.949474, 4.471006, 52.073727).unwrap()
    }

    fn april() -> DateWindow {
        TimeWindow::parse("2023-04-01", "2023-04-30").unwrap().as_date_window()
    }

    #[test]
    fn test_synthetic_catalog_has_sentinel1_scenes() {
        let platform = MemoryPlatform::synthetic();
        let collection = CollectionExpr::load("COPERNICUS/S1_GRD", rotterdam(), april());

        let dates = platform.image_dates(&collection).unwrap();
        assert_eq!(dates.len(), 5);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(platform.image_count(&collection).unwrap(), dates.len());
    }

    #[test]
    fn test_explicit_scenes_respect_footprint() {
        let acquired = NaiveDate::from_ymd_opt(2023, 4, 5).unwrap().and_hms_opt(5, 50, 0).unwrap();
        let elsewhere = BoundingBox::new(100.0, 0.0, 101.0, 1.0).unwrap();
        let platform = MemoryPlatform::new()
            .with_scene(Scene::new("TEST/ASSET", acquired, rotterdam()))
            .with_scene(Scene::new("TEST/ASSET", acquired, elsewhere));

        let collection = CollectionExpr::load("TEST/ASSET", rotterdam(), april());
        assert_eq!(platform.image_count(&collection).unwrap(), 1);
    }

    #[test]
    fn test_filter_and_map_evaluation() {
        let platform = MemoryPlatform::synthetic();
        let base = CollectionExpr::load("COPERNICUS/S1_GRD", rotterdam(), april());
        let first = platform.image_dates(&base).unwrap()[0];

        let filtered = base
            .filter(DateFilter::any_of(vec![DateWindow::for_input(&eofloods_core::models::DateInput::Date(
                first.date(),
            ))]))
            .map(ImageOp::CastDouble { band: "VV".into() });
        assert_eq!(platform.image_count(&filtered).unwrap(), 1);
    }

    #[test]
    fn test_quality_scores_rounded() {
        let platform = MemoryPlatform::synthetic();
        let collection = CollectionExpr::load("COPERNICUS/S2_SR_HARMONIZED", rotterdam(), april());
        let scores = platform.quality_scores(&collection, "swir1").unwrap();
        assert!(!scores.is_empty());
        for score in scores {
            assert!((40.0..=100.0).contains(&score));
            assert_eq!((score * 100.0).round() / 100.0, score);
        }
    }

    #[test]
    fn test_exports_recorded_and_index_checked() {
        let platform = MemoryPlatform::synthetic();
        let collection = CollectionExpr::load("COPERNICUS/S1_GRD", rotterdam(), april());
        let task = ExportTask {
            image: ImageExpr::nth(collection.clone(), 0),
            description: "S1_flood_extent_0".into(),
            destination: ExportDestination::Drive { folder: "EO_Floods".into() },
            scale: 30.0,
            region: rotterdam(),
            max_pixels: 1e13,
        };
        let id = platform.submit_export(&task).unwrap();
        assert_eq!(id.0.len(), 32);
        assert_eq!(platform.submitted_exports(), vec![task.clone()]);

        let out_of_range = ExportTask { image: ImageExpr::nth(collection, 99), ..task };
        assert!(platform.submit_export(&out_of_range).is_err());
        assert_eq!(platform.submitted_exports().len(), 1);
    }

    #[test]
    fn test_tile_url_is_stable() {
        let platform = MemoryPlatform::synthetic();
        let image = ImageExpr::Asset { asset_id: "JRC/GSW1_4/GlobalSurfaceWater".into(), band: None };
        let vis = VisParams::bands(["occurrence"]).range(0.0, 100.0);
        let a = platform.tile_url(&image, &vis).unwrap();
        let b = platform.tile_url(&image, &vis).unwrap();
        assert_eq!(a, b);
        assert!(a.ends_with("/{z}/{x}/{y}"));
        assert_eq!(platform.rendered_tiles(), 2);
    }
}
