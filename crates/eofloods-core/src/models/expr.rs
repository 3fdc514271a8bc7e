//! Lazily composed descriptions of remote image operations.
//!
//! Nothing here touches pixels. Providers build expressions, and an
//! [`ImageryPlatform`](crate::ports::ImageryPlatform) adapter evaluates them
//! remotely when a count, a tile URL, or an export is requested.

use super::aoi::BoundingBox;
use super::dataset::{AlgorithmParams, ThresholdAlgorithm};
use super::dates::DateWindow;
use serde::{Deserialize, Serialize};

/// Image property holding the acquisition time in milliseconds since epoch
pub const TIME_START_PROPERTY: &str = "system:time_start";

/// Country boundary layer used to clip ocean pixels
pub const COUNTRY_BOUNDARIES_ASSET: &str = "FAO/GAUL_SIMPLIFIED_500m/2015/level0";

/// Global surface water occurrence layer
pub const SURFACE_WATER_ASSET: &str = "JRC/GSW1_4/GlobalSurfaceWater";

/// Band of [`SURFACE_WATER_ASSET`] with the percentage of time water was observed
pub const SURFACE_WATER_OCCURRENCE_BAND: &str = "occurrence";

/// Disjunction of date windows; an image matches if any window contains it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateFilter {
    pub windows: Vec<DateWindow>,
}

impl DateFilter {
    pub fn any_of(windows: Vec<DateWindow>) -> Self {
        Self { windows }
    }

    pub fn matches(&self, instant: &chrono::NaiveDateTime) -> bool {
        self.windows.iter().any(|w| w.contains(instant))
    }
}

/// Geometry an image can be clipped to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Boundary {
    Region { region: BoundingBox },
    /// First feature of a boundary collection intersecting the region
    FirstIntersecting { collection: String, region: BoundingBox },
}

/// Per-pixel mask applied with `updateMask`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaskExpr {
    /// Pixels whose water occurrence is below `min_occurrence` percent
    NotPermanentWater { asset_id: String, band: String, min_occurrence: f64 },
}

impl MaskExpr {
    pub fn not_permanent_water(min_occurrence: f64) -> Self {
        MaskExpr::NotPermanentWater {
            asset_id: SURFACE_WATER_ASSET.to_string(),
            band: SURFACE_WATER_OCCURRENCE_BAND.to_string(),
            min_occurrence,
        }
    }
}

/// Operation mapped over every image of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ImageOp {
    Clip { boundary: Boundary },
    /// Append a spectral index band such as `mndwi`
    AddIndex { index: String },
    /// Cast a band to 64-bit floating point
    CastDouble { band: String },
    Threshold { algorithm: ThresholdAlgorithm, params: AlgorithmParams },
    /// 1 where the pixel equals `value`, 0 elsewhere, keeping the listed properties
    Equals { value: f64, keep_properties: Vec<String> },
    UpdateMask { mask: MaskExpr },
}

impl ImageOp {
    pub fn name(&self) -> &'static str {
        match self {
            ImageOp::Clip { .. } => "clip",
            ImageOp::AddIndex { .. } => "add_index",
            ImageOp::CastDouble { .. } => "cast_double",
            ImageOp::Threshold { .. } => "threshold",
            ImageOp::Equals { .. } => "equals",
            ImageOp::UpdateMask { .. } => "update_mask",
        }
    }
}

/// Image collection expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectionExpr {
    Load { asset_id: String, region: BoundingBox, window: DateWindow },
    Filter { input: Box<CollectionExpr>, filter: DateFilter },
    Map { input: Box<CollectionExpr>, op: ImageOp },
}

impl CollectionExpr {
    pub fn load(asset_id: impl Into<String>, region: BoundingBox, window: DateWindow) -> Self {
        CollectionExpr::Load { asset_id: asset_id.into(), region, window }
    }

    pub fn filter(self, filter: DateFilter) -> Self {
        CollectionExpr::Filter { input: Box::new(self), filter }
    }

    pub fn map(self, op: ImageOp) -> Self {
        CollectionExpr::Map { input: Box::new(self), op }
    }

    /// Asset the expression ultimately reads from
    pub fn asset_id(&self) -> &str {
        match self {
            CollectionExpr::Load { asset_id, .. } => asset_id,
            CollectionExpr::Filter { input, .. } | CollectionExpr::Map { input, .. } => {
                input.asset_id()
            }
        }
    }

    /// Mapped operations in the order they are applied
    pub fn ops(&self) -> Vec<&ImageOp> {
        let mut ops = Vec::new();
        let mut current = self;
        loop {
            match current {
                CollectionExpr::Load { .. } => break,
                CollectionExpr::Filter { input, .. } => current = input,
                CollectionExpr::Map { input, op } => {
                    ops.push(op);
                    current = input;
                }
            }
        }
        ops.reverse();
        ops
    }

    /// Names of mapped operations in application order
    pub fn op_names(&self) -> Vec<&'static str> {
        self.ops().iter().map(|op| op.name()).collect()
    }
}

/// Single image expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageExpr {
    /// The `index`-th image of a collection, in collection order
    Nth { collection: CollectionExpr, index: usize },
    Mosaic { collection: CollectionExpr },
    /// Per-pixel temporal maximum
    Max { collection: CollectionExpr },
    Asset { asset_id: String, band: Option<String> },
    /// Mask pixels equal to zero
    SelfMask { image: Box<ImageExpr> },
}

impl ImageExpr {
    pub fn nth(collection: CollectionExpr, index: usize) -> Self {
        ImageExpr::Nth { collection, index }
    }

    pub fn self_mask(self) -> Self {
        ImageExpr::SelfMask { image: Box::new(self) }
    }

    /// Collection this image is derived from, if any
    pub fn collection(&self) -> Option<&CollectionExpr> {
        match self {
            ImageExpr::Nth { collection, .. }
            | ImageExpr::Mosaic { collection }
            | ImageExpr::Max { collection } => Some(collection),
            ImageExpr::SelfMask { image } => image.collection(),
            ImageExpr::Asset { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dates::DateWindow;

    fn source() -> CollectionExpr {
        let region = BoundingBox::new(4.2, 51.9, 4.5, 52.1).unwrap();
        CollectionExpr::load("COPERNICUS/S1_GRD", region, DateWindow::parse("2023-04-01").unwrap())
    }

    #[test]
    fn test_ops_in_application_order() {
        let expr = source()
            .map(ImageOp::AddIndex { index: "mndwi".into() })
            .filter(DateFilter::any_of(vec![]))
            .map(ImageOp::CastDouble { band: "mndwi".into() });
        assert_eq!(expr.op_names(), vec!["add_index", "cast_double"]);
        assert_eq!(expr.asset_id(), "COPERNICUS/S1_GRD");
    }

    #[test]
    fn test_expression_serializes_tagged() {
        let expr = source().map(ImageOp::UpdateMask { mask: MaskExpr::not_permanent_water(50.0) });
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["kind"], "map");
        assert_eq!(json["op"]["op"], "update_mask");
        assert_eq!(json["op"]["mask"]["asset_id"], SURFACE_WATER_ASSET);
        assert_eq!(json["input"]["kind"], "load");

        let back: CollectionExpr = serde_json::from_value(json).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn test_image_collection_lookup() {
        let image = ImageExpr::nth(source(), 2).self_mask();
        assert_eq!(image.collection().unwrap().asset_id(), "COPERNICUS/S1_GRD");
        assert!(ImageExpr::Asset { asset_id: SURFACE_WATER_ASSET.into(), band: None }
            .collection()
            .is_none());
    }
}
