//! Flood extent generation.
//!
//! Every binding is turned into a collection of binary water masks, one per
//! image: water is 1 and land is 0 regardless of sensor. The work happens on
//! the platform; this module only composes the expression.

use crate::binding::DatasetBinding;
use crate::filters::date_filter;
use eofloods_core::models::{
    Boundary, CollectionExpr, ImageOp, MaskExpr, COUNTRY_BOUNDARIES_ASSET, TIME_START_PROPERTY,
};
use eofloods_core::ports::ImageryPlatform;
use eofloods_core::{FloodError, Result};
use tracing::{debug, info, warn};

/// Default water occurrence (percent) above which a pixel counts as permanent water
pub const DEFAULT_PERMANENT_WATER_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FloodExtentOptions {
    /// Keep only images acquired on these dates
    pub dates: Option<Vec<String>>,
    /// Clip images to the country boundary intersecting the area of interest
    pub clip_ocean: bool,
    pub mask_permanent_water: bool,
    pub permanent_water_threshold: f64,
}

impl Default for FloodExtentOptions {
    fn default() -> Self {
        Self {
            dates: None,
            clip_ocean: true,
            mask_permanent_water: true,
            permanent_water_threshold: DEFAULT_PERMANENT_WATER_THRESHOLD,
        }
    }
}

impl FloodExtentOptions {
    pub fn with_dates<S: Into<String>>(mut self, dates: impl IntoIterator<Item = S>) -> Self {
        self.dates = Some(dates.into_iter().map(Into::into).collect());
        self
    }
}

/// Derived flood extent collection of one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct FloodExtent {
    pub dataset: String,
    pub short_name: String,
    /// Base collection after date sub-selection
    pub source: CollectionExpr,
    /// Per-image water masks
    pub collection: CollectionExpr,
}

/// Result of one pipeline run, in binding order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloodExtents {
    entries: Vec<FloodExtent>,
    skipped: Vec<String>,
}

impl FloodExtents {
    pub fn get(&self, dataset: &str) -> Option<&FloodExtent> {
        self.entries.iter().find(|e| e.dataset == dataset)
    }

    pub fn contains(&self, dataset: &str) -> bool {
        self.get(dataset).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FloodExtent> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.dataset.as_str()).collect()
    }

    /// Datasets left out because they had no images
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run the pipeline over all bindings
///
/// Bindings are not modified. A platform error aborts the whole run.
pub fn generate_flood_extents(
    platform: &dyn ImageryPlatform,
    bindings: &[DatasetBinding],
    options: &FloodExtentOptions,
) -> Result<FloodExtents> {
    let filter = match &options.dates {
        Some(dates) if !dates.is_empty() => Some(date_filter(dates)?),
        _ => None,
    };

    let mut extents = FloodExtents::default();
    for binding in bindings {
        let name = binding.name();
        info!("Generating flood extents for {} dataset", name);

        if platform.image_count(&binding.collection)? < 1 {
            warn!("{} has no images for date range {}", name, binding.window);
            extents.skipped.push(name.to_string());
            continue;
        }

        let source = match &filter {
            Some(filter) => binding.collection.clone().filter(filter.clone()),
            None => binding.collection.clone(),
        };

        extents.entries.push(FloodExtent {
            dataset: name.to_string(),
            short_name: binding.spec.short_name.clone(),
            collection: derive_water_masks(binding, source.clone(), options)?,
            source,
        });
    }

    Ok(extents)
}

fn derive_water_masks(
    binding: &DatasetBinding,
    source: CollectionExpr,
    options: &FloodExtentOptions,
) -> Result<CollectionExpr> {
    let spec = &binding.spec;
    let algorithm = spec.default_algorithm;
    let params = spec.default_params().cloned().ok_or_else(|| FloodError::ConfigMissing {
        key: format!("{} parameters for {}", algorithm.name(), spec.name),
    })?;

    let mut collection = source;

    if options.clip_ocean {
        info!("Clipping image to country boundaries");
        collection = collection.map(ImageOp::Clip {
            boundary: Boundary::FirstIntersecting {
                collection: COUNTRY_BOUNDARIES_ASSET.to_string(),
                region: binding.region,
            },
        });
    }

    if spec.is_optical() {
        debug!("Calculating MNDWI for {}", spec.name);
        collection = collection
            .map(ImageOp::AddIndex { index: params.band.clone() })
            .map(ImageOp::CastDouble { band: params.band.clone() });
    }

    info!("Applying edge-otsu thresholding");
    collection = collection.map(ImageOp::Threshold { algorithm, params }).map(ImageOp::Equals {
        value: algorithm.land_value(),
        keep_properties: vec![TIME_START_PROPERTY.to_string()],
    });

    if options.mask_permanent_water {
        collection = collection
            .map(ImageOp::UpdateMask { mask: MaskExpr::not_permanent_water(options.permanent_water_threshold) });
    }

    Ok(collection)
}
