use crate::binding::{DatasetBinding, DatasetSummary};
use crate::export::{export_collection, ExportReport, ExportRequest, ExportTarget, DEFAULT_EXPORT_FOLDER};
use crate::filters::date_filter;
use crate::pipeline::{generate_flood_extents, FloodExtentOptions, FloodExtents, DEFAULT_PERMANENT_WATER_THRESHOLD};
use crate::preview::{self, FloodExtentView, PreviewOptions};
use crate::render::RenderPool;
use eofloods_core::config::{ConfigSource, LayeredConfig};
use eofloods_core::models::{BoundingBox, DatasetSpec, MapView, TimeWindow};
use eofloods_core::ports::ImageryPlatform;
use eofloods_core::{registry, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Session defaults for the HydraFloods provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub zoom: u8,
    pub plot_timeout: Duration,
    pub export_folder: String,
    /// Explicitly configured export scale; images keep their native scale otherwise
    pub export_scale: Option<f64>,
    pub clip_ocean: bool,
    pub mask_permanent_water: bool,
    pub permanent_water_threshold: f64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            zoom: 8,
            plot_timeout: Duration::from_secs(300),
            export_folder: DEFAULT_EXPORT_FOLDER.to_string(),
            export_scale: None,
            clip_ocean: true,
            mask_permanent_water: true,
            permanent_water_threshold: DEFAULT_PERMANENT_WATER_THRESHOLD,
        }
    }
}

impl ProviderSettings {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            zoom: config.zoom.value,
            plot_timeout: config.plot_timeout(),
            export_folder: config.export_folder.value.clone(),
            export_scale: (config.export_scale.source != ConfigSource::Default).then_some(config.export_scale.value),
            clip_ocean: config.clip_ocean.value,
            mask_permanent_water: config.mask_permanent_water.value,
            permanent_water_threshold: config.permanent_water_threshold.value,
        }
    }

    /// Pipeline options used when flood extents are generated implicitly
    pub fn extent_options(&self, dates: Option<Vec<String>>) -> FloodExtentOptions {
        FloodExtentOptions {
            dates,
            clip_ocean: self.clip_ocean,
            mask_permanent_water: self.mask_permanent_water,
            permanent_water_threshold: self.permanent_water_threshold,
        }
    }

    pub fn flood_extent_view(&self) -> FloodExtentView {
        FloodExtentView { zoom: self.zoom, timeout: self.plot_timeout, show_water_occurrence: true }
    }
}

/// Multi-sensor provider that runs the flood extent pipeline on an imagery platform
pub struct HydraFloodsProvider {
    platform: Arc<dyn ImageryPlatform>,
    region: BoundingBox,
    window: TimeWindow,
    bindings: Vec<DatasetBinding>,
    flood_extents: Option<FloodExtents>,
    settings: ProviderSettings,
    render_pool: RenderPool,
}

impl std::fmt::Debug for HydraFloodsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydraFloodsProvider")
            .field("platform", &self.platform.name())
            .field("region", &self.region)
            .field("window", &self.window)
            .field("datasets", &self.bindings.iter().map(|b| b.name()).collect::<Vec<_>>())
            .field("has_flood_extents", &self.flood_extents.is_some())
            .finish()
    }
}

impl HydraFloodsProvider {
    /// Bind every dataset to the area and window; no platform call is made
    pub fn new(
        platform: Arc<dyn ImageryPlatform>,
        datasets: &[&DatasetSpec],
        region: BoundingBox,
        window: TimeWindow,
        settings: ProviderSettings,
    ) -> Result<Self> {
        let bindings = datasets.iter().map(|spec| DatasetBinding::bind(spec, region, window)).collect();
        Ok(Self { platform, region, window, bindings, flood_extents: None, settings, render_pool: RenderPool::new()? })
    }

    pub fn bindings(&self) -> &[DatasetBinding] {
        &self.bindings
    }

    pub fn region(&self) -> &BoundingBox {
        &self.region
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Latest pipeline result, `None` until generated or after reselection
    pub fn flood_extents(&self) -> Option<&FloodExtents> {
        self.flood_extents.as_ref()
    }

    /// Image dates and quality scores of every bound dataset
    pub fn available_data(&self) -> Result<Vec<DatasetSummary>> {
        let summaries = self
            .bindings
            .iter()
            .map(|binding| binding.summarize(self.platform.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        for summary in &summaries {
            if summary.images.is_empty() {
                info!("{}: no images were found for the set time period", summary.name);
            } else {
                info!("{}: {} images ({})", summary.name, summary.image_count(), summary.asset_id);
            }
        }
        Ok(summaries)
    }

    pub fn view_data(&self, options: &PreviewOptions) -> Result<MapView> {
        preview::view_data(self.platform.as_ref(), &self.bindings, &self.region, options)
    }

    /// Narrow the bound datasets and their images
    ///
    /// Any previously generated flood extents are discarded.
    pub fn select_data<S: AsRef<str>>(&mut self, datasets: Option<&[S]>, dates: Option<&[S]>) -> Result<()> {
        let filter = match dates {
            Some(dates) if !dates.is_empty() => Some(date_filter(dates)?),
            _ => None,
        };

        if let Some(names) = datasets.filter(|names| !names.is_empty()) {
            registry::resolve(Some(names))?;
            self.bindings.retain(|b| names.iter().any(|n| n.as_ref() == b.name()));
        }

        if let Some(filter) = filter {
            for binding in &mut self.bindings {
                binding.restrict(filter.clone());
            }
        }

        self.flood_extents = None;
        Ok(())
    }

    /// Run the pipeline and replace the stored result
    ///
    /// On failure the previous result and bindings are left untouched.
    pub fn generate_flood_extents(&mut self, options: &FloodExtentOptions) -> Result<&FloodExtents> {
        let extents = generate_flood_extents(self.platform.as_ref(), &self.bindings, options)?;

        for extent in extents.iter() {
            if let Some(binding) = self.bindings.iter_mut().find(|b| b.name() == extent.dataset) {
                binding.collection = extent.source.clone();
            }
        }
        Ok(self.flood_extents.insert(extents))
    }

    fn ensure_flood_extents(&mut self, dates: Option<Vec<String>>) -> Result<()> {
        if self.flood_extents.is_none() {
            let options = self.settings.extent_options(dates);
            self.generate_flood_extents(&options)?;
        }
        Ok(())
    }

    /// Map of the flood extents, rendered within `view.timeout`
    pub fn view_flood_extents(&mut self, view: &FloodExtentView) -> Result<MapView> {
        self.ensure_flood_extents(None)?;

        let platform = Arc::clone(&self.platform);
        let bindings = self.bindings.clone();
        let extents = self.flood_extents.clone().unwrap_or_default();
        let region = self.region;
        let job_view = view.clone();

        self.render_pool.render(view.timeout, move || {
            preview::flood_extent_map(platform.as_ref(), &bindings, &extents, &region, &job_view)
        })
    }

    /// Submit export tasks for the flood extents and optionally the base imagery
    pub fn export_data(&mut self, request: &ExportRequest) -> Result<ExportReport> {
        self.ensure_flood_extents(request.dates.clone())?;

        let target = ExportTarget {
            kind: request.kind,
            folder: request.folder.as_deref().unwrap_or(&self.settings.export_folder),
            asset_path: &request.asset_path,
            scale: request.scale.or(self.settings.export_scale),
            region: self.region,
        };
        let platform = self.platform.as_ref();
        let mut report = ExportReport::default();

        if let Some(extents) = &self.flood_extents {
            for extent in extents.iter() {
                info!("Exporting {} flood extents {}", extent.dataset, request.kind.label());
                let prefix = format!("{}_flood_extent", extent.short_name);
                export_collection(platform, &extent.dataset, &extent.collection, &prefix, &target, &mut report)?;
            }
        }

        if request.include_base_data {
            for binding in &self.bindings {
                info!("Exporting {} {}", binding.name(), request.kind.label());
                let prefix = format!("{}_EO_Floodmap", binding.spec.short_name);
                export_collection(platform, binding.name(), &binding.collection, &prefix, &target, &mut report)?;
            }
        }

        Ok(report)
    }
}
