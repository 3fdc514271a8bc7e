use crate::context::SessionContext;
use crate::provider::{AvailableData, ExportOutcome, Provider};
use eofloods_core::models::{BoundingBox, DatasetSpec, MapView, ProviderKind, TimeWindow};
use eofloods_core::{registry, FloodError, Result};
use eofloods_engine::{ExportRequest, FloodExtentOptions, PreviewOptions};
use std::time::Duration;
use tracing::{info, warn};

/// A flood map session over one area and time window
#[derive(Debug)]
pub struct FloodMap {
    context: SessionContext,
    region: BoundingBox,
    window: TimeWindow,
    datasets: Vec<&'static DatasetSpec>,
    provider: Provider,
}

impl FloodMap {
    /// Validate the inputs and build the provider
    ///
    /// `datasets` defaults to every registered dataset.
    pub fn new(
        mut context: SessionContext,
        start_date: &str,
        end_date: &str,
        provider: ProviderKind,
        geometry: BoundingBox,
        datasets: Option<&[&str]>,
    ) -> Result<Self> {
        let window = TimeWindow::parse(start_date, end_date)?;
        let datasets = registry::resolve(datasets)?;
        let built = Provider::build(provider, &mut context, &datasets, geometry, window)?;

        info!("Provider set as {}", provider);
        info!("Flood map object initialized");
        Ok(Self { context, region: geometry, window, datasets, provider: built })
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut Provider {
        &mut self.provider
    }

    pub fn datasets(&self) -> &[&'static DatasetSpec] {
        &self.datasets
    }

    pub fn region(&self) -> &BoundingBox {
        &self.region
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Image counts, timestamps and quality scores, or GFM product times
    pub fn available_data(&self) -> Result<AvailableData> {
        match &self.provider {
            Provider::HydraFloods(provider) => Ok(AvailableData::Datasets(provider.available_data()?)),
            Provider::Gfm(provider) => Ok(AvailableData::Products(provider.available_data())),
        }
    }

    /// Map of the raw imagery to judge its quality before processing
    ///
    /// Passing `datasets` rebinds the session to them. GFM has nothing to
    /// preview and returns `None`.
    pub fn preview_data(&mut self, datasets: Option<&[&str]>, options: &PreviewOptions) -> Result<Option<MapView>> {
        if let Provider::Gfm(_) = self.provider {
            warn!("GFM does not support previewing data");
            return Ok(None);
        }

        if let Some(dates) = options.dates.as_deref().filter(|d| !d.is_empty()) {
            self.window.check_dates(dates)?;
        }

        if let Some(names) = datasets.filter(|names| !names.is_empty()) {
            let specs = registry::resolve(Some(names))?;
            self.provider =
                Provider::build(ProviderKind::HydraFloods, &mut self.context, &specs, self.region, self.window)?;
            self.datasets = specs;
        }

        match &self.provider {
            Provider::HydraFloods(provider) => provider.view_data(options).map(Some),
            Provider::Gfm(_) => Ok(None),
        }
    }

    /// Narrow the data by date and, for HydraFloods, by dataset
    pub fn select_data(&mut self, dates: Option<&[&str]>, datasets: Option<&[&str]>) -> Result<()> {
        let dates = dates.filter(|d| !d.is_empty());
        if let Some(dates) = dates {
            self.window.check_dates(dates)?;
        }

        match &mut self.provider {
            Provider::HydraFloods(provider) => provider.select_data(datasets, dates),
            Provider::Gfm(provider) => {
                let dates = dates.ok_or_else(|| FloodError::InvalidSelection {
                    reason: "GFM products can only be selected by date".to_string(),
                })?;
                provider.select_data(dates)
            }
        }
    }

    /// Select a single date
    pub fn select_date(&mut self, date: &str) -> Result<()> {
        self.select_data(Some(&[date][..]), None)
    }

    /// Run the flood extent pipeline, replacing any previous result
    ///
    /// Without options the session's configured defaults are used.
    pub fn generate_flood_extents(&mut self, options: Option<&FloodExtentOptions>) -> Result<()> {
        if let Some(dates) = options.and_then(|o| o.dates.as_deref()) {
            self.window.check_dates(dates)?;
        }

        match &mut self.provider {
            Provider::HydraFloods(provider) => {
                let defaults = provider.settings().extent_options(None);
                provider.generate_flood_extents(options.unwrap_or(&defaults))?;
                Ok(())
            }
            Provider::Gfm(provider) => {
                provider.generate_flood_extents();
                Ok(())
            }
        }
    }

    /// Map of the flood extents
    ///
    /// HydraFloods renders within `timeout`, the configured plot timeout by
    /// default. GFM returns its WMS map.
    pub fn view_flood_extents(&mut self, timeout: Option<Duration>) -> Result<MapView> {
        match &mut self.provider {
            Provider::HydraFloods(provider) => {
                let mut view = provider.settings().flood_extent_view();
                if let Some(timeout) = timeout {
                    view.timeout = timeout;
                }
                provider.view_flood_extents(&view)
            }
            Provider::Gfm(provider) => provider.view_data(None),
        }
    }

    /// Submit export tasks, or fetch download links for GFM products
    pub fn export_data(&mut self, request: &ExportRequest) -> Result<ExportOutcome> {
        match &mut self.provider {
            Provider::HydraFloods(provider) => Ok(ExportOutcome::Tasks(provider.export_data(request)?)),
            Provider::Gfm(provider) => Ok(ExportOutcome::Links(provider.export_data()?)),
        }
    }
}
