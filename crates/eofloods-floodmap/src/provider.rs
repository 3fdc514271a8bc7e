use crate::context::SessionContext;
use eofloods_core::models::{BoundingBox, DatasetSpec, ProviderKind, TimeWindow};
use eofloods_core::Result;
use eofloods_engine::{DatasetSummary, ExportReport, HydraFloodsProvider, ProviderSettings};
use eofloods_gfm::{DownloadLink, GfmProvider};
use serde::Serialize;

/// The active flood map backend
#[derive(Debug)]
pub enum Provider {
    HydraFloods(HydraFloodsProvider),
    Gfm(GfmProvider),
}

impl Provider {
    /// Build the backend for `kind`
    ///
    /// GFM logs in and lists products here; HydraFloods only binds datasets.
    pub fn build(
        kind: ProviderKind,
        context: &mut SessionContext,
        datasets: &[&'static DatasetSpec],
        region: BoundingBox,
        window: TimeWindow,
    ) -> Result<Self> {
        match kind {
            ProviderKind::HydraFloods => {
                let settings = ProviderSettings::from_config(context.config());
                let platform = context.platform()?;
                Ok(Provider::HydraFloods(HydraFloodsProvider::new(platform, datasets, region, window, settings)?))
            }
            ProviderKind::Gfm => {
                Ok(Provider::Gfm(GfmProvider::new(context.gfm(), context.credentials(), region, window)?))
            }
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::HydraFloods(_) => ProviderKind::HydraFloods,
            Provider::Gfm(_) => ProviderKind::Gfm,
        }
    }
}

/// What `available_data` reports for each backend
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "provider", content = "data")]
pub enum AvailableData {
    #[serde(rename = "Hydrafloods")]
    Datasets(Vec<DatasetSummary>),
    #[serde(rename = "GFM")]
    Products(Vec<String>),
}

/// What `export_data` produced for each backend
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "provider", content = "data")]
pub enum ExportOutcome {
    #[serde(rename = "Hydrafloods")]
    Tasks(ExportReport),
    #[serde(rename = "GFM")]
    Links(Vec<DownloadLink>),
}

impl ExportOutcome {
    pub fn len(&self) -> usize {
        match self {
            ExportOutcome::Tasks(report) => report.len(),
            ExportOutcome::Links(links) => links.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
