use crate::api::{GfmApi, Product};
use crate::auth::{authenticate, CredentialSource, UserSession};
use crate::wms;
use eofloods_core::models::{BoundingBox, MapView, TimeWindow};
use eofloods_core::{FloodError, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Progress of a GFM session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GfmState {
    Unauthenticated,
    Authenticated,
    AreaRegistered,
    ProductsListed,
    ProductsFiltered,
}

/// Download link of one selected product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadLink {
    pub product_id: String,
    pub product_time: String,
    pub link: String,
}

/// Provider backed by the hosted Global Flood Monitor
pub struct GfmProvider {
    api: Arc<dyn GfmApi>,
    region: BoundingBox,
    window: TimeWindow,
    user: Option<UserSession>,
    aoi_id: Option<String>,
    products: Vec<Product>,
    state: GfmState,
}

impl std::fmt::Debug for GfmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GfmProvider")
            .field("region", &self.region)
            .field("window", &self.window)
            .field("aoi_id", &self.aoi_id)
            .field("products", &self.products.len())
            .field("state", &self.state)
            .finish()
    }
}

impl GfmProvider {
    /// Log in, upload the area of interest and list its products
    pub fn new(
        api: Arc<dyn GfmApi>,
        credentials: &CredentialSource,
        region: BoundingBox,
        window: TimeWindow,
    ) -> Result<Self> {
        let mut provider = Self {
            api,
            region,
            window,
            user: None,
            aoi_id: None,
            products: Vec::new(),
            state: GfmState::Unauthenticated,
        };
        provider.authenticate(credentials)?;
        provider.register_area()?;
        provider.list_products()?;
        Ok(provider)
    }

    fn authenticate(&mut self, credentials: &CredentialSource) -> Result<()> {
        self.user = Some(authenticate(self.api.as_ref(), credentials)?);
        self.state = GfmState::Authenticated;
        Ok(())
    }

    fn register_area(&mut self) -> Result<()> {
        info!("Uploading geometry to GFM server");
        let aoi_id = self.api.create_aoi(self.session()?, &self.region.to_geojson())?;
        info!("Successfully uploaded geometry to GFM server");
        self.aoi_id = Some(aoi_id);
        self.state = GfmState::AreaRegistered;
        Ok(())
    }

    fn list_products(&mut self) -> Result<()> {
        info!("Retrieving GFM product information");
        let aoi_id = self.aoi_id.as_deref().ok_or_else(|| FloodError::InvalidSelection {
            reason: "no area of interest registered with GFM".to_string(),
        })?;
        self.products = self.api.products(self.session()?, aoi_id, &self.window)?;
        self.state = GfmState::ProductsListed;
        Ok(())
    }

    fn session(&self) -> Result<&UserSession> {
        self.user
            .as_ref()
            .ok_or_else(|| FloodError::AuthenticationFailed { reason: "no active GFM session".to_string() })
    }

    pub fn state(&self) -> GfmState {
        self.state
    }

    pub fn region(&self) -> &BoundingBox {
        &self.region
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn aoi_id(&self) -> Option<&str> {
        self.aoi_id.as_deref()
    }

    pub fn user(&self) -> Option<&UserSession> {
        self.user.as_ref()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Timestamps of the selected products
    pub fn available_data(&self) -> Vec<String> {
        let dates: Vec<String> = self.products.iter().map(|p| p.product_time.clone()).collect();
        info!("For the following dates there is GFM data: {:?}", dates);
        dates
    }

    /// Keep the products whose timestamp is one of `dates`
    ///
    /// The current selection is kept when nothing matches.
    pub fn select_data<S: AsRef<str>>(&mut self, dates: &[S]) -> Result<()> {
        let selected: Vec<Product> = self
            .products
            .iter()
            .filter(|p| dates.iter().any(|d| d.as_ref() == p.product_time))
            .cloned()
            .collect();

        if selected.is_empty() {
            let dates: Vec<&str> = dates.iter().map(|d| d.as_ref()).collect();
            return Err(FloodError::NoDataFound { dates: dates.join(", ") });
        }
        self.products = selected;
        self.state = GfmState::ProductsFiltered;
        Ok(())
    }

    /// GFM products are flood extents already
    pub fn generate_flood_extents(&self) {
        info!("GFM products are already flood extents, nothing to generate");
    }

    /// Time-enabled WMS map of the flood layer over the session window
    pub fn view_data(&self, layer: Option<&str>) -> Result<MapView> {
        wms::wms_map(&self.region, &self.window, layer.unwrap_or(wms::DEFAULT_LAYER))
    }

    /// Fetch a download link for every selected product
    pub fn export_data(&self) -> Result<Vec<DownloadLink>> {
        info!("Retrieving download link");
        let session = self.session()?;

        self.products
            .iter()
            .map(|product| {
                let link = link_text(self.api.download_link(session, &product.product_id)?);
                info!("Image: {}, download link: {}", product.product_time, link);
                Ok(DownloadLink {
                    product_id: product.product_id.clone(),
                    product_time: product.product_time.clone(),
                    link,
                })
            })
            .collect()
    }
}

/// Link from a download response, which is either a bare string or an object
fn link_text(response: Value) -> String {
    match response {
        Value::String(link) => link,
        Value::Object(ref fields) => match fields.get("download_link") {
            Some(Value::String(link)) => link.clone(),
            _ => response.to_string(),
        },
        other => other.to_string(),
    }
}
