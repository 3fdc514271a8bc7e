//! Port and HTTP adapter for the Global Flood Monitor REST API.

use crate::auth::{Credentials, UserSession};
use eofloods_core::models::TimeWindow;
use eofloods_core::{FloodError, Result};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

const AOI_NAME: &str = "flood_aoi";
const AOI_DESCRIPTION: &str = "area of interest for flood mapping";

/// A flood product published for a registered area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_time: String,
}

/// Port for the GFM service
///
/// A rejected login must surface as [`FloodError::Http`] with status 400 so
/// the caller can retry with other credentials.
pub trait GfmApi: Send + Sync {
    fn login(&self, credentials: &Credentials) -> Result<UserSession>;

    /// Upload the area of interest and return its id
    fn create_aoi(&self, session: &UserSession, geometry: &geojson::Geometry) -> Result<String>;

    /// Products of an area observed within the window, end day inclusive
    fn products(&self, session: &UserSession, aoi_id: &str, window: &TimeWindow) -> Result<Vec<Product>>;

    /// Download link for one product
    fn download_link(&self, session: &UserSession, product_id: &str) -> Result<Value>;
}

#[derive(Debug, Deserialize)]
struct AoiResponse {
    aoi_id: String,
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    products: Vec<Product>,
}

/// GFM client over HTTPS
pub struct HttpGfmApi {
    /// Base URL ending in `/`, e.g. "https://api.gfm.eodc.eu/v2/"
    base_url: String,
    client: Client,
}

impl HttpGfmApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("eofloods/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FloodError::platform("create HTTP client", e))?;
        let base_url = format!("{}/", base_url.trim_end_matches('/'));
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Products query for a window, covering the whole end day
    pub fn products_url(&self, aoi_id: &str, window: &TimeWindow) -> Result<Url> {
        let from = format!("{}T00:00:00", window.start_str());
        let to = format!("{}T23:59:59", window.end_str());
        Url::parse_with_params(
            &self.url(&format!("aoi/{}/products", aoi_id)),
            &[("time", "range"), ("from", from.as_str()), ("to", to.as_str())],
        )
        .map_err(|e| FloodError::ConfigInvalid { key: "gfm_api_url".to_string(), reason: e.to_string() })
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder, url: &str) -> Result<Response> {
        request.send().map_err(|e| FloodError::Transport { url: url.to_string(), reason: e.to_string() })
    }
}

/// Decode a response that must carry exactly `expected`
fn expect_status<T: DeserializeOwned>(response: Response, expected: StatusCode, url: &str) -> Result<T> {
    let status = response.status();
    if status != expected {
        let body = response.text().unwrap_or_default();
        return Err(FloodError::Http { status: status.as_u16(), url: url.to_string(), body });
    }
    response
        .json::<T>()
        .map_err(|e| FloodError::Serialization(format!("malformed response from {}: {}", url, e)))
}

impl GfmApi for HttpGfmApi {
    fn login(&self, credentials: &Credentials) -> Result<UserSession> {
        let url = self.url("auth/login");
        let body = json!({ "email": credentials.email, "password": credentials.password });
        let response = self.send(self.client.post(&url).json(&body), &url)?;
        expect_status(response, StatusCode::OK, &url)
    }

    fn create_aoi(&self, session: &UserSession, geometry: &geojson::Geometry) -> Result<String> {
        let url = self.url("aoi/create");
        let body = json!({
            "aoi_name": AOI_NAME,
            "user_id": session.client_id,
            "description": AOI_DESCRIPTION,
            "geoJSON": geometry,
        });
        let request = self.client.post(&url).bearer_auth(&session.access_token).json(&body);
        let response: AoiResponse = expect_status(self.send(request, &url)?, StatusCode::CREATED, &url)?;
        Ok(response.aoi_id)
    }

    fn products(&self, session: &UserSession, aoi_id: &str, window: &TimeWindow) -> Result<Vec<Product>> {
        let url = self.products_url(aoi_id, window)?;
        debug!("GET {}", url);
        let request = self.client.get(url.clone()).bearer_auth(&session.access_token);
        let response: ProductsResponse = expect_status(self.send(request, url.as_str())?, StatusCode::OK, url.as_str())?;
        Ok(response.products)
    }

    fn download_link(&self, session: &UserSession, product_id: &str) -> Result<Value> {
        let url = self.url(&format!("download/product/{}/{}", product_id, session.client_id));
        let request = self.client.get(&url).bearer_auth(&session.access_token).timeout(DOWNLOAD_TIMEOUT);
        expect_status(self.send(request, &url)?, StatusCode::OK, &url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let api = HttpGfmApi::new("https://api.gfm.eodc.eu/v2").unwrap();
        assert_eq!(api.base_url(), "https://api.gfm.eodc.eu/v2/");
        let api = HttpGfmApi::new("https://api.gfm.eodc.eu/v2/").unwrap();
        assert_eq!(api.url("auth/login"), "https://api.gfm.eodc.eu/v2/auth/login");
    }

    #[test]
    fn test_products_url_covers_end_day() {
        let api = HttpGfmApi::new("https://api.gfm.eodc.eu/v2/").unwrap();
        let window = TimeWindow::parse("2022-10-01", "2022-10-15").unwrap();
        let url = api.products_url("abc123", &window).unwrap();

        assert_eq!(url.path(), "/v2/aoi/abc123/products");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![
                ("time".to_string(), "range".to_string()),
                ("from".to_string(), "2022-10-01T00:00:00".to_string()),
                ("to".to_string(), "2022-10-15T23:59:59".to_string()),
            ]
        );
    }

    #[test]
    fn test_product_deserializes_with_extra_fields() {
        let body = r#"{"products": [{"product_id": "p1", "product_time": "2022-10-01T01:25:51", "footprint": {}}]}"#;
        let parsed: ProductsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.products[0].product_id, "p1");
    }
}
