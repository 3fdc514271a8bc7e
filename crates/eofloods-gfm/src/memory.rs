//! In-process GFM service backed by a fixed product list.

use crate::api::{GfmApi, Product};
use crate::auth::{Credentials, UserSession};
use chrono::{NaiveDate, NaiveTime};
use eofloods_core::models::{DateInput, TimeWindow};
use eofloods_core::{FloodError, Result};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const ACCESS_TOKEN: &str = "memory-access-token";
const CLIENT_ID: &str = "memory-client";

/// Products published every `every_days` days, anchored at 2000-01-01
#[derive(Debug, Clone, Copy, PartialEq)]
struct ProductRevisit {
    every_days: i64,
    time_of_day: NaiveTime,
}

/// GFM stand-in for demos and tests
///
/// Without an account every login succeeds; with one, other credentials are
/// rejected with HTTP 400 like the real service.
#[derive(Debug, Default)]
pub struct MemoryGfmApi {
    account: Option<Credentials>,
    products: Vec<Product>,
    revisit: Option<ProductRevisit>,
    logins: AtomicUsize,
    areas: Mutex<Vec<geojson::Geometry>>,
}

impl MemoryGfmApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A service publishing one product every three days
    pub fn synthetic() -> Self {
        Self::new().with_revisit(3, NaiveTime::from_hms_opt(1, 25, 51).unwrap_or(NaiveTime::MIN))
    }

    pub fn with_account(mut self, credentials: Credentials) -> Self {
        self.account = Some(credentials);
        self
    }

    pub fn with_product(mut self, product_id: impl Into<String>, product_time: impl Into<String>) -> Self {
        self.products.push(Product { product_id: product_id.into(), product_time: product_time.into() });
        self
    }

    pub fn with_revisit(mut self, every_days: i64, time_of_day: NaiveTime) -> Self {
        self.revisit = Some(ProductRevisit { every_days: every_days.max(1), time_of_day });
        self
    }

    /// Number of login requests received
    pub fn login_attempts(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn registered_areas(&self) -> Vec<geojson::Geometry> {
        self.areas.lock().map(|areas| areas.clone()).unwrap_or_default()
    }

    fn check_token(&self, session: &UserSession, path: &str) -> Result<()> {
        if session.access_token != ACCESS_TOKEN {
            return Err(FloodError::Http {
                status: 401,
                url: format!("memory://{}", path),
                body: "invalid access token".to_string(),
            });
        }
        Ok(())
    }

    fn revisit_products(&self, window: &TimeWindow) -> Vec<Product> {
        let Some(revisit) = self.revisit else {
            return Vec::new();
        };
        let anchor = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN);

        window
            .days()
            .into_iter()
            .filter(|day| (*day - anchor).num_days().rem_euclid(revisit.every_days) == 0)
            .map(|day| Product {
                product_id: format!("gfm-{}", day.format("%Y%m%d")),
                product_time: day.and_time(revisit.time_of_day).format("%Y-%m-%dT%H:%M:%S").to_string(),
            })
            .collect()
    }
}

impl GfmApi for MemoryGfmApi {
    fn login(&self, credentials: &Credentials) -> Result<UserSession> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        match &self.account {
            Some(account) if account != credentials => Err(FloodError::Http {
                status: 400,
                url: "memory://auth/login".to_string(),
                body: "Incorrect email or password".to_string(),
            }),
            _ => Ok(UserSession { access_token: ACCESS_TOKEN.to_string(), client_id: CLIENT_ID.to_string() }),
        }
    }

    fn create_aoi(&self, session: &UserSession, geometry: &geojson::Geometry) -> Result<String> {
        self.check_token(session, "aoi/create")?;
        let mut areas = self.areas.lock().map_err(|e| FloodError::platform("create_aoi", e))?;
        areas.push(geometry.clone());
        Ok(format!("aoi-{}", areas.len()))
    }

    fn products(&self, session: &UserSession, aoi_id: &str, window: &TimeWindow) -> Result<Vec<Product>> {
        self.check_token(session, &format!("aoi/{}/products", aoi_id))?;
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| DateInput::parse(&p.product_time).map(|t| window.contains(&t)).unwrap_or(false))
            .cloned()
            .collect();
        products.extend(self.revisit_products(window));
        Ok(products)
    }

    fn download_link(&self, session: &UserSession, product_id: &str) -> Result<Value> {
        let path = format!("download/product/{}/{}", product_id, session.client_id);
        self.check_token(session, &path)?;

        let known = self.products.iter().any(|p| p.product_id == product_id)
            || (self.revisit.is_some() && product_id.starts_with("gfm-"));
        if !known {
            return Err(FloodError::Http {
                status: 404,
                url: format!("memory://{}", path),
                body: "product not found".to_string(),
            });
        }
        Ok(json!({ "download_link": format!("memory://{}", path) }))
    }
}
