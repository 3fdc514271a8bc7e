//! HTTP adapter for a remote compute gateway.
//!
//! Expressions are serialized as JSON and evaluated server side:
//! - `POST {base}/projects/{project}/value:compute` for counts, dates, scores
//! - `POST {base}/projects/{project}/maps` to register a tile layer
//! - `POST {base}/projects/{project}/image:export` to start an export

use crate::session::PlatformSession;
use chrono::{DateTime, NaiveDateTime};
use eofloods_core::models::{
    CollectionExpr, ExportDestination, ExportTask, ImageExpr, TaskId, VisParams, TIME_START_PROPERTY,
};
use eofloods_core::ports::ImageryPlatform;
use eofloods_core::{FloodError, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Imagery platform reached over HTTPS
pub struct RemotePlatform {
    /// Base URL of the gateway, e.g. "https://earthengine.googleapis.com/v1"
    base_url: String,
    session: PlatformSession,
    client: Client,
}

impl RemotePlatform {
    pub fn new(base_url: impl Into<String>, session: PlatformSession) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("eofloods/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FloodError::platform("create HTTP client", e))?;
        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), session, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/projects/{}/{}", self.base_url, self.session.project(), method)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T> {
        let url = self.endpoint(method);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.session.token())
            .json(body)
            .send()
            .map_err(|e| FloodError::Transport { url: url.clone(), reason: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FloodError::Http { status: status.as_u16(), url, body });
        }

        response.json::<T>().map_err(|e| FloodError::platform(method, format!("malformed response: {}", e)))
    }

    fn compute<T: DeserializeOwned>(&self, expression: Value) -> Result<T> {
        let response: ComputeResponse<T> = self.post("value:compute", &json!({ "expression": expression }))?;
        Ok(response.result)
    }
}

#[derive(Debug, Deserialize)]
struct ComputeResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    /// Resource name, `projects/{project}/maps/{id}`
    name: String,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    /// Resource name, `projects/{project}/operations/{id}`
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequest<'a> {
    expression: &'a ImageExpr,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_export_options: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset_export_options: Option<Value>,
    max_pixels: f64,
    scale: f64,
    region: Value,
}

impl<'a> ExportRequest<'a> {
    fn from_task(task: &'a ExportTask) -> Result<Self> {
        let (file_export_options, asset_export_options) = match &task.destination {
            ExportDestination::Drive { folder } => (
                Some(json!({ "fileFormat": "GEO_TIFF", "driveDestination": { "folder": folder, "filenamePrefix": task.description } })),
                None,
            ),
            ExportDestination::Asset { asset_id } => {
                (None, Some(json!({ "earthEngineDestination": { "name": asset_id } })))
            }
        };
        Ok(Self {
            expression: &task.image,
            description: &task.description,
            file_export_options,
            asset_export_options,
            max_pixels: task.max_pixels,
            scale: task.scale,
            region: serde_json::to_value(task.region.to_geojson())?,
        })
    }
}

impl ImageryPlatform for RemotePlatform {
    fn name(&self) -> &str {
        "remote"
    }

    fn image_count(&self, collection: &CollectionExpr) -> Result<usize> {
        self.compute(json!({ "op": "count", "collection": collection }))
    }

    fn image_dates(&self, collection: &CollectionExpr) -> Result<Vec<NaiveDateTime>> {
        let millis: Vec<i64> = self.compute(json!({
            "op": "aggregate_array",
            "collection": collection,
            "property": TIME_START_PROPERTY,
        }))?;
        millis
            .into_iter()
            .map(|ms| {
                DateTime::from_timestamp_millis(ms)
                    .map(|dt| dt.naive_utc())
                    .ok_or_else(|| FloodError::platform("image_dates", format!("invalid timestamp {}", ms)))
            })
            .collect()
    }

    fn quality_scores(&self, collection: &CollectionExpr, qa_band: &str) -> Result<Vec<f64>> {
        let scores: Vec<f64> = self.compute(json!({
            "op": "unmasked_percentage",
            "collection": collection,
            "band": qa_band,
        }))?;
        Ok(scores.into_iter().map(|s| (s * 100.0).round() / 100.0).collect())
    }

    fn nominal_scale(&self, image: &ImageExpr) -> Result<f64> {
        self.compute(json!({ "op": "nominal_scale", "image": image }))
    }

    fn tile_url(&self, image: &ImageExpr, vis_params: &VisParams) -> Result<String> {
        let map: MapResponse =
            self.post("maps", &json!({ "expression": image, "visualizationOptions": vis_params }))?;
        Ok(format!("{}/{}/tiles/{{z}}/{{x}}/{{y}}", self.base_url, map.name))
    }

    fn submit_export(&self, task: &ExportTask) -> Result<TaskId> {
        let operation: OperationResponse = self.post("image:export", &ExportRequest::from_task(task)?)?;
        let id = operation.name.rsplit('/').next().unwrap_or(&operation.name).to_string();
        tracing::debug!("Export task {} accepted as {}", task.description, id);
        Ok(TaskId(id))
    }
}
