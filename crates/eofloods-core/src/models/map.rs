//! Map descriptions produced by the preview builders.
//!
//! A [`MapView`] is plain data: a center, a zoom level, and ordered layers.
//! It can be serialized to JSON or rendered into a standalone Leaflet page.

use super::aoi::BoundingBox;
use super::dataset::VisParams;
use serde::{Deserialize, Serialize};

const LEAFLET_VERSION: &str = "1.9.4";

/// Where a layer's pixels come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSource {
    /// XYZ tile template, e.g. `https://host/{z}/{x}/{y}`
    Tiles { url: String },
    /// OGC WMS endpoint with an optional TIME dimension
    Wms { url: String, layers: String, time: Option<String> },
    /// Vector outline drawn client side
    GeoJson { geometry: serde_json::Value, color: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayer {
    pub name: String,
    pub source: LayerSource,
    #[serde(default, skip_serializing_if = "VisParams::is_empty")]
    pub vis_params: VisParams,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl MapLayer {
    pub fn new(name: impl Into<String>, source: LayerSource) -> Self {
        Self { name: name.into(), source, vis_params: VisParams::default(), visible: true }
    }

    pub fn with_vis_params(mut self, vis_params: VisParams) -> Self {
        self.vis_params = vis_params;
        self
    }
}

/// Interactive map description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// `(latitude, longitude)`
    pub center: (f64, f64),
    pub zoom: u8,
    /// Bounds the view is fitted to on load
    pub fit_bounds: Option<BoundingBox>,
    pub layers: Vec<MapLayer>,
    /// Time slider values for WMS layers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_options: Vec<String>,
}

impl MapView {
    pub fn new(center: (f64, f64), zoom: u8) -> Self {
        Self { center, zoom, fit_bounds: None, layers: Vec::new(), time_options: Vec::new() }
    }

    pub fn add_layer(&mut self, layer: MapLayer) {
        self.layers.push(layer);
    }

    /// Draw the area of interest as a red outline and fit the view to it
    pub fn add_aoi_and_zoom_to_bounds(&mut self, aoi: &BoundingBox) {
        let geometry = serde_json::to_value(aoi.to_geojson()).unwrap_or(serde_json::Value::Null);
        self.add_layer(MapLayer::new(
            "Area of interest",
            LayerSource::GeoJson { geometry, color: "red".to_string() },
        ));
        self.fit_bounds = Some(*aoi);
    }

    pub fn layer(&self, name: &str) -> Option<&MapLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }

    /// Render a standalone HTML page using Leaflet
    pub fn to_html(&self, title: &str) -> String {
        let mut script = String::new();
        script.push_str(&format!(
            "var map = L.map('map').setView([{}, {}], {});\n",
            self.center.0, self.center.1, self.zoom
        ));
        script.push_str(
            "var base = L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', \
             {maxZoom: 19, attribution: '&copy; OpenStreetMap contributors'}).addTo(map);\n",
        );
        script.push_str("var overlays = {};\n");

        for (i, layer) in self.layers.iter().enumerate() {
            let name = serde_json::to_string(&layer.name).unwrap_or_default();
            let construct = match &layer.source {
                LayerSource::Tiles { url } => {
                    format!("L.tileLayer({})", serde_json::to_string(url).unwrap_or_default())
                }
                LayerSource::Wms { url, layers, time } => {
                    let mut options = serde_json::json!({
                        "layers": layers,
                        "format": "image/png",
                        "transparent": true,
                    });
                    if let Some(time) = time {
                        options["time"] = serde_json::Value::String(time.clone());
                    }
                    format!("L.tileLayer.wms({}, {})", serde_json::to_string(url).unwrap_or_default(), options)
                }
                LayerSource::GeoJson { geometry, color } => format!(
                    "L.geoJSON({}, {{style: {{color: {}, fillOpacity: 0}}}})",
                    geometry,
                    serde_json::to_string(color).unwrap_or_default()
                ),
            };
            script.push_str(&format!("var layer{} = {};\n", i, construct));
            if layer.visible {
                script.push_str(&format!("layer{}.addTo(map);\n", i));
            }
            script.push_str(&format!("overlays[{}] = layer{};\n", name, i));
        }

        script.push_str("L.control.layers({'OpenStreetMap': base}, overlays).addTo(map);\n");
        if let Some(bounds) = &self.fit_bounds {
            let [[south, west], [north, east]] = bounds.leaflet_bounds();
            script.push_str(&format!("map.fitBounds([[{}, {}], [{}, {}]]);\n", south, west, north, east));
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{v}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{v}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
{script}</script>
</body>
</html>
"#,
            title = title,
            v = LEAFLET_VERSION,
            script = script
        )
    }
}
