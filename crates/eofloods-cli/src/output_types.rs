use eofloods_core::models::MapView;
use serde::Serialize;
use tabled::Tabled;

/// One image of a dataset in the `available` table
#[derive(Debug, Tabled)]
pub struct ImageRow {
    #[tabled(rename = "Dataset")]
    pub dataset: String,
    #[tabled(rename = "Timestamp")]
    pub timestamp: String,
    #[tabled(rename = "Quality score (%)")]
    pub quality_score: String,
}

#[derive(Debug, Tabled)]
pub struct ProductRow {
    #[tabled(rename = "GFM product time")]
    pub product_time: String,
}

#[derive(Debug, Tabled)]
pub struct LayerRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Layer")]
    pub name: String,
}

#[derive(Debug, Tabled)]
pub struct ExportRow {
    #[tabled(rename = "Dataset")]
    pub dataset: String,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Task")]
    pub task_id: String,
}

#[derive(Debug, Tabled)]
pub struct LinkRow {
    #[tabled(rename = "Product time")]
    pub product_time: String,
    #[tabled(rename = "Download link")]
    pub link: String,
}

#[derive(Debug, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

/// Output for preview and flood-extents commands
#[derive(Debug, Serialize)]
pub struct MapOutput {
    /// File the map was written to, if any
    pub output_path: Option<String>,
    pub map: MapView,
}

/// Output for the flood-extents command
#[derive(Debug, Serialize)]
pub struct FloodExtentsOutput {
    pub generated: Vec<String>,
    pub skipped: Vec<String>,
    pub output_path: Option<String>,
    pub map: MapView,
}

/// Output for the config command
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}

impl LayerRow {
    pub fn from_map(map: &MapView) -> Vec<Self> {
        map.layers.iter().enumerate().map(|(index, layer)| LayerRow { index, name: layer.name.clone() }).collect()
    }
}
