use super::aoi::BoundingBox;
use super::expr::ImageExpr;
use crate::error::{FloodError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pixel budget passed with every export
pub const DEFAULT_MAX_PIXELS: f64 = 1e13;

/// Export target family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExportKind {
    /// Shared drive folder
    #[default]
    #[serde(rename = "toDrive")]
    ToDrive,
    /// Hosted asset store
    #[serde(rename = "toAsset")]
    ToAsset,
}

impl ExportKind {
    /// Human readable label, e.g. "to Drive"
    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::ToDrive => "to Drive",
            ExportKind::ToAsset => "to Asset",
        }
    }
}

impl FromStr for ExportKind {
    type Err = FloodError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "todrive" | "drive" => Ok(ExportKind::ToDrive),
            "toasset" | "asset" => Ok(ExportKind::ToAsset),
            _ => Err(FloodError::ConfigInvalid {
                key: "export_type".to_string(),
                reason: format!("Invalid export type: {}. Use toDrive or toAsset", s),
            }),
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportKind::ToDrive => f.write_str("toDrive"),
            ExportKind::ToAsset => f.write_str("toAsset"),
        }
    }
}

/// Resolved destination of a single export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportDestination {
    Drive { folder: String },
    Asset { asset_id: String },
}

/// One export job as submitted to the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTask {
    pub image: ImageExpr,
    pub description: String,
    pub destination: ExportDestination,
    /// Pixel size in meters
    pub scale: f64,
    pub region: BoundingBox,
    pub max_pixels: f64,
}

/// Identifier the platform returns for an accepted export
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_kind() {
        assert_eq!("toDrive".parse::<ExportKind>().unwrap(), ExportKind::ToDrive);
        assert_eq!("toAsset".parse::<ExportKind>().unwrap(), ExportKind::ToAsset);
        assert!("toCloud".parse::<ExportKind>().is_err());
        assert_eq!(ExportKind::ToAsset.label(), "to Asset");
    }
}
