use crate::error::{FloodError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Imagery category of a sensor dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageryType {
    #[serde(rename = "SAR")]
    Sar,
    #[serde(rename = "optical")]
    Optical,
}

impl fmt::Display for ImageryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageryType::Sar => write!(f, "SAR"),
            ImageryType::Optical => write!(f, "optical"),
        }
    }
}

/// Thresholding algorithms the platform can run per image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdAlgorithm {
    /// Otsu threshold computed from pixels near detected water edges
    EdgeOtsu,
}

impl ThresholdAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            ThresholdAlgorithm::EdgeOtsu => "edge_otsu",
        }
    }

    /// Classification value the algorithm assigns to non-water pixels
    pub fn land_value(&self) -> f64 {
        match self {
            ThresholdAlgorithm::EdgeOtsu => 0.0,
        }
    }
}

/// Parameters for a thresholding run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmParams {
    /// Band to threshold
    pub band: String,

    /// Treat low values as water (backscatter)
    #[serde(default)]
    pub invert: bool,

    /// Starting threshold for edge detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_threshold: Option<f64>,
}

impl AlgorithmParams {
    pub fn band(band: impl Into<String>) -> Self {
        Self { band: band.into(), invert: false, initial_threshold: None }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    pub fn initial_threshold(mut self, threshold: f64) -> Self {
        self.initial_threshold = Some(threshold);
        self
    }
}

/// Visualization parameters for a map layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisParams {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<String>,
}

impl VisParams {
    pub fn bands<S: Into<String>>(bands: impl IntoIterator<Item = S>) -> Self {
        Self { bands: bands.into_iter().map(Into::into).collect(), ..Default::default() }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn palette<S: Into<String>>(mut self, colors: impl IntoIterator<Item = S>) -> Self {
        self.palette = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == VisParams::default()
    }
}

/// Flood map backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Imagery-platform pipeline orchestrated locally
    HydraFloods,
    /// Global Flood Monitor hosted API
    Gfm,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::HydraFloods, ProviderKind::Gfm];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::HydraFloods => "Hydrafloods",
            ProviderKind::Gfm => "GFM",
        }
    }

    pub fn supported() -> String {
        Self::ALL.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for ProviderKind {
    type Err = FloodError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hydrafloods" => Ok(ProviderKind::HydraFloods),
            "gfm" => Ok(ProviderKind::Gfm),
            _ => Err(FloodError::ProviderNotRecognized {
                name: s.to_string(),
                supported: Self::supported(),
            }),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of a sensor dataset and its default processing recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Display name, also the registry key
    pub name: String,

    /// Short name used in export descriptions
    pub short_name: String,

    /// Collection identifier on the imagery platform
    pub asset_id: String,

    pub imagery_type: ImageryType,

    pub default_algorithm: ThresholdAlgorithm,

    pub algorithm_params: BTreeMap<ThresholdAlgorithm, AlgorithmParams>,

    pub visual_params: VisParams,

    /// Band used for the quality score
    pub qa_band: String,

    /// Providers able to serve this dataset
    pub providers: Vec<ProviderKind>,

    /// Delivered as global tiles that must be clipped before reductions
    #[serde(default)]
    pub global_coverage: bool,
}

impl DatasetSpec {
    /// Parameters of the default thresholding algorithm
    pub fn default_params(&self) -> Option<&AlgorithmParams> {
        self.algorithm_params.get(&self.default_algorithm)
    }

    pub fn is_optical(&self) -> bool {
        self.imagery_type == ImageryType::Optical
    }

    pub fn provider_names(&self) -> String {
        self.providers.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
    }
}
