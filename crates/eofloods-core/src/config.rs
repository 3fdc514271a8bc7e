use crate::error::{FloodError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GFM_API_URL: &str = "https://api.gfm.eodc.eu/v2/";
pub const DEFAULT_PLATFORM_URL: &str = "https://earthengine.googleapis.com/v1";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "env",
            ConfigSource::Cli => "cli",
        };
        f.write_str(label)
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Which imagery platform adapter a session talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Built-in scene catalog, no network access
    Memory,
    #[default]
    Remote,
}

impl FromStr for PlatformKind {
    type Err = FloodError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(PlatformKind::Memory),
            "remote" => Ok(PlatformKind::Remote),
            _ => Err(FloodError::ConfigInvalid {
                key: "platform".to_string(),
                reason: format!("Invalid platform: {}. Use memory or remote", s),
            }),
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Memory => f.write_str("memory"),
            PlatformKind::Remote => f.write_str("remote"),
        }
    }
}

/// Layered configuration for EO-Floods
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub platform: ConfigValue<PlatformKind>,
    pub platform_url: ConfigValue<String>,
    pub gfm_api_url: ConfigValue<String>,
    pub plot_timeout_secs: ConfigValue<u64>,
    pub zoom: ConfigValue<u8>,
    pub export_folder: ConfigValue<String>,
    pub export_scale: ConfigValue<f64>,
    pub clip_ocean: ConfigValue<bool>,
    pub mask_permanent_water: ConfigValue<bool>,
    pub permanent_water_threshold: ConfigValue<f64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            platform: ConfigValue::new(PlatformKind::Remote, ConfigSource::Default),
            platform_url: ConfigValue::new(DEFAULT_PLATFORM_URL.to_string(), ConfigSource::Default),
            gfm_api_url: ConfigValue::new(DEFAULT_GFM_API_URL.to_string(), ConfigSource::Default),
            plot_timeout_secs: ConfigValue::new(300, ConfigSource::Default),
            zoom: ConfigValue::new(8, ConfigSource::Default),
            export_folder: ConfigValue::new("EO_Floods".to_string(), ConfigSource::Default),
            export_scale: ConfigValue::new(30.0, ConfigSource::Default),
            clip_ocean: ConfigValue::new(true, ConfigSource::Default),
            mask_permanent_water: ConfigValue::new(true, ConfigSource::Default),
            permanent_water_threshold: ConfigValue::new(50.0, ConfigSource::Default),
        }
    }

    pub fn plot_timeout(&self) -> Duration {
        Duration::from_secs(self.plot_timeout_secs.value)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| FloodError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| FloodError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(platform) = file_config.platform {
            self.platform.update(platform, ConfigSource::File);
        }
        if let Some(url) = file_config.platform_url {
            self.platform_url.update(url, ConfigSource::File);
        }
        if let Some(url) = file_config.gfm_api_url {
            self.gfm_api_url.update(url, ConfigSource::File);
        }
        if let Some(secs) = file_config.plot_timeout_secs {
            self.plot_timeout_secs.update(secs, ConfigSource::File);
        }
        if let Some(zoom) = file_config.zoom {
            self.zoom.update(parse_zoom(&zoom.to_string())?, ConfigSource::File);
        }
        if let Some(folder) = file_config.export_folder {
            self.export_folder.update(folder, ConfigSource::File);
        }
        if let Some(scale) = file_config.export_scale {
            self.export_scale.update(parse_positive("export_scale", &scale.to_string())?, ConfigSource::File);
        }
        if let Some(clip) = file_config.clip_ocean {
            self.clip_ocean.update(clip, ConfigSource::File);
        }
        if let Some(mask) = file_config.mask_permanent_water {
            self.mask_permanent_water.update(mask, ConfigSource::File);
        }
        if let Some(threshold) = file_config.permanent_water_threshold {
            self.permanent_water_threshold
                .update(parse_occurrence(&threshold.to_string())?, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from `EOFLOODS_*` environment variables
    ///
    /// Unparseable values are logged and ignored.
    pub fn load_from_env(mut self) -> Self {
        if let Ok(value) = env::var("EOFLOODS_PLATFORM") {
            match value.parse::<PlatformKind>() {
                Ok(platform) => self.platform.update(platform, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid EOFLOODS_PLATFORM value '{}': expected memory or remote",
                    value
                ),
            }
        }

        if let Ok(url) = env::var("EOFLOODS_PLATFORM_URL") {
            self.platform_url.update(url, ConfigSource::Environment);
        }

        if let Ok(url) = env::var("EOFLOODS_GFM_API_URL") {
            self.gfm_api_url.update(url, ConfigSource::Environment);
        }

        if let Ok(value) = env::var("EOFLOODS_PLOT_TIMEOUT") {
            match value.parse::<u64>() {
                Ok(secs) => self.plot_timeout_secs.update(secs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid EOFLOODS_PLOT_TIMEOUT value '{}': expected whole seconds",
                    value
                ),
            }
        }

        if let Ok(value) = env::var("EOFLOODS_ZOOM") {
            match parse_zoom(&value) {
                Ok(zoom) => self.zoom.update(zoom, ConfigSource::Environment),
                Err(_) => tracing::warn!("Invalid EOFLOODS_ZOOM value '{}': expected 0-24", value),
            }
        }

        if let Ok(folder) = env::var("EOFLOODS_EXPORT_FOLDER") {
            self.export_folder.update(folder, ConfigSource::Environment);
        }

        if let Ok(value) = env::var("EOFLOODS_EXPORT_SCALE") {
            match parse_positive("export_scale", &value) {
                Ok(scale) => self.export_scale.update(scale, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid EOFLOODS_EXPORT_SCALE value '{}': expected meters per pixel",
                    value
                ),
            }
        }

        if let Ok(value) = env::var("EOFLOODS_CLIP_OCEAN") {
            match parse_bool("clip_ocean", &value) {
                Ok(clip) => self.clip_ocean.update(clip, ConfigSource::Environment),
                Err(_) => tracing::warn!("Invalid EOFLOODS_CLIP_OCEAN value '{}'", value),
            }
        }

        if let Ok(value) = env::var("EOFLOODS_MASK_PERMANENT_WATER") {
            match parse_bool("mask_permanent_water", &value) {
                Ok(mask) => self.mask_permanent_water.update(mask, ConfigSource::Environment),
                Err(_) => tracing::warn!("Invalid EOFLOODS_MASK_PERMANENT_WATER value '{}'", value),
            }
        }

        if let Ok(value) = env::var("EOFLOODS_PERMANENT_WATER_THRESHOLD") {
            match parse_occurrence(&value) {
                Ok(threshold) => {
                    self.permanent_water_threshold.update(threshold, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid EOFLOODS_PERMANENT_WATER_THRESHOLD value '{}': expected 0-100",
                    value
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(platform) = overrides.platform {
            self.platform.update(platform, ConfigSource::Cli);
        }
        if let Some(secs) = overrides.plot_timeout_secs {
            self.plot_timeout_secs.update(secs, ConfigSource::Cli);
        }
        if let Some(zoom) = overrides.zoom {
            self.zoom.update(zoom, ConfigSource::Cli);
        }
        if let Some(folder) = overrides.export_folder {
            self.export_folder.update(folder, ConfigSource::Cli);
        }
        if let Some(scale) = overrides.export_scale {
            self.export_scale.update(scale, ConfigSource::Cli);
        }
        if let Some(clip) = overrides.clip_ocean {
            self.clip_ocean.update(clip, ConfigSource::Cli);
        }
        if let Some(mask) = overrides.mask_permanent_water {
            self.mask_permanent_water.update(mask, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("platform".to_string(), (self.platform.value.to_string(), self.platform.source));
        map.insert(
            "platform_url".to_string(),
            (self.platform_url.value.clone(), self.platform_url.source),
        );
        map.insert("gfm_api_url".to_string(), (self.gfm_api_url.value.clone(), self.gfm_api_url.source));
        map.insert(
            "plot_timeout_secs".to_string(),
            (format!("{}s", self.plot_timeout_secs.value), self.plot_timeout_secs.source),
        );
        map.insert("zoom".to_string(), (self.zoom.value.to_string(), self.zoom.source));
        map.insert(
            "export_folder".to_string(),
            (self.export_folder.value.clone(), self.export_folder.source),
        );
        map.insert(
            "export_scale".to_string(),
            (format!("{} m", self.export_scale.value), self.export_scale.source),
        );
        map.insert("clip_ocean".to_string(), (self.clip_ocean.value.to_string(), self.clip_ocean.source));
        map.insert(
            "mask_permanent_water".to_string(),
            (self.mask_permanent_water.value.to_string(), self.mask_permanent_water.source),
        );
        map.insert(
            "permanent_water_threshold".to_string(),
            (format!("{}%", self.permanent_water_threshold.value), self.permanent_water_threshold.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    platform: Option<PlatformKind>,
    platform_url: Option<String>,
    gfm_api_url: Option<String>,
    plot_timeout_secs: Option<u64>,
    zoom: Option<u32>,
    export_folder: Option<String>,
    export_scale: Option<f64>,
    clip_ocean: Option<bool>,
    mask_permanent_water: Option<bool>,
    permanent_water_threshold: Option<f64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub platform: Option<PlatformKind>,
    pub plot_timeout_secs: Option<u64>,
    pub zoom: Option<u8>,
    pub export_folder: Option<String>,
    pub export_scale: Option<f64>,
    pub clip_ocean: Option<bool>,
    pub mask_permanent_water: Option<bool>,
}

/// Parse a boolean flag value
pub fn parse_bool(key: &str, s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(FloodError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("Invalid boolean: {}. Use true or false", s),
        }),
    }
}

/// Parse a web map zoom level
pub fn parse_zoom(s: &str) -> Result<u8> {
    match s.trim().parse::<u8>() {
        Ok(zoom) if zoom <= 24 => Ok(zoom),
        _ => Err(FloodError::ConfigInvalid {
            key: "zoom".to_string(),
            reason: format!("Invalid zoom level: {}. Use a value between 0 and 24", s),
        }),
    }
}

/// Parse a water occurrence percentage
pub fn parse_occurrence(s: &str) -> Result<f64> {
    match s.trim().parse::<f64>() {
        Ok(value) if (0.0..=100.0).contains(&value) => Ok(value),
        _ => Err(FloodError::ConfigInvalid {
            key: "permanent_water_threshold".to_string(),
            reason: format!("Invalid occurrence: {}. Use a percentage between 0 and 100", s),
        }),
    }
}

fn parse_positive(key: &str, s: &str) -> Result<f64> {
    match s.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(FloodError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("Invalid value: {}. Expected a positive number", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.plot_timeout_secs.value, 300);
        assert_eq!(config.plot_timeout(), Duration::from_secs(300));
        assert_eq!(config.zoom.value, 8);
        assert_eq!(config.export_folder.value, "EO_Floods");
        assert_eq!(config.export_scale.value, 30.0);
        assert!(config.clip_ocean.value);
        assert!(config.mask_permanent_water.value);
        assert_eq!(config.permanent_water_threshold.value, 50.0);
        assert_eq!(config.gfm_api_url.value, DEFAULT_GFM_API_URL);
        assert_eq!(config.zoom.source, ConfigSource::Default);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
platform = "memory"
plot_timeout_secs = 60
zoom = 10
export_folder = "floods"
clip_ocean = false
permanent_water_threshold = 80.0
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.platform.value, PlatformKind::Memory);
        assert_eq!(config.platform.source, ConfigSource::File);
        assert_eq!(config.plot_timeout_secs.value, 60);
        assert_eq!(config.zoom.value, 10);
        assert_eq!(config.export_folder.value, "floods");
        assert!(!config.clip_ocean.value);
        assert_eq!(config.permanent_water_threshold.value, 80.0);
        assert_eq!(config.export_scale.source, ConfigSource::Default);
    }

    #[test]
    fn test_load_from_file_rejects_bad_threshold() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "permanent_water_threshold = 150.0").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(FloodError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            platform: Some(PlatformKind::Memory),
            plot_timeout_secs: Some(5),
            ..Default::default()
        });

        assert_eq!(config.platform.value, PlatformKind::Memory);
        assert_eq!(config.platform.source, ConfigSource::Cli);
        assert_eq!(config.plot_timeout_secs.value, 5);
        assert_eq!(config.zoom.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_helpers() {
        assert!(parse_bool("clip_ocean", "YES").unwrap());
        assert!(!parse_bool("clip_ocean", "off").unwrap());
        assert!(parse_bool("clip_ocean", "maybe").is_err());
        assert_eq!(parse_zoom("12").unwrap(), 12);
        assert!(parse_zoom("30").is_err());
        assert_eq!(parse_occurrence("50").unwrap(), 50.0);
        assert!(parse_occurrence("-1").is_err());
        assert_eq!("MEMORY".parse::<PlatformKind>().unwrap(), PlatformKind::Memory);
        assert!("cloud".parse::<PlatformKind>().is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert_eq!(map.len(), 10);
        let (timeout, source) = &map["plot_timeout_secs"];
        assert_eq!(timeout, "300s");
        assert_eq!(*source, ConfigSource::Default);
        assert_eq!(map["permanent_water_threshold"].0, "50%");
    }
}
