//! Catalog of supported sensor datasets.
//!
//! The registry is built once on first use and never mutated afterwards.
//! Providers clone the specs they bind, so per-session changes stay local.

use crate::error::{FloodError, Result};
use crate::models::{
    AlgorithmParams, DatasetSpec, ImageryType, ProviderKind, ThresholdAlgorithm, VisParams,
};
use std::collections::BTreeMap;
use once_cell::sync::Lazy;

static DATASETS: Lazy<Vec<DatasetSpec>> = Lazy::new(|| {
    vec![
        sar(
            "Sentinel-1",
            "S1",
            "COPERNICUS/S1_GRD",
            AlgorithmParams::band("VV").inverted().initial_threshold(-16.0),
            VisParams::bands(["VV"]).range(-25.0, 0.0),
            "VV",
        ),
        optical("Sentinel-2", "S2", "COPERNICUS/S2_SR_HARMONIZED", VisParams::default(), false),
        optical(
            "Landsat 7",
            "L7",
            "LANDSAT/LE07/C02/T1_L2",
            VisParams::bands(["swir1", "nir", "green"]).range(0.0, 0.5),
            false,
        ),
        optical(
            "Landsat 8",
            "L8",
            "LANDSAT/LC08/C02/T1_L2",
            VisParams::bands(["swir1", "nir", "green"]).range(0.0, 0.5),
            false,
        ),
        optical("VIIRS", "VIIRS", "NOAA/VIIRS/001/VNP09GA", VisParams::default(), true),
        optical("MODIS", "MODIS", "MODIS/061/MOD09GA", VisParams::default(), true),
    ]
});

fn sar(
    name: &str,
    short_name: &str,
    asset_id: &str,
    params: AlgorithmParams,
    visual_params: VisParams,
    qa_band: &str,
) -> DatasetSpec {
    DatasetSpec {
        name: name.to_string(),
        short_name: short_name.to_string(),
        asset_id: asset_id.to_string(),
        imagery_type: ImageryType::Sar,
        default_algorithm: ThresholdAlgorithm::EdgeOtsu,
        algorithm_params: BTreeMap::from([(ThresholdAlgorithm::EdgeOtsu, params)]),
        visual_params,
        qa_band: qa_band.to_string(),
        providers: vec![ProviderKind::Gfm, ProviderKind::HydraFloods],
        global_coverage: false,
    }
}

fn optical(
    name: &str,
    short_name: &str,
    asset_id: &str,
    visual_params: VisParams,
    global_coverage: bool,
) -> DatasetSpec {
    DatasetSpec {
        name: name.to_string(),
        short_name: short_name.to_string(),
        asset_id: asset_id.to_string(),
        imagery_type: ImageryType::Optical,
        default_algorithm: ThresholdAlgorithm::EdgeOtsu,
        algorithm_params: BTreeMap::from([(
            ThresholdAlgorithm::EdgeOtsu,
            AlgorithmParams::band("mndwi"),
        )]),
        visual_params,
        qa_band: "swir1".to_string(),
        providers: vec![ProviderKind::HydraFloods],
        global_coverage,
    }
}

/// All registered datasets in registry order
pub fn all() -> &'static [DatasetSpec] {
    &DATASETS
}

/// Names of all registered datasets, comma separated
pub fn supported_names() -> String {
    DATASETS.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(",")
}

/// Look up a single dataset by name
pub fn lookup(name: &str) -> Result<&'static DatasetSpec> {
    DATASETS.iter().find(|d| d.name == name).ok_or_else(|| FloodError::DatasetNotRecognized {
        name: name.to_string(),
        supported: supported_names(),
    })
}

/// Resolve a selection of dataset names; `None` selects every dataset
pub fn resolve<S: AsRef<str>>(names: Option<&[S]>) -> Result<Vec<&'static DatasetSpec>> {
    match names {
        None => Ok(DATASETS.iter().collect()),
        Some(names) => names.iter().map(|n| lookup(n.as_ref())).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_dataset() {
        let s1 = lookup("Sentinel-1").unwrap();
        assert_eq!(s1.name, "Sentinel-1");
        assert_eq!(s1.imagery_type, ImageryType::Sar);
        let params = s1.default_params().unwrap();
        assert_eq!(params.band, "VV");
        assert!(params.invert);
        assert_eq!(params.initial_threshold, Some(-16.0));
        assert_eq!(s1.provider_names(), "GFM, Hydrafloods");
    }

    #[test]
    fn test_lookup_unknown_dataset_lists_supported() {
        let err = lookup("Sentinel-3").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Dataset 'Sentinel-3' not recognized"));
        for spec in all() {
            assert!(message.contains(&spec.name));
        }
    }

    #[test]
    fn test_resolve_none_returns_all() {
        let specs = resolve::<&str>(None).unwrap();
        assert_eq!(specs.len(), 6);
        assert_eq!(specs[0].name, "Sentinel-1");
    }

    #[test]
    fn test_resolve_subset_keeps_order_given() {
        let specs = resolve(Some(&["Landsat 8", "Sentinel-1"][..])).unwrap();
        assert_eq!(specs[0].short_name, "L8");
        assert_eq!(specs[1].short_name, "S1");
        assert!(resolve(Some(&["Landsat 8", "Landsat 9"][..])).is_err());
    }

    #[test]
    fn test_optical_datasets_threshold_mndwi() {
        for spec in all().iter().filter(|d| d.is_optical()) {
            assert_eq!(spec.default_params().unwrap().band, "mndwi");
            assert_eq!(spec.qa_band, "swir1");
        }
        assert!(lookup("VIIRS").unwrap().global_coverage);
        assert!(!lookup("Landsat 7").unwrap().global_coverage);
    }
}
