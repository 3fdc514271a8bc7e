//! Platform selection from layered configuration

use eofloods_core::config::{CliConfigOverrides, LayeredConfig, PlatformKind};
use eofloods_core::models::{BoundingBox, CollectionExpr, TimeWindow};
use eofloods_core::FloodError;
use eofloods_platform::connect;
use serial_test::serial;
use std::env;

#[test]
fn test_memory_platform_from_config() {
    let mut config = LayeredConfig::with_defaults();
    config.update_from_cli(CliConfigOverrides { platform: Some(PlatformKind::Memory), ..Default::default() });

    let platform = connect(&config).unwrap();
    assert_eq!(platform.name(), "memory");

    let aoi = BoundingBox::new(4.221067, 51.949474, 4.471006, 52.073727).unwrap();
    let window = TimeWindow::parse("2023-04-01", "2023-04-30").unwrap();
    let collection = CollectionExpr::load("LANDSAT/LC08/C02/T1_L2", aoi, window.as_date_window());
    assert_eq!(platform.image_count(&collection).unwrap(), 2);
}

#[test]
#[serial]
fn test_remote_platform_requires_project() {
    env::remove_var("EARTH_ENGINE_PROJECT");
    env::set_var("EARTHENGINE_TOKEN", "token");

    let config = LayeredConfig::with_defaults();
    let err = connect(&config).err().unwrap();
    assert!(matches!(err, FloodError::MissingCredentials { .. }));

    env::remove_var("EARTHENGINE_TOKEN");
}
