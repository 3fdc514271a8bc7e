//! Time-enabled WMS map of published GFM layers.

use eofloods_core::models::dates::dates_in_time_range;
use eofloods_core::models::{BoundingBox, LayerSource, MapLayer, MapView, TimeWindow};
use eofloods_core::Result;

pub const WMS_URL: &str = "https://geoserver.gfm.eodc.eu/geoserver/gfm/wms";
pub const DEFAULT_LAYER: &str = "observed_flood_extent";
const WMS_ZOOM: u8 = 9;

/// Map showing `layer` for the first day, with a slider over every day of the window
pub fn wms_map(region: &BoundingBox, window: &TimeWindow, layer: &str) -> Result<MapView> {
    let time_options = dates_in_time_range(&window.start_str(), &window.end_str())?;

    let mut map = MapView::new(region.centroid(), WMS_ZOOM);
    map.add_layer(MapLayer::new(
        layer,
        LayerSource::Wms {
            url: WMS_URL.to_string(),
            layers: layer.to_string(),
            time: time_options.first().cloned(),
        },
    ));
    map.time_options = time_options;
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_has_one_option_per_day() {
        let region = BoundingBox::new(67.740187, 27.712453, 68.104933, 28.000935).unwrap();
        let window = TimeWindow::parse("2022-10-01", "2022-10-15").unwrap();
        let map = wms_map(&region, &window, DEFAULT_LAYER).unwrap();

        assert_eq!(map.time_options.len(), 15);
        assert_eq!(map.time_options[0], "2022-10-01");
        assert_eq!(map.zoom, 9);
        match &map.layers[0].source {
            LayerSource::Wms { url, layers, time } => {
                assert_eq!(url, WMS_URL);
                assert_eq!(layers, "observed_flood_extent");
                assert_eq!(time.as_deref(), Some("2022-10-01"));
            }
            other => panic!("unexpected layer source {:?}", other),
        }
    }
}
