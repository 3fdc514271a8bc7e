//! Map layers for bound imagery and derived flood extents.

use crate::binding::DatasetBinding;
use crate::filters::date_filter;
use crate::pipeline::FloodExtents;
use eofloods_core::models::dates::format_timestamp;
use eofloods_core::models::{
    BoundingBox, ImageExpr, LayerSource, MapLayer, MapView, VisParams, SURFACE_WATER_ASSET,
    SURFACE_WATER_OCCURRENCE_BAND,
};
use eofloods_core::ports::ImageryPlatform;
use eofloods_core::Result;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewOptions {
    pub zoom: u8,
    /// Dates to show; every acquisition of each dataset when `None`
    pub dates: Option<Vec<String>>,
    /// Visualization per dataset name, overriding the dataset defaults
    pub vis_params: HashMap<String, VisParams>,
    /// Outline the area of interest and fit the view to it
    pub add_aoi: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self { zoom: 8, dates: None, vis_params: HashMap::new(), add_aoi: true }
    }
}

/// Options for the flood extent map
#[derive(Debug, Clone, PartialEq)]
pub struct FloodExtentView {
    pub zoom: u8,
    pub timeout: Duration,
    /// Add the surface water occurrence reference layer
    pub show_water_occurrence: bool,
}

impl Default for FloodExtentView {
    fn default() -> Self {
        Self { zoom: 8, timeout: Duration::from_secs(300), show_water_occurrence: true }
    }
}

/// Styling of binary water masks
pub fn flood_extent_vis() -> VisParams {
    VisParams::bands(["water"]).range(0.0, 1.0).palette(["#C0C0C0", "#000080"])
}

/// Styling of the surface water occurrence reference layer
pub fn water_occurrence_vis() -> VisParams {
    VisParams::bands([SURFACE_WATER_OCCURRENCE_BAND]).range(0.0, 100.0).palette(["ffffff", "ffbbbb", "0000ff"])
}

/// One layer per dataset and acquisition date
pub fn view_data(
    platform: &dyn ImageryPlatform,
    bindings: &[DatasetBinding],
    region: &BoundingBox,
    options: &PreviewOptions,
) -> Result<MapView> {
    let mut map = MapView::new(region.centroid(), options.zoom);

    for binding in bindings {
        let dates = match &options.dates {
            Some(dates) => dates.clone(),
            None => platform.image_dates(&binding.collection)?.iter().map(format_timestamp).collect(),
        };
        let vis_params = options.vis_params.get(binding.name()).unwrap_or(&binding.spec.visual_params);

        for date in dates {
            let collection = binding.collection.clone().filter(date_filter(&[date.as_str()])?);
            if options.dates.is_some() && platform.image_count(&collection)? == 0 {
                debug!("No {} image on {}, no layer added", binding.name(), date);
                continue;
            }
            let image = ImageExpr::Mosaic { collection };
            let url = platform.tile_url(&image, vis_params)?;
            map.add_layer(
                MapLayer::new(format!("{} {}", binding.name(), date), LayerSource::Tiles { url })
                    .with_vis_params(vis_params.clone()),
            );
        }
    }

    if options.add_aoi {
        map.add_aoi_and_zoom_to_bounds(region);
    }
    Ok(map)
}

/// Imagery overlaid with per-image water masks and the maximum extent
pub fn flood_extent_map(
    platform: &dyn ImageryPlatform,
    bindings: &[DatasetBinding],
    extents: &FloodExtents,
    region: &BoundingBox,
    view: &FloodExtentView,
) -> Result<MapView> {
    let base = PreviewOptions { zoom: view.zoom, add_aoi: false, ..Default::default() };
    let mut map = view_data(platform, bindings, region, &base)?;
    let vis = flood_extent_vis();

    for extent in extents.iter() {
        let dates = platform.image_dates(&extent.collection)?;
        for (index, date) in dates.iter().enumerate() {
            let image = ImageExpr::nth(extent.collection.clone(), index).self_mask();
            let url = platform.tile_url(&image, &vis)?;
            map.add_layer(
                MapLayer::new(
                    format!("{} flood extent {}", extent.dataset, format_timestamp(date)),
                    LayerSource::Tiles { url },
                )
                .with_vis_params(vis.clone()),
            );
        }

        let max_extent = ImageExpr::Max { collection: extent.collection.clone() }.self_mask();
        let url = platform.tile_url(&max_extent, &vis)?;
        map.add_layer(
            MapLayer::new(format!("{} max flood extent", extent.dataset), LayerSource::Tiles { url })
                .with_vis_params(vis.clone()),
        );
    }

    if view.show_water_occurrence {
        let occurrence = ImageExpr::Asset { asset_id: SURFACE_WATER_ASSET.to_string(), band: None };
        let vis = water_occurrence_vis();
        let url = platform.tile_url(&occurrence, &vis)?;
        map.add_layer(MapLayer::new("JRC water occurrence", LayerSource::Tiles { url }).with_vis_params(vis));
    }

    map.add_aoi_and_zoom_to_bounds(region);
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{generate_flood_extents, FloodExtentOptions};
    use eofloods_core::models::TimeWindow;
    use eofloods_core::registry;
    use eofloods_platform::MemoryPlatform;

    fn region() -> BoundingBox {
        BoundingBox::new(4.221067, 51.949474, 4.471006, 52.073727).unwrap()
    }

    fn bindings(names: &[&str]) -> Vec<DatasetBinding> {
        let window = TimeWindow::parse("2023-04-01", "2023-04-30").unwrap();
        registry::resolve(Some(names))
            .unwrap()
            .into_iter()
            .map(|spec| DatasetBinding::bind(spec, region(), window))
            .collect()
    }

    #[test]
    fn test_view_data_layer_per_date() {
        let platform = MemoryPlatform::synthetic();
        let map = view_data(&platform, &bindings(&["Sentinel-1"]), &region(), &PreviewOptions::default()).unwrap();

        assert_eq!(map.layers.len(), 6);
        assert_eq!(map.layers[0].name, "Sentinel-1 2023-04-02 05:50:00.000");
        assert_eq!(map.layers[0].vis_params, registry::lookup("Sentinel-1").unwrap().visual_params);
        assert!(map.layer("Area of interest").is_some());
        assert_eq!(map.zoom, 8);
    }

    #[test]
    fn test_view_data_custom_dates_and_vis() {
        let platform = MemoryPlatform::synthetic();
        let custom = VisParams::bands(["VH"]).range(-30.0, 5.0);
        let options = PreviewOptions {
            zoom: 10,
            dates: Some(vec!["2023-04-08".into(), "2023-04-17".into()]),
            vis_params: HashMap::from([("Sentinel-1".to_string(), custom.clone())]),
            add_aoi: false,
        };
        let map = view_data(&platform, &bindings(&["Sentinel-1", "Landsat 8"]), &region(), &options).unwrap();

        // Sentinel-1 has no pass on 04-17 and Landsat 8 none on 04-08
        assert_eq!(map.layer_names(), vec!["Sentinel-1 2023-04-08", "Landsat 8 2023-04-17"]);
        assert_eq!(map.layers[0].vis_params, custom);
        assert!(map.fit_bounds.is_none());
    }

    #[test]
    fn test_flood_extent_map_layers() {
        let platform = MemoryPlatform::synthetic();
        let bindings = bindings(&["Sentinel-1"]);
        let extents = generate_flood_extents(&platform, &bindings, &FloodExtentOptions::default()).unwrap();

        let map = flood_extent_map(&platform, &bindings, &extents, &region(), &FloodExtentView::default()).unwrap();
        let names = map.layer_names();

        assert_eq!(names.iter().filter(|n| n.starts_with("Sentinel-1 flood extent")).count(), 5);
        assert!(names.contains(&"Sentinel-1 max flood extent"));
        assert!(names.contains(&"JRC water occurrence"));
        assert_eq!(names.last(), Some(&"Area of interest"));
        assert_eq!(map.fit_bounds, Some(region()));
        assert_eq!(map.layer("Sentinel-1 max flood extent").unwrap().vis_params, flood_extent_vis());
    }

    #[test]
    fn test_water_occurrence_layer_optional() {
        let platform = MemoryPlatform::synthetic();
        let bindings = bindings(&["Sentinel-1"]);
        let extents = generate_flood_extents(&platform, &bindings, &FloodExtentOptions::default()).unwrap();
        let view = FloodExtentView { show_water_occurrence: false, ..Default::default() };

        let map = flood_extent_map(&platform, &bindings, &extents, &region(), &view).unwrap();
        assert!(map.layer("JRC water occurrence").is_none());
    }
}
