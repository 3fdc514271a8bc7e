//! Flood-extents command implementation

use super::{date_slice, open_floodmap, write_map};
use crate::cli::{Cli, FloodExtentsArgs};
use crate::output::OutputWriter;
use crate::output_types::FloodExtentsOutput;
use crate::progress::with_spinner;
use anyhow::Result;
use eofloods_core::config::LayeredConfig;
use eofloods_engine::FloodExtentOptions;
use eofloods_floodmap::Provider;

pub fn execute(cli: &Cli, args: &FloodExtentsArgs, config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    let options = FloodExtentOptions {
        dates: date_slice(&args.dates).map(|dates| dates.into_iter().map(String::from).collect()),
        clip_ocean: config.clip_ocean.value,
        mask_permanent_water: config.mask_permanent_water.value,
        permanent_water_threshold: config.permanent_water_threshold.value,
    };
    let timeout = config.plot_timeout();
    let mut floodmap = open_floodmap(cli, config, output)?;

    with_spinner(output, "Generating flood extents...", "Flood extents generated", || {
        floodmap.generate_flood_extents(Some(&options))
    })?;

    let (generated, skipped) = match floodmap.provider() {
        Provider::HydraFloods(provider) => provider
            .flood_extents()
            .map(|extents| {
                let generated = extents.names().into_iter().map(String::from).collect();
                (generated, extents.skipped().to_vec())
            })
            .unwrap_or_default(),
        Provider::Gfm(_) => (Vec::new(), Vec::new()),
    };
    for dataset in &skipped {
        output.warning(format!("{} has no images for the selected dates, skipped", dataset));
    }

    let map = with_spinner(output, "Rendering flood extent map...", "Flood extent map rendered", || {
        floodmap.view_flood_extents(Some(timeout))
    })?;

    if let Some(path) = &args.output {
        write_map(&map, path, "EO-Floods flood extents")?;
        output.map_written(path);
    }

    if output.is_json() {
        return output.result(FloodExtentsOutput {
            generated,
            skipped,
            output_path: args.output.as_ref().map(|p| p.display().to_string()),
            map,
        });
    }

    output.layers(&map);
    Ok(())
}
