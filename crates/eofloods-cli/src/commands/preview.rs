//! Preview command implementation

use super::{date_slice, open_floodmap, write_map};
use crate::cli::{Cli, PreviewArgs};
use crate::output::OutputWriter;
use crate::output_types::MapOutput;
use crate::progress::with_spinner;
use anyhow::Result;
use eofloods_core::config::LayeredConfig;
use eofloods_engine::PreviewOptions;

pub fn execute(cli: &Cli, args: &PreviewArgs, config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    let zoom = config.zoom.value;
    let mut floodmap = open_floodmap(cli, config, output)?;

    let options = PreviewOptions {
        zoom,
        dates: date_slice(&args.dates).map(|dates| dates.into_iter().map(String::from).collect()),
        add_aoi: !args.no_aoi,
        ..Default::default()
    };

    let map = with_spinner(output, "Building preview map...", "Preview map built", || {
        floodmap.preview_data(None, &options)
    })?;

    let Some(map) = map else {
        output.warning(format!("{} does not support previewing data", floodmap.provider_kind()));
        return output.result(serde_json::Value::Null);
    };

    if let Some(path) = &args.output {
        write_map(&map, path, "EO-Floods preview")?;
        output.map_written(path);
    }

    if output.is_json() {
        return output.result(MapOutput { output_path: args.output.as_ref().map(|p| p.display().to_string()), map });
    }

    output.layers(&map);
    Ok(())
}
