//! Config command implementation

use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigRow};
use anyhow::Result;
use eofloods_core::config::LayeredConfig;
use std::collections::BTreeMap;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let inspection_map = config.to_inspection_map();

    if output.is_json() {
        let entries: BTreeMap<String, ConfigEntry> = inspection_map
            .into_iter()
            .map(|(key, (value, source))| (key, ConfigEntry { value, source: source.to_string() }))
            .collect();
        return output.result(entries);
    }

    output.section("Configuration Values");

    let mut rows: Vec<ConfigRow> = inspection_map
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: source.to_string() })
        .collect();

    // Sort by key for consistent output
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    output.table(rows);

    output.section("Configuration Precedence");
    output.info("CLI arguments > Environment variables > Config file > Defaults");
    Ok(())
}
