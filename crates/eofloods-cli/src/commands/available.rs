//! Available command implementation

use super::open_floodmap;
use crate::cli::Cli;
use crate::output::OutputWriter;
use crate::output_types::{ImageRow, ProductRow};
use anyhow::Result;
use eofloods_core::config::LayeredConfig;
use eofloods_floodmap::AvailableData;

pub fn execute(cli: &Cli, config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    let floodmap = open_floodmap(cli, config, output)?;
    let available = floodmap.available_data()?;

    if output.is_json() {
        return output.result(&available);
    }

    match &available {
        AvailableData::Datasets(summaries) => {
            for summary in summaries {
                output.section(&summary.name);
                output.kv("Asset", &summary.asset_id);
                output.kv("Images", summary.image_count());
            }

            let rows: Vec<ImageRow> = summaries
                .iter()
                .flat_map(|summary| {
                    summary.images.iter().map(move |image| ImageRow {
                        dataset: summary.name.clone(),
                        timestamp: image.timestamp.clone(),
                        quality_score: format!("{:.2}", image.quality_score),
                    })
                })
                .collect();
            output.section("Images");
            output.table(rows);
        }
        AvailableData::Products(dates) => {
            output.section("GFM products");
            output.table(dates.iter().map(|d| ProductRow { product_time: d.clone() }).collect());
        }
    }
    Ok(())
}
