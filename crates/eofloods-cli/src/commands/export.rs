//! Export command implementation

use super::{date_slice, open_floodmap};
use crate::cli::{Cli, ExportArgs, ExportTarget};
use crate::output::OutputWriter;
use crate::output_types::{ExportRow, LinkRow};
use crate::progress::with_spinner;
use anyhow::Result;
use eofloods_core::config::LayeredConfig;
use eofloods_core::models::ExportKind;
use eofloods_engine::ExportRequest;
use eofloods_floodmap::ExportOutcome;

pub fn execute(cli: &Cli, args: &ExportArgs, config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut floodmap = open_floodmap(cli, config, output)?;

    if let Some(dates) = date_slice(&args.dates) {
        floodmap.select_data(Some(&dates[..]), None)?;
    }

    let request = ExportRequest {
        kind: match args.to {
            ExportTarget::Drive => ExportKind::ToDrive,
            ExportTarget::Asset => ExportKind::ToAsset,
        },
        include_base_data: args.include_base_data,
        asset_path: args.asset_path.clone(),
        ..Default::default()
    };

    let outcome = with_spinner(output, "Submitting exports...", "Exports submitted", || {
        floodmap.export_data(&request)
    })?;

    if output.is_json() {
        return output.result(&outcome);
    }

    match &outcome {
        ExportOutcome::Tasks(report) => {
            output.section("Export tasks");
            output.table(
                report
                    .tasks
                    .iter()
                    .map(|t| ExportRow {
                        dataset: t.dataset.clone(),
                        description: t.description.clone(),
                        task_id: t.task_id.0.clone(),
                    })
                    .collect(),
            );
            output.info("Tasks run on the imagery platform; check their progress there");
        }
        ExportOutcome::Links(links) => {
            output.section("Download links");
            output.table(
                links.iter().map(|l| LinkRow { product_time: l.product_time.clone(), link: l.link.clone() }).collect(),
            );
        }
    }
    Ok(())
}
