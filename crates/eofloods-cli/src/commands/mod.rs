//! Command implementations

mod available;
mod config;
mod export;
mod flood_extents;
mod preview;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::errors::missing_session_option;
use crate::interactive::TerminalPrompt;
use crate::output::OutputWriter;
use crate::progress::{spinner_enabled, with_spinner_if};
use anyhow::{Context, Result};
use eofloods_core::config::{CliConfigOverrides, LayeredConfig};
use eofloods_core::models::{MapView, ProviderKind};
use eofloods_floodmap::{FloodMap, SessionContext};
use eofloods_gfm::{CredentialSource, Credentials};
use std::fs;
use std::path::Path;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(cli.config.as_deref(), overrides(&cli))?;

    match &cli.command {
        Commands::Available => available::execute(&cli, config, &output),
        Commands::Preview(args) => preview::execute(&cli, args, config, &output),
        Commands::FloodExtents(args) => flood_extents::execute(&cli, args, config, &output),
        Commands::Export(args) => export::execute(&cli, args, config, &output),
        Commands::Config => config::execute(&config, &output),
    }
}

/// Configuration overrides carried by command line flags
fn overrides(cli: &Cli) -> CliConfigOverrides {
    let mut overrides = CliConfigOverrides { platform: cli.platform, ..Default::default() };
    match &cli.command {
        Commands::Preview(args) => overrides.zoom = args.zoom,
        Commands::FloodExtents(args) => {
            overrides.plot_timeout_secs = args.timeout;
            overrides.clip_ocean = args.no_clip_ocean.then_some(false);
            overrides.mask_permanent_water = args.no_mask_water.then_some(false);
        }
        Commands::Export(args) => {
            overrides.export_folder = args.folder.clone();
            overrides.export_scale = args.scale;
        }
        Commands::Available | Commands::Config => {}
    }
    overrides
}

/// GFM credentials from the environment, else from a terminal prompt
fn credential_source() -> CredentialSource {
    if Credentials::from_env().is_ok() || !console::Term::stdout().is_term() {
        CredentialSource::Environment
    } else {
        CredentialSource::Interactive(Box::new(TerminalPrompt))
    }
}

/// Open the flood map session described by the global options
fn open_floodmap(cli: &Cli, config: LayeredConfig, output: &OutputWriter) -> Result<FloodMap> {
    let start = cli.start.as_deref().ok_or_else(|| missing_session_option("--start"))?;
    let end = cli.end.as_deref().ok_or_else(|| missing_session_option("--end"))?;
    let bbox = cli.bbox.ok_or_else(|| missing_session_option("--bbox"))?;
    let datasets: Vec<&str> = cli.datasets.iter().map(String::as_str).collect();
    let datasets = (!datasets.is_empty()).then_some(datasets.as_slice());

    let context = SessionContext::from_config(config, credential_source())?;
    // A spinner redrawing over the credential prompt garbles it
    let prompts_user = cli.provider == ProviderKind::Gfm && context.credentials().is_interactive();
    if prompts_user {
        output.info("Connecting to GFM");
    }
    let floodmap = with_spinner_if(
        spinner_enabled(output, prompts_user),
        "Connecting to provider...",
        "Flood map session ready",
        || FloodMap::new(context, start, end, cli.provider, bbox, datasets),
    )?;
    Ok(floodmap)
}

/// Write a map as JSON or as a standalone HTML page, by file extension
fn write_map(map: &MapView, path: &Path, title: &str) -> Result<()> {
    let is_json = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let content = if is_json { serde_json::to_string_pretty(map)? } else { map.to_html(title) };
    fs::write(path, content).with_context(|| format!("Failed to write map to {}", path.display()))
}

/// Borrow repeated `--date` values as string slices, `None` when absent
fn date_slice(dates: &[String]) -> Option<Vec<&str>> {
    (!dates.is_empty()).then(|| dates.iter().map(String::as_str).collect())
}
