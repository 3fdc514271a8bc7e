use clap::{Parser, Subcommand};
use eofloods_core::config::PlatformKind;
use eofloods_core::models::{BoundingBox, ProviderKind};
use std::path::PathBuf;

/// EO-Floods - Flood maps from earth-observation imagery
#[derive(Parser, Debug)]
#[command(name = "eofloods")]
#[command(about = "Flood maps from earth-observation imagery", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML); ./eofloods.toml is used when present
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Imagery platform to use (memory or remote)
    #[arg(long, global = true)]
    pub platform: Option<PlatformKind>,

    /// Start date of the time window (YYYY-mm-dd)
    #[arg(long, global = true)]
    pub start: Option<String>,

    /// End date of the time window (YYYY-mm-dd)
    #[arg(long, global = true)]
    pub end: Option<String>,

    /// Area of interest as xmin,ymin,xmax,ymax in WGS 84 degrees
    /// Use --bbox=... when xmin is negative
    #[arg(long, global = true, value_name = "XMIN,YMIN,XMAX,YMAX")]
    pub bbox: Option<BoundingBox>,

    /// Dataset to use, repeatable (defaults to every supported dataset)
    #[arg(long = "dataset", global = true, value_name = "NAME")]
    pub datasets: Vec<String>,

    /// Flood map provider (hydrafloods or gfm)
    #[arg(long, global = true, default_value = "hydrafloods")]
    pub provider: ProviderKind,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the images or GFM products available for the session
    Available,

    /// Map the raw imagery to check its quality
    Preview(PreviewArgs),

    /// Generate flood extents and map them
    FloodExtents(FloodExtentsArgs),

    /// Submit export tasks, or fetch GFM download links
    Export(ExportArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Date to show, repeatable (defaults to every acquisition)
    #[arg(long = "date", value_name = "DATE")]
    pub dates: Vec<String>,

    /// Zoom level of the map
    #[arg(long)]
    pub zoom: Option<u8>,

    /// Do not outline the area of interest
    #[arg(long)]
    pub no_aoi: bool,

    /// Write the map to this file (.html or .json)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct FloodExtentsArgs {
    /// Only use images from this date, repeatable
    #[arg(long = "date", value_name = "DATE")]
    pub dates: Vec<String>,

    /// Keep pixels outside the country boundaries
    #[arg(long)]
    pub no_clip_ocean: bool,

    /// Keep permanent water in the flood extents
    #[arg(long)]
    pub no_mask_water: bool,

    /// Seconds to wait for the map before giving up
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write the map to this file (.html or .json)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Where exported images are written
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ExportTarget {
    /// Google Drive folder
    Drive,
    /// Platform asset
    Asset,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Select images or products of this date before exporting, repeatable
    #[arg(long = "date", value_name = "DATE")]
    pub dates: Vec<String>,

    /// Export destination
    #[arg(long, value_enum, default_value = "drive")]
    pub to: ExportTarget,

    /// Also export the imagery the flood extents were derived from
    #[arg(long)]
    pub include_base_data: bool,

    /// Drive folder (defaults to the configured export folder)
    #[arg(long)]
    pub folder: Option<String>,

    /// Asset id prefix for asset exports
    #[arg(long, default_value = "")]
    pub asset_path: String,

    /// Pixel size in meters (defaults to the configured export scale)
    #[arg(long)]
    pub scale: Option<f64>,
}
