mod platform;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "artwork-picker",
    version,
    about = "Pick album artwork in a search page and put it on an upload form"
)]
pub(crate) struct Cli {
    /// Directory holding artwork_picker.ron
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,
    /// Where log output goes
    #[arg(long, global = true, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,
    /// Log at debug level
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogTarget {
    Terminal,
    File,
    Both,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Run one picker session against a saved search page and upload form
    Run(RunArgs),
    /// Print the search URL a session would open
    SearchUrl(AlbumArgs),
    /// Show or change the stored settings
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct AlbumArgs {
    #[arg(long)]
    pub artist: Option<String>,
    #[arg(long)]
    pub album: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct RunArgs {
    #[command(flatten)]
    pub album: AlbumArgs,
    /// Saved HTML of the artwork search results
    #[arg(long)]
    pub picker: PathBuf,
    /// Saved HTML of the host upload page
    #[arg(long)]
    pub form: PathBuf,
    /// URL of the host upload page, used to read artist and album from its path
    #[arg(long)]
    pub host_url: Option<String>,
    /// CSS selector of the element to click in the search page (default: first artwork image)
    #[arg(long)]
    pub click: Option<String>,
    /// Also write the downloaded artwork into this directory
    #[arg(long)]
    pub save_to: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ConfigArgs {
    /// Restore the default settings
    #[arg(long, action = ArgAction::SetTrue)]
    pub reset: bool,
    #[arg(long, value_parser = ["dark", "light"])]
    pub theme: Option<String>,
    /// Minimum resolution passed to the search page (0 = any)
    #[arg(long)]
    pub resolution: Option<u32>,
    /// Comma-separated source names
    #[arg(long, value_delimiter = ',')]
    pub sources: Option<Vec<String>>,
    #[arg(long)]
    pub country: Option<String>,
    /// Enable or disable diagnostic logging
    #[arg(long)]
    pub debug: Option<bool>,
}

fn main() -> anyhow::Result<()> {
    platform::run(Cli::parse())
}
