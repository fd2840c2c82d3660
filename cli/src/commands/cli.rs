use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Run internet speed tests the way a launcher would")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (defaults to $SPEEDPROBE_CONFIG, then ./config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Pick the dark-theme icon.
    #[arg(long, default_value_t = false, global = true)]
    pub dark: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Query like the launcher does and follow a run until it settles (default).
    Watch(WatchArgs),
    /// Download the speedtest CLI if it is not installed yet.
    Install,
    /// Decode a recorded `speedtest --format=json` output into progress events.
    Parse(ParseArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Text typed after the action keyword. Blank starts a measurement.
    pub query: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ParseArgs {
    /// File to decode, or `-` for stdin.
    pub file: String,
}
