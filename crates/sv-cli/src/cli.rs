use crate::commands::Commands;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "sv")]
#[command(about = "Launch a local server artifact and supervise it until stopped")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Config directory (defaults to $SV_CONFIG_DIR, then ./.sv)
    #[arg(long, global = true)]
    pub(crate) config_dir: Option<PathBuf>,
}
