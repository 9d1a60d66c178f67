use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the path of the server artifact found in storage
    Locate,

    /// Start the server and supervise it until SIGINT/SIGTERM
    Run {
        /// Artifact to launch (located in storage when omitted)
        artifact: Option<PathBuf>,

        /// Print server events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}
