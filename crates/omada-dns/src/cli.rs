use std::path::PathBuf;

use clap::Parser;

/// Local DNS responder answering from Omada DHCP reservations.
#[derive(Debug, Parser)]
#[command(name = "omada-dns", version, about)]
pub struct Cli {
    /// Path to a TOML config file; OMADA_* environment variables
    /// override file values.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
